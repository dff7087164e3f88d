use std::hint::black_box;
use std::time::Instant;

use cityscape_common::CityRng;
use cityscape_layout::{fill_city, generate_map};

fn bench_generate_map(repeat_count: u32, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(generate_map(black_box(repeat_count), 200.0, 20.0));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  generate_map ({repeat_count}x{repeat_count}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_fill_city(repeat_count: u32, iterations: usize) {
    let map = generate_map(repeat_count, 200.0, 20.0);
    let mut rng = CityRng::from_seed_u64(42);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(fill_city(black_box(&map), 1000.0, &mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  fill_city ({} cells, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}",
        map.cells.len()
    );
}

fn main() {
    println!("=== City Layout Benchmarks ===\n");

    println!("Grid partition:");
    bench_generate_map(20, 10000);
    bench_generate_map(100, 100);

    println!("\nBlock generation:");
    bench_fill_city(20, 1000);
    bench_fill_city(100, 20);

    println!("\n=== Done ===");
}
