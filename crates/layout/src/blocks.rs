use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use crate::grid::{Cell, CityMap};

/// Limits for the split point of a cell interior; keeps blocks from becoming slivers.
const SPLIT_LIMITS: (f32, f32) = (0.2, 0.8);
/// Limits for a block's height as a fraction of the maximum height.
const HEIGHT_LIMITS: (f32, f32) = (0.2, 1.0);
/// Grey shades are drawn from `[SHADE_BASE, SHADE_BASE + SHADE_RANGE)`.
const SHADE_BASE: f32 = 0.15;
const SHADE_RANGE: f32 = 0.2;

/// One building: a box standing on the cell floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Block {
    /// Extent along X.
    pub width: f32,
    /// Extent along Z.
    pub depth: f32,
    pub height: f32,
    /// Box centre relative to the owning cell's origin.
    pub center: Vec3,
    /// Grey level used for all three colour channels.
    pub shade: f32,
}

impl Block {
    /// Footprint as `(min_x, max_x, min_z, max_z)` in cell-local coordinates.
    pub fn footprint(&self) -> (f32, f32, f32, f32) {
        (
            self.center.x - self.width / 2.0,
            self.center.x + self.width / 2.0,
            self.center.z - self.depth / 2.0,
            self.center.z + self.depth / 2.0,
        )
    }
}

/// The four blocks generated for one cell, in layout order:
/// near-left, near-right, far-left, far-right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellBlocks {
    pub cell: Cell,
    pub blocks: [Block; 4],
}

/// Uniform draw in `[0, 1)` clamped to `[low, high]`.
///
/// Draws below `low` snap to `low` and draws above `high` snap to `high`,
/// so the bounds are hit with extra probability.
pub fn rand_with_limits<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    let r: f32 = rng.r#gen();
    if r < low {
        low
    } else if r > high {
        high
    } else {
        r
    }
}

fn random_block<R: Rng + ?Sized>(
    rng: &mut R,
    width: f32,
    depth: f32,
    max_height: f32,
) -> (f32, Block) {
    let shade = SHADE_BASE + rng.r#gen::<f32>() * SHADE_RANGE;
    let height = max_height * rand_with_limits(rng, HEIGHT_LIMITS.0, HEIGHT_LIMITS.1);
    (
        height,
        Block {
            width,
            depth,
            height,
            center: Vec3::ZERO,
            shade,
        },
    )
}

/// Split a cell's interior into four blocks at a random point and give each a random height.
///
/// The interior is the cell minus a `cell_size / 10` border on every side and
/// a `cell_size / 20` gap between the blocks.
pub fn fill_cell<R: Rng + ?Sized>(
    cell: &Cell,
    cell_size: f32,
    max_height: f32,
    rng: &mut R,
) -> CellBlocks {
    let inner_margin = cell_size / 20.0;
    let margin = cell_size / 10.0;
    let interior = cell_size - 2.0 * margin - inner_margin;

    let fx = rand_with_limits(rng, SPLIT_LIMITS.0, SPLIT_LIMITS.1);
    let fy = rand_with_limits(rng, SPLIT_LIMITS.0, SPLIT_LIMITS.1);

    let w1 = interior * fx;
    let w2 = interior - w1;
    let d1 = interior * fy;
    let d2 = interior - d1;

    let left_x = margin + w1 / 2.0;
    let right_x = margin + inner_margin + w1 + w2 / 2.0;
    let near_z = -d1 / 2.0 - margin;
    let far_z = -d1 - d2 / 2.0 - margin - inner_margin;

    let layout = [
        (w1, d1, left_x, near_z),
        (w2, d1, right_x, near_z),
        (w1, d2, left_x, far_z),
        (w2, d2, right_x, far_z),
    ];

    let blocks = layout.map(|(width, depth, x, z)| {
        let (height, mut block) = random_block(rng, width, depth, max_height);
        block.center = Vec3::new(x, height / 2.0, z);
        block
    });

    CellBlocks {
        cell: *cell,
        blocks,
    }
}

/// Fill every cell of the map, in map order.
pub fn fill_city<R: Rng + ?Sized>(map: &CityMap, max_height: f32, rng: &mut R) -> Vec<CellBlocks> {
    let _span = tracing::info_span!("fill_city", cells = map.cells.len()).entered();
    let filled: Vec<CellBlocks> = map
        .cells
        .iter()
        .map(|cell| fill_cell(cell, map.cell_size, max_height, rng))
        .collect();
    tracing::debug!(blocks = filled.len() * 4, "city filled");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::generate_map;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f32 = 1e-3;

    fn test_cell() -> Cell {
        Cell {
            row: 0,
            col: 0,
            origin: Vec3::ZERO,
        }
    }

    #[test]
    fn rand_with_limits_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..10_000 {
            let split = rand_with_limits(&mut rng, 0.2, 0.8);
            assert!((0.2..=0.8).contains(&split));
            let height = rand_with_limits(&mut rng, 0.2, 1.0);
            assert!((0.2..=1.0).contains(&height));
        }
    }

    #[test]
    fn rand_with_limits_snaps_low_draws() {
        // StepRng with zero state always yields 0, which maps to a 0.0 float.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(rand_with_limits(&mut rng, 0.2, 0.8), 0.2);
    }

    #[test]
    fn rand_with_limits_snaps_high_draws() {
        let mut rng = StepRng::new(u64::MAX, 0);
        assert_eq!(rand_with_limits(&mut rng, 0.2, 0.8), 0.8);
    }

    #[test]
    fn footprints_tile_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let cell_size = 200.0;
        let interior = cell_size - 2.0 * (cell_size / 10.0) - cell_size / 20.0;
        for _ in 0..200 {
            let filled = fill_cell(&test_cell(), cell_size, 1000.0, &mut rng);
            let [b1, b2, b3, b4] = filled.blocks;

            assert!((b1.width + b2.width - interior).abs() < EPS);
            assert!((b3.width + b4.width - interior).abs() < EPS);
            assert!((b1.depth + b3.depth - interior).abs() < EPS);
            assert!((b2.depth + b4.depth - interior).abs() < EPS);

            let area: f32 = filled.blocks.iter().map(|b| b.width * b.depth).sum();
            assert!((area - interior * interior).abs() < 0.5);
        }
    }

    #[test]
    fn footprints_do_not_overlap_and_respect_margins() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let cell_size = 120.0;
        let margin = cell_size / 10.0;
        for _ in 0..200 {
            let filled = fill_cell(&test_cell(), cell_size, 500.0, &mut rng);
            let rects: Vec<_> = filled.blocks.iter().map(Block::footprint).collect();
            for (i, a) in rects.iter().enumerate() {
                assert!(a.0 >= margin - EPS && a.1 <= cell_size - margin + EPS);
                assert!(a.3 <= -margin + EPS && a.2 >= -cell_size + margin - EPS);
                for b in &rects[i + 1..] {
                    let overlap = a.0 < b.1 - EPS && b.0 < a.1 - EPS && a.2 < b.3 - EPS && b.2 < a.3 - EPS;
                    assert!(!overlap, "{a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn split_fractions_are_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let cell_size = 200.0;
        let interior = cell_size - 2.0 * (cell_size / 10.0) - cell_size / 20.0;
        for _ in 0..500 {
            let filled = fill_cell(&test_cell(), cell_size, 1000.0, &mut rng);
            let fx = filled.blocks[0].width / interior;
            let fy = filled.blocks[0].depth / interior;
            assert!((0.2 - EPS..=0.8 + EPS).contains(&fx));
            assert!((0.2 - EPS..=0.8 + EPS).contains(&fy));
        }
    }

    #[test]
    fn heights_and_shades_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let map = generate_map(4, 200.0, 20.0);
        for filled in fill_city(&map, 1000.0, &mut rng) {
            for block in filled.blocks {
                assert!((200.0..=1000.0).contains(&block.height));
                assert!((0.15..0.35).contains(&block.shade));
                assert!((block.center.y - block.height / 2.0).abs() < EPS);
            }
        }
    }

    #[test]
    fn fill_city_is_deterministic_per_seed() {
        let map = generate_map(3, 200.0, 20.0);
        let a = fill_city(&map, 1000.0, &mut ChaCha8Rng::seed_from_u64(42));
        let b = fill_city(&map, 1000.0, &mut ChaCha8Rng::seed_from_u64(42));
        let c = fill_city(&map, 1000.0, &mut ChaCha8Rng::seed_from_u64(43));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 9);
        assert_eq!(a[4].cell, map.cells[4]);
    }
}
