use anyhow::Context;
use cityscape_assets::{load_resources, FsSource, ResourceList};
use cityscape_common::{CityConfig, CityRng};
use cityscape_kernel::CityWorld;
use cityscape_layout::{fill_city, generate_map, CellBlocks, CityMap, Street};
use cityscape_render::{DebugTextRenderer, RenderView, SceneDescription, SceneRenderer};
use cityscape_tools::CityInspector;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cityscape-cli", about = "Headless tool for generating and simulating cities")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON city configuration; defaults are used for missing fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, crate info and the active configuration
    Info,
    /// Generate a city and print a summary
    Generate {
        /// Generation seed, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,
        /// Dump the map, streets and blocks as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Generate a city and step the world
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Generation seed, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,
        /// List every light position in the final frame
        #[arg(long)]
        lights: bool,
    },
    /// Load the startup shader resources and report
    CheckResources {
        /// Directory the resource paths are resolved against
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Serialize)]
struct CityDump<'a> {
    seed: u64,
    map: &'a CityMap,
    streets: Vec<Street>,
    blocks: &'a [CellBlocks],
}

fn load_config(path: Option<&PathBuf>, seed: Option<u64>) -> anyhow::Result<CityConfig> {
    let mut config = match path {
        Some(path) => CityConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => CityConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

fn generate(config: &CityConfig) -> (CityMap, Vec<CellBlocks>, CityWorld) {
    let mut rng = CityRng::from_seed_u64(config.seed);
    let map = generate_map(config.repeat_count, config.cell_size, config.street_width);
    let blocks = fill_city(&map, config.max_height, &mut rng);
    let world = CityWorld::from_config(config, &mut rng);
    (map, blocks, world)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            let config = load_config(cli.config.as_ref(), None)?;
            println!("cityscape-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("layout: {}", cityscape_layout::crate_info());
            println!("assets: {}", cityscape_assets::crate_info());
            println!("render: {}", cityscape_render::crate_info());
            println!("tools: {}", cityscape_tools::crate_info());
            println!("config: {}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Generate { seed, json } => {
            let config = load_config(cli.config.as_ref(), seed)?;
            let (map, blocks, world) = generate(&config);
            if json {
                let dump = CityDump {
                    seed: config.seed,
                    streets: map.streets(),
                    map: &map,
                    blocks: &blocks,
                };
                println!("{}", serde_json::to_string_pretty(&dump)?);
            } else {
                println!("Seed: {}", config.seed);
                println!("{}", CityInspector::summary(&map, &blocks, &world));
            }
        }
        Commands::Simulate {
            ticks,
            seed,
            lights,
        } => {
            let config = load_config(cli.config.as_ref(), seed)?;
            let (map, blocks, mut world) = generate(&config);
            let scene = SceneDescription::build(&config, &map, &blocks);

            println!("Simulating: seed={}, ticks={ticks}", config.seed);
            for _ in 0..ticks {
                world.step();
            }

            let renderer = if lights {
                DebugTextRenderer::new().with_lights()
            } else {
                DebugTextRenderer::new()
            };
            print!(
                "{}",
                renderer.render(&scene, &world, &RenderView::from_config(&config))
            );
            println!("State hash: {:016x}", world.state_hash());
        }
        Commands::CheckResources { dir } => {
            let list = ResourceList::default();
            let source = FsSource::new(&dir);
            let bundle = pollster::block_on(load_resources(&list, &source))
                .with_context(|| format!("resources under {}", dir.display()))?;
            println!("All {} resources loaded from {}:", bundle.len(), dir.display());
            for entry in &list.entries {
                let bytes = bundle.get(&entry.name).map(str::len)?;
                println!("  {:<14} {:<28} {bytes} bytes", entry.name, entry.path);
            }
        }
    }

    Ok(())
}
