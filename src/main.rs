use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tectonic_worldgen::config::GeneratorConfig;
use tectonic_worldgen::export;
use tectonic_worldgen::plates::{CrustType, TectonicsGenerator};
use tectonic_worldgen::seeds::WorldSeeds;
use tectonic_worldgen::world::World;

#[derive(Parser, Debug)]
#[command(name = "tectonic_worldgen")]
#[command(about = "Generate terrain maps from simulated tectonic plates")]
struct Args {
    /// Width of the map in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Height of the map in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of tectonic plates
    #[arg(short = 'p', long)]
    plates: Option<usize>,

    /// Frequency of the plate growth noise
    #[arg(long)]
    noise_scale: Option<f64>,

    /// How strongly noise slows plate growth
    #[arg(long)]
    noise_strength: Option<f64>,

    /// Render-time color blending passes
    #[arg(long)]
    blend_steps: Option<usize>,

    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Blended biome map PNG
    #[arg(short, long, default_value = "world.png")]
    output: PathBuf,

    /// Grayscale heightmap PNG
    #[arg(long)]
    heightmap: Option<PathBuf>,

    /// Plate map PNG
    #[arg(long)]
    plates_png: Option<PathBuf>,

    /// JSON dataset with per-cell height, biome, crust type and moisture
    #[arg(long)]
    dataset: Option<PathBuf>,
}

/// Grid used when neither a config file nor flags set one.
const DEFAULT_CLI_SIZE: usize = 64;
const DEFAULT_CLI_PLATES: usize = 12;

fn build_config(args: &Args) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => {
            let mut config = GeneratorConfig::default();
            config.plates.width = DEFAULT_CLI_SIZE;
            config.plates.height = DEFAULT_CLI_SIZE;
            config.plates.plate_count = DEFAULT_CLI_PLATES;
            config
        }
    };

    if let Some(width) = args.width {
        config.plates.width = width;
    }
    if let Some(height) = args.height {
        config.plates.height = height;
    }
    if let Some(plates) = args.plates {
        config.plates.plate_count = plates;
    }
    if let Some(scale) = args.noise_scale {
        config.plates.noise_scale = scale;
    }
    if let Some(strength) = args.noise_strength {
        config.plates.noise_strength = strength;
    }
    if let Some(steps) = args.blend_steps {
        config.blend_steps = steps;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(seed);

    println!("Generating world with seed: {}", seed);
    println!("Map size: {}x{}", config.plates.width, config.plates.height);
    log::debug!("stage seeds: {seeds}");

    // Generate tectonic plates
    println!("Generating tectonic plates...");
    let generator = TectonicsGenerator::new(config.plates.clone(), seeds.tectonics)?
        .with_noise_seed(seeds.plate_noise);
    let crust_count = |crust: CrustType| {
        generator.plates().iter().filter(|p| p.crust_type == crust).count()
    };
    println!(
        "Created {} plates ({} continental, {} oceanic, {} mixed)",
        generator.plates().len(),
        crust_count(CrustType::Continental),
        crust_count(CrustType::Oceanic),
        crust_count(CrustType::Mixed),
    );
    let (plate_map, plates) = generator.generate();

    let mut world = World::new(config.plates.width, config.plates.height, plate_map, plates)?;
    world.create_base_world()?;

    println!("Detecting plate boundaries...");
    world.detect_boundaries()?;
    println!("Found {} boundary edges", world.boundary_edges().len());
    for stats in world.plate_stats() {
        println!(
            "  plate {:>3} {:<12} {:>7} cells, {:>5} on boundaries",
            stats.id, stats.crust_type, stats.cells, stats.boundary_cells
        );
    }

    println!("Synthesizing heights...");
    let mut rng = ChaCha8Rng::seed_from_u64(seeds.heightmap);
    world.apply_terrain(&config.terrain, &mut rng, seeds.terrain_noise)?;
    let heights = world.height_map();
    if let Some((min_h, max_h)) = heights.min_max() {
        let above_sea = heights.iter().filter(|(_, _, &h)| h >= 0.0).count();
        println!(
            "Heightmap range: {:.1}m to {:.1}m ({:.1}% above sea level)",
            min_h,
            max_h,
            100.0 * above_sea as f64 / heights.len() as f64
        );
    }

    println!("Assigning biomes...");
    world.assign_biomes(&config.climate, seeds.climate_noise)?;
    for (tile, count) in world.biome_counts() {
        if count > 0 {
            println!("  {:<18} {:>7}", tile.name(), count);
        }
    }

    println!("Writing {}...", args.output.display());
    export::export_blended_map(&world, config.blend_steps, &args.output)?;
    if let Some(path) = &args.heightmap {
        println!("Writing {}...", path.display());
        export::export_heightmap(&world, path)?;
    }
    if let Some(path) = &args.plates_png {
        println!("Writing {}...", path.display());
        export::export_plate_map(&world, path)?;
    }
    if let Some(path) = &args.dataset {
        println!("Writing {}...", path.display());
        export::export_dataset(&world, path)?;
    }

    println!("Done.");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
