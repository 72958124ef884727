//! Debug script to dump the biome map of a fixed seed as ASCII

use std::fs::File;
use std::io::{BufWriter, Write};

use tectonic_worldgen::biomes::TileType;
use tectonic_worldgen::config::GeneratorConfig;
use tectonic_worldgen::plates::PlateFieldConfig;
use tectonic_worldgen::seeds::WorldSeeds;
use tectonic_worldgen::world::World;

const OUTPUT: &str = "biome_debug.txt";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let width = 128;
    let height = 64;
    let seed = 12345u64;

    let config = GeneratorConfig {
        plates: PlateFieldConfig {
            width,
            height,
            plate_count: 12,
            ..PlateFieldConfig::default()
        },
        ..GeneratorConfig::default()
    };
    let world = World::generate(&config, &WorldSeeds::from_master(seed))?;

    let mut file = BufWriter::new(File::create(OUTPUT)?);
    writeln!(file, "=== BIOME DEBUG MAP ({}x{}) seed={} ===", width, height, seed)?;
    writeln!(file)?;

    writeln!(file, "LEGEND:")?;
    for tile in TileType::all() {
        writeln!(file, "  {} = {}", tile.glyph(), tile.name())?;
    }
    writeln!(file)?;

    writeln!(file, "BIOME MAP:")?;
    for y in 0..height {
        let line: String = (0..width)
            .map(|x| world.cell(x, y).tile_type.map_or('?', |t| t.glyph()))
            .collect();
        writeln!(file, "{}", line)?;
    }
    writeln!(file)?;

    writeln!(file, "BOUNDARY MAP (C = convergent, D = divergent, T = transform):")?;
    for y in 0..height {
        let line: String = (0..width)
            .map(|x| match world.cell(x, y).boundary_type {
                Some(kind) => kind.as_str().chars().next().map_or('?', |c| c.to_ascii_uppercase()),
                None => ' ',
            })
            .collect();
        writeln!(file, "{}", line.trim_end())?;
    }
    writeln!(file)?;

    let total = (width * height) as f64;
    writeln!(file, "BIOME COUNTS:")?;
    for (tile, count) in world.biome_counts() {
        writeln!(
            file,
            "  {:<18} {:>6} ({:>5.1}%)",
            tile.name(),
            count,
            100.0 * count as f64 / total
        )?;
    }
    file.flush()?;

    println!("Wrote {}", OUTPUT);
    Ok(())
}
