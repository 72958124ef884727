//! Tectonic world generation library
//!
//! Plates grow over a grid, their boundaries are classified from relative
//! motion, heights follow crust type and convergent uplift, and every cell
//! is finally classified into a biome. Re-exports modules for use by
//! binaries and tools.

pub mod biome_blend;
pub mod biomes;
pub mod climate;
pub mod config;
pub mod distance;
pub mod error;
pub mod export;
pub mod heightmap;
pub mod noise_field;
pub mod plates;
pub mod seeds;
pub mod tilemap;
pub mod world;

pub use biome_blend::blend_for_render;
pub use config::GeneratorConfig;
pub use error::{ConfigError, ExportError, WorldError};
pub use seeds::WorldSeeds;
pub use world::{Cell, Stage, World};
