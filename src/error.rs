//! Error types for world generation.
//!
//! Configuration problems are caught before any generation work starts.
//! Pipeline misuse (stages called out of order, mismatched inputs) is
//! reported by [`WorldError`]. Numerically degenerate cases are not errors.

use thiserror::Error;

use crate::world::Stage;

/// Invalid generation parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid dimensions {width}x{height} overflow the cell count")]
    GridTooLarge { width: usize, height: usize },

    #[error("plate count must be at least 1")]
    NoPlates,

    #[error("plate count {plates} exceeds the {cells} available cells")]
    TooManyPlates { plates: usize, cells: usize },

    #[error("plate count {0} exceeds the supported maximum of 65535")]
    PlateIdOverflow(usize),

    #[error("noise scale must be finite and positive, got {0}")]
    InvalidNoiseScale(f64),

    #[error("noise strength must be finite and non-negative, got {0}")]
    InvalidNoiseStrength(f64),

    #[error("parameter `{name}` is invalid: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Errors raised while driving the [`World`](crate::world::World) pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("plate map is {found_width}x{found_height}, world is {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("cell ({x}, {y}) references plate {plate} but only {count} plates exist")]
    UnknownPlate { x: usize, y: usize, plate: u16, count: usize },

    #[error("stage `{requested}` requires stage `{required}` to have run, world is at `{current}`")]
    StageOrder {
        requested: Stage,
        required: Stage,
        current: Stage,
    },
}

/// Errors raised while writing world data to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("world is not fully generated (at stage `{0}`)")]
    Incomplete(Stage),
}
