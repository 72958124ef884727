//! Biome classification.
//!
//! A closed set of tile types, each bound to one display color, reached
//! only through [`TileType::classify`].

use serde::{Deserialize, Serialize};

// =============================================================================
// CLASSIFICATION THRESHOLDS
// =============================================================================

const MOUNTAIN_HEIGHT: f32 = 2500.0;     // Anything above is mountain
const DEEP_OCEAN_HEIGHT: f32 = -2000.0;  // Anything below is deep ocean
const SEA_LEVEL: f32 = 0.0;              // Below this (and above deep ocean) is shelf

const TROPICAL_TEMP: f32 = 0.6;
const TEMPERATE_TEMP: f32 = 0.3;
const TUNDRA_TEMP: f32 = 0.1;
const WET_MOISTURE: f32 = 0.5;

/// Land/water partition of tile types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BiomeCategory {
    Water,
    Land,
}

/// Terrain tile type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    Mountain,
    DeepOcean,
    Shelf,
    TropicalForest,
    Desert,
    TemperateForest,
    Grassland,
    Tundra,
    Ice,
}

impl TileType {
    /// Classify a cell from its elevation (meters), temperature proxy and
    /// moisture. Total over the real-valued domain; NaN inputs fall through
    /// to the coldest land biome.
    pub fn classify(height: f32, temperature: f32, moisture: f32) -> TileType {
        if height > MOUNTAIN_HEIGHT {
            return TileType::Mountain;
        }
        if height < DEEP_OCEAN_HEIGHT {
            return TileType::DeepOcean;
        }
        if height < SEA_LEVEL {
            return TileType::Shelf;
        }

        let wet = moisture > WET_MOISTURE;
        match temperature {
            t if t > TROPICAL_TEMP => {
                if wet { TileType::TropicalForest } else { TileType::Desert }
            }
            t if t > TEMPERATE_TEMP => {
                if wet { TileType::TemperateForest } else { TileType::Grassland }
            }
            t if t > TUNDRA_TEMP => TileType::Tundra,
            _ => TileType::Ice,
        }
    }

    /// Display color.
    pub fn color(&self) -> [u8; 3] {
        match self {
            TileType::Mountain => [120, 110, 100],
            TileType::DeepOcean => [0, 0, 128],
            TileType::Shelf => [0, 0, 255],
            TileType::TropicalForest => [34, 139, 34],
            TileType::Desert => [237, 201, 175],
            TileType::TemperateForest => [107, 142, 35],
            TileType::Grassland => [189, 183, 107],
            TileType::Tundra => [198, 226, 255],
            TileType::Ice => [255, 255, 255],
        }
    }

    pub fn category(&self) -> BiomeCategory {
        match self {
            TileType::DeepOcean | TileType::Shelf => BiomeCategory::Water,
            _ => BiomeCategory::Land,
        }
    }

    pub fn is_water(&self) -> bool {
        self.category() == BiomeCategory::Water
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileType::Mountain => "mountain",
            TileType::DeepOcean => "deep_ocean",
            TileType::Shelf => "shelf",
            TileType::TropicalForest => "tropical_forest",
            TileType::Desert => "desert",
            TileType::TemperateForest => "temperate_forest",
            TileType::Grassland => "grassland",
            TileType::Tundra => "tundra",
            TileType::Ice => "ice",
        }
    }

    /// Single-character glyph for text dumps.
    pub fn glyph(&self) -> char {
        match self {
            TileType::Mountain => '^',
            TileType::DeepOcean => '~',
            TileType::Shelf => '-',
            TileType::TropicalForest => 'T',
            TileType::Desert => '.',
            TileType::TemperateForest => 'f',
            TileType::Grassland => 'g',
            TileType::Tundra => 't',
            TileType::Ice => '#',
        }
    }

    pub fn all() -> &'static [TileType] {
        &[
            TileType::Mountain,
            TileType::DeepOcean,
            TileType::Shelf,
            TileType::TropicalForest,
            TileType::Desert,
            TileType::TemperateForest,
            TileType::Grassland,
            TileType::Tundra,
            TileType::Ice,
        ]
    }
}

impl std::fmt::Display for TileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
