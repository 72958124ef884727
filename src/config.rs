//! Generation parameters.
//!
//! [`GeneratorConfig`] bundles every tunable of a run. It deserializes from
//! JSON with missing fields taking their defaults, so a config file only has
//! to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::climate::ClimateParams;
use crate::error::ConfigError;
use crate::heightmap::HeightParams;
use crate::plates::PlateFieldConfig;

/// Upper bound on render blending passes.
pub const MAX_BLEND_STEPS: usize = 32;

/// Everything needed to generate and render one world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub plates: PlateFieldConfig,
    pub terrain: HeightParams,
    pub climate: ClimateParams,
    /// Passes of render-time color blending
    pub blend_steps: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            plates: PlateFieldConfig::default(),
            terrain: HeightParams::default(),
            climate: ClimateParams::default(),
            blend_steps: 3,
        }
    }
}

impl GeneratorConfig {
    /// Read a JSON config file. Fields left out keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let load_error = |reason: String| ConfigError::Load {
            path: path.display().to_string(),
            reason,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let config: GeneratorConfig =
            serde_json::from_str(&contents).map_err(|e| load_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter before any work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.plates.validate()?;
        let extent = self.plates.width.max(self.plates.height);
        validate_terrain(&self.terrain, extent)?;
        validate_climate(&self.climate)?;

        if self.blend_steps > MAX_BLEND_STEPS {
            return Err(invalid(
                "blend_steps",
                format!("{} exceeds the maximum of {MAX_BLEND_STEPS}", self.blend_steps),
            ));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be finite and positive, got {value}")))
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, format!("must be finite and non-negative, got {value}")))
    }
}

fn require_band(name: &'static str, (low, high): (f32, f32)) -> Result<(), ConfigError> {
    if low.is_finite() && high.is_finite() && low <= high {
        Ok(())
    } else {
        Err(invalid(name, format!("expected low <= high, got ({low}, {high})")))
    }
}

fn validate_terrain(params: &HeightParams, extent: usize) -> Result<(), ConfigError> {
    require_band("terrain.continental_band", params.continental_band)?;
    require_band("terrain.oceanic_band", params.oceanic_band)?;
    require_non_negative("terrain.uplift_peak", params.uplift_peak as f64)?;
    require_positive("terrain.uplift_falloff", params.uplift_falloff as f64)?;
    require_non_negative("terrain.blur_sigma", params.blur_sigma as f64)?;
    // Kernel radius is 4 sigma; keep sigma within the grid extent
    if params.blur_sigma as f64 > extent as f64 {
        return Err(invalid(
            "terrain.blur_sigma",
            format!("{} exceeds the grid extent of {extent} cells", params.blur_sigma),
        ));
    }
    require_positive("terrain.roughness_scale", params.roughness_scale)?;
    require_non_negative("terrain.continental_amplitude", params.continental_amplitude as f64)?;
    require_non_negative("terrain.oceanic_amplitude", params.oceanic_amplitude as f64)?;
    Ok(())
}

fn validate_climate(params: &ClimateParams) -> Result<(), ConfigError> {
    require_positive("climate.moisture_falloff", params.moisture_falloff as f64)?;
    require_positive("climate.noise_scale", params.noise_scale)?;
    require_non_negative("climate.noise_amplitude", params.noise_amplitude as f64)?;
    Ok(())
}
