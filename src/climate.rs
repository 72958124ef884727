//! Climate proxies derived from the finished height field.
//!
//! Temperature is a latitude proxy in roughly [0, 1]; moisture falls off
//! with distance from the nearest underwater cell. Both get a small
//! coherent-noise nudge before classification so biome borders are not
//! perfectly straight bands.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::distance::distance_transform;
use crate::noise_field::CoherentNoise;
use crate::tilemap::Tilemap;

/// Parameters for the climate proxies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateParams {
    /// e-folding distance (cells) of moisture away from water
    pub moisture_falloff: f32,
    /// Cells per noise unit for the perturbation
    pub noise_scale: f64,
    pub noise_octaves: u32,
    /// Perturbation added to temperature and moisture, times the noise value
    pub noise_amplitude: f32,
}

impl Default for ClimateParams {
    fn default() -> Self {
        Self {
            moisture_falloff: 30.0,
            noise_scale: 10.0,
            noise_octaves: 2,
            noise_amplitude: 0.1,
        }
    }
}

/// Per-cell climate inputs for classification.
pub struct Climate {
    /// Unperturbed moisture in [0, 1], stored on the cells
    pub moisture: Tilemap<f32>,
    /// Perturbed temperature proxy used for classification
    pub temperature: Tilemap<f32>,
    /// Perturbed moisture used for classification
    pub classification_moisture: Tilemap<f32>,
}

/// Temperature proxy for a row: 1 at the vertical center, falling linearly
/// to 0 at synthetic latitudes of ±90.
pub fn latitude_temperature(y: usize, height: usize) -> f32 {
    let latitude = (y as f32 / height as f32) * 180.0 - 90.0;
    1.0 - latitude.abs() / 90.0
}

/// Moisture from distance to water. Cells with negative height are water
/// (distance 0, moisture 1). A map without water is dry everywhere.
pub fn generate_moisture(heights: &Tilemap<f32>, falloff: f32) -> Tilemap<f32> {
    let water = heights.map(|&h| h < 0.0);
    if !water.iter().any(|(_, _, &w)| w) {
        warn!("no underwater cells, moisture is zero everywhere");
    }

    let distance = distance_transform(&water);
    distance.map(|&d| {
        if d.is_finite() {
            (-d / falloff).exp()
        } else {
            0.0
        }
    })
}

/// Derive every climate input from the height field.
pub fn generate_climate(heights: &Tilemap<f32>, params: &ClimateParams, noise: &CoherentNoise) -> Climate {
    let width = heights.width;
    let height = heights.height;

    let moisture = generate_moisture(heights, params.moisture_falloff);
    let mut temperature = Tilemap::new_with(width, height, 0.0f32);
    let mut classification_moisture = Tilemap::new_with(width, height, 0.0f32);

    for y in 0..height {
        for x in 0..width {
            let n = noise.fbm(
                x as f64 / params.noise_scale,
                y as f64 / params.noise_scale,
                params.noise_octaves,
            ) as f32;
            let nudge = n * params.noise_amplitude;

            temperature.set(x, y, latitude_temperature(y, height) + nudge);
            classification_moisture.set(x, y, *moisture.get(x, y) + nudge);
        }
    }

    Climate {
        moisture,
        temperature,
        classification_moisture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_peaks_at_center() {
        assert_eq!(latitude_temperature(0, 100), 0.0);
        assert_eq!(latitude_temperature(50, 100), 1.0);
        assert!((latitude_temperature(25, 100) - 0.5).abs() < 1e-6);
        assert!((latitude_temperature(75, 100) - 0.5).abs() < 1e-6);
        assert!(latitude_temperature(99, 100) < 0.05);
    }

    #[test]
    fn test_moisture_decays_from_water() {
        let mut heights = Tilemap::new_with(40, 1, 100.0f32);
        heights.set(0, 0, -50.0);
        let moisture = generate_moisture(&heights, 30.0);

        assert_eq!(*moisture.get(0, 0), 1.0);
        assert!((*moisture.get(30, 0) - (-1.0f32).exp()).abs() < 1e-5);
        for x in 1..40 {
            assert!(*moisture.get(x, 0) < *moisture.get(x - 1, 0));
        }
    }

    #[test]
    fn test_sea_level_counts_as_land() {
        let mut heights = Tilemap::new_with(3, 1, 0.0f32);
        heights.set(0, 0, -1.0);
        let moisture = generate_moisture(&heights, 30.0);
        assert!(*moisture.get(1, 0) < 1.0);
    }

    #[test]
    fn test_dry_world() {
        let heights = Tilemap::new_with(5, 5, 10.0f32);
        let moisture = generate_moisture(&heights, 30.0);
        assert!(moisture.iter().all(|(_, _, &m)| m == 0.0));
    }

    #[test]
    fn test_perturbation_is_small() {
        let heights = Tilemap::new_with(20, 20, -100.0f32);
        let params = ClimateParams::default();
        let climate = generate_climate(&heights, &params, &CoherentNoise::new(3));

        for (x, y, &t) in climate.temperature.iter() {
            let base = latitude_temperature(y, 20);
            assert!((t - base).abs() <= 2.0 * params.noise_amplitude);
            let m = *climate.classification_moisture.get(x, y);
            assert!((m - 1.0).abs() <= 2.0 * params.noise_amplitude);
            assert_eq!(*climate.moisture.get(x, y), 1.0);
        }
    }
}
