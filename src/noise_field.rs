//! Coherent noise keyed by absolute grid coordinates.
//!
//! Every consumer (plate growth costs, terrain roughness, climate
//! perturbation) samples the same family: seeded Perlin layered as fBm.

use noise::{NoiseFn, Perlin};

/// Seeded fractal noise source.
#[derive(Clone)]
pub struct CoherentNoise {
    perlin: Perlin,
    persistence: f64,
    lacunarity: f64,
}

impl CoherentNoise {
    pub const DEFAULT_PERSISTENCE: f64 = 0.5;
    pub const DEFAULT_LACUNARITY: f64 = 2.0;

    pub fn new(seed: u64) -> Self {
        Self {
            perlin: Perlin::new(fold_seed(seed)),
            persistence: Self::DEFAULT_PERSISTENCE,
            lacunarity: Self::DEFAULT_LACUNARITY,
        }
    }

    /// Fractional Brownian motion at (x, y), normalised by the summed
    /// amplitude so the result stays roughly within [-1, 1].
    pub fn fbm(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_value = 0.0;

        for _ in 0..octaves.max(1) {
            total += amplitude * self.perlin.get([x * frequency, y * frequency]);
            max_value += amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        total / max_value
    }
}

/// Fold a 64-bit seed into the 32 bits Perlin accepts.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
