use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::distance::{distance_transform, gaussian_blur};
use crate::noise_field::CoherentNoise;
use crate::plates::CrustType;
use crate::tilemap::Tilemap;

// =============================================================================
// HEIGHT PARAMETERS
// =============================================================================

/// Parameters for height synthesis. Heights are meters, negative underwater.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightParams {
    /// Base elevation band for continental crust
    pub continental_band: (f32, f32),
    /// Base elevation band for oceanic and mixed crust
    pub oceanic_band: (f32, f32),
    /// Peak uplift at a convergent boundary
    pub uplift_peak: f32,
    /// e-folding distance (cells) of uplift away from the boundary
    pub uplift_falloff: f32,
    /// Gaussian sigma (cells) of the smoothing pass
    pub blur_sigma: f32,
    /// Cells per noise unit for roughness
    pub roughness_scale: f64,
    pub continental_octaves: u32,
    pub continental_amplitude: f32,
    pub oceanic_octaves: u32,
    pub oceanic_amplitude: f32,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            continental_band: (0.0, 500.0),
            oceanic_band: (-4000.0, -2000.0),
            uplift_peak: 4000.0,
            uplift_falloff: 5.0,
            blur_sigma: 1.5,
            roughness_scale: 20.0,
            continental_octaves: 3,
            continental_amplitude: 50.0,
            oceanic_octaves: 2,
            oceanic_amplitude: 20.0,
        }
    }
}

impl HeightParams {
    /// Base elevation band for a crust type. Mixed crust sits with the
    /// ocean floor.
    pub fn band(&self, crust: CrustType) -> (f32, f32) {
        match crust {
            CrustType::Continental => self.continental_band,
            CrustType::Oceanic | CrustType::Mixed => self.oceanic_band,
        }
    }
}

// =============================================================================
// STAGES
// =============================================================================

/// Stage 1: uniform sample from each cell's crust band, in row-major order.
pub fn base_elevation<R: Rng + ?Sized>(
    crust_map: &Tilemap<CrustType>,
    params: &HeightParams,
    rng: &mut R,
) -> Tilemap<f32> {
    let mut heights = Tilemap::new_with(crust_map.width, crust_map.height, 0.0f32);
    for (x, y, &crust) in crust_map.iter() {
        let (low, high) = params.band(crust);
        let h = if high > low { rng.gen_range(low..high) } else { low };
        heights.set(x, y, h);
    }
    heights
}

/// Stage 2: uplift decaying exponentially with Euclidean distance from the
/// nearest convergent boundary cell. Zero everywhere without any.
pub fn uplift(convergent: &Tilemap<bool>, params: &HeightParams) -> Tilemap<f32> {
    if !convergent.iter().any(|(_, _, &c)| c) {
        warn!("no convergent boundaries, skipping uplift");
        return Tilemap::new_with(convergent.width, convergent.height, 0.0);
    }

    let distance = distance_transform(convergent);
    distance.map(|&d| (-d / params.uplift_falloff).exp() * params.uplift_peak)
}

/// Stage 4: coherent roughness, rougher on continental crust.
pub fn apply_roughness(
    heights: &mut Tilemap<f32>,
    crust_map: &Tilemap<CrustType>,
    params: &HeightParams,
    noise: &CoherentNoise,
) {
    for (x, y, h) in heights.iter_mut() {
        let (octaves, amplitude) = match *crust_map.get(x, y) {
            CrustType::Continental => (params.continental_octaves, params.continental_amplitude),
            _ => (params.oceanic_octaves, params.oceanic_amplitude),
        };
        let n = noise.fbm(
            x as f64 / params.roughness_scale,
            y as f64 / params.roughness_scale,
            octaves,
        ) as f32;
        *h += n * amplitude;
    }
}

/// Run all four stages: base bands, convergent uplift, blur, roughness.
pub fn synthesize_heights<R: Rng + ?Sized>(
    crust_map: &Tilemap<CrustType>,
    convergent: &Tilemap<bool>,
    params: &HeightParams,
    rng: &mut R,
    noise: &CoherentNoise,
) -> Tilemap<f32> {
    let mut heights = base_elevation(crust_map, params, rng);

    let lift = uplift(convergent, params);
    for (x, y, h) in heights.iter_mut() {
        *h += *lift.get(x, y);
    }

    let mut heights = gaussian_blur(&heights, params.blur_sigma);
    apply_roughness(&mut heights, crust_map, params, noise);

    if let Some((min_h, max_h)) = heights.min_max() {
        debug!("height range {min_h:.1}m to {max_h:.1}m");
    }
    heights
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_base_bands_do_not_overlap() {
        let mut crust = Tilemap::new_with(10, 10, CrustType::Continental);
        for x in 0..10 {
            crust.set(x, 0, CrustType::Oceanic);
            crust.set(x, 1, CrustType::Mixed);
        }
        let params = HeightParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let heights = base_elevation(&crust, &params, &mut rng);

        for (x, y, &h) in heights.iter() {
            match *crust.get(x, y) {
                CrustType::Continental => assert!((0.0..500.0).contains(&h)),
                _ => assert!((-4000.0..-2000.0).contains(&h)),
            }
        }
    }

    #[test]
    fn test_uplift_peaks_at_boundary() {
        let mut convergent = Tilemap::new_with(21, 5, false);
        for y in 0..5 {
            convergent.set(10, y, true);
        }
        let params = HeightParams::default();
        let lift = uplift(&convergent, &params);

        assert_eq!(*lift.get(10, 2), 4000.0);
        assert!((*lift.get(15, 2) - 4000.0 * (-1.0f32).exp()).abs() < 0.5);
        assert!(*lift.get(0, 2) < 600.0);
        for x in 11..21 {
            assert!(*lift.get(x, 2) < *lift.get(x - 1, 2));
        }
    }

    #[test]
    fn test_no_convergent_means_no_uplift() {
        let convergent = Tilemap::new_with(6, 6, false);
        let lift = uplift(&convergent, &HeightParams::default());
        assert!(lift.iter().all(|(_, _, &v)| v == 0.0));
    }

    #[test]
    fn test_roughness_is_stronger_on_land() {
        let mut crust = Tilemap::new_with(64, 64, CrustType::Oceanic);
        for y in 0..64 {
            for x in 0..32 {
                crust.set(x, y, CrustType::Continental);
            }
        }
        let params = HeightParams::default();
        let mut heights = Tilemap::new_with(64, 64, 0.0f32);
        apply_roughness(&mut heights, &crust, &params, &CoherentNoise::new(8));

        let spread = |x_range: std::ops::Range<usize>| -> f32 {
            let mut total = 0.0;
            for y in 0..64 {
                for x in x_range.clone() {
                    total += heights.get(x, y).abs();
                }
            }
            total
        };
        for (_, _, &h) in heights.iter() {
            assert!(h.abs() <= 2.0 * params.continental_amplitude);
        }
        assert!(spread(0..32) > spread(32..64));
    }

    #[test]
    fn test_synthesis_is_reproducible() {
        let crust = Tilemap::new_with(16, 16, CrustType::Continental);
        let mut convergent = Tilemap::new_with(16, 16, false);
        convergent.set(8, 8, true);
        let params = HeightParams::default();
        let noise = CoherentNoise::new(4);

        let a = synthesize_heights(&crust, &convergent, &params, &mut ChaCha8Rng::seed_from_u64(2), &noise);
        let b = synthesize_heights(&crust, &convergent, &params, &mut ChaCha8Rng::seed_from_u64(2), &noise);
        assert_eq!(a, b);
        assert!(*a.get(8, 8) > 2500.0);
    }
}
