use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, info, warn};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::noise_field::CoherentNoise;
use crate::tilemap::{Tilemap, NEIGHBORS_4};

use super::types::{Plate, PlateId};

/// Octaves used for the growth-cost noise.
const COST_NOISE_OCTAVES: u32 = 4;

/// Parameters for plate-field generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateFieldConfig {
    pub width: usize,
    pub height: usize,
    pub plate_count: usize,
    /// Frequency of the growth-cost noise (per cell)
    pub noise_scale: f64,
    /// How strongly the noise inflates the step cost
    pub noise_strength: f64,
}

impl Default for PlateFieldConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 200,
            plate_count: 5,
            noise_scale: 0.04,
            noise_strength: 500.0,
        }
    }
}

impl PlateFieldConfig {
    /// Reject parameters that cannot produce a complete plate field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if self.plate_count == 0 {
            return Err(ConfigError::NoPlates);
        }
        let cells = self
            .width
            .checked_mul(self.height)
            .ok_or(ConfigError::GridTooLarge {
                width: self.width,
                height: self.height,
            })?;
        if self.plate_count > cells {
            return Err(ConfigError::TooManyPlates {
                plates: self.plate_count,
                cells,
            });
        }
        if self.plate_count > u16::MAX as usize {
            return Err(ConfigError::PlateIdOverflow(self.plate_count));
        }
        if !self.noise_scale.is_finite() || self.noise_scale <= 0.0 {
            return Err(ConfigError::InvalidNoiseScale(self.noise_scale));
        }
        if !self.noise_strength.is_finite() || self.noise_strength < 0.0 {
            return Err(ConfigError::InvalidNoiseStrength(self.noise_strength));
        }
        Ok(())
    }
}

/// Frontier entry for plate expansion.
///
/// `BinaryHeap` is a max-heap, so the ordering is reversed: the entry with
/// the lowest cost compares greatest. Equal costs fall back to the lowest
/// plate id, then row, then column, so contention is resolved the same way
/// on every run.
#[derive(Clone, Copy, Debug)]
struct ExpansionCell {
    cost: f64,
    x: usize,
    y: usize,
    plate_id: PlateId,
}

impl PartialEq for ExpansionCell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ExpansionCell {}

impl PartialOrd for ExpansionCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExpansionCell {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.plate_id.cmp(&self.plate_id))
            .then_with(|| other.y.cmp(&self.y))
            .then_with(|| other.x.cmp(&self.x))
    }
}

/// Generator holding the plates sampled at construction time.
pub struct TectonicsGenerator {
    config: PlateFieldConfig,
    plates: Vec<Plate>,
    rng: ChaCha8Rng,
    noise_seed: Option<u64>,
}

impl TectonicsGenerator {
    /// Validate the configuration and sample every plate from `seed`.
    pub fn new(config: PlateFieldConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let plates = (0..config.plate_count)
            .map(|i| Plate::random(PlateId(i as u16), &mut rng))
            .collect();

        Ok(Self {
            config,
            plates,
            rng,
            noise_seed: None,
        })
    }

    /// Key the growth-cost noise by its own seed instead of drawing it from
    /// the plate RNG.
    pub fn with_noise_seed(mut self, seed: u64) -> Self {
        self.noise_seed = Some(seed);
        self
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    /// Grow the plate field. Returns the plate map and the unchanged plates.
    pub fn generate(mut self) -> (Tilemap<PlateId>, Vec<Plate>) {
        let noise_seed = match self.noise_seed {
            Some(seed) => seed,
            None => self.rng.gen(),
        };
        let noise = CoherentNoise::new(noise_seed);
        let plate_map = grow_plate_field(&self.config, &self.plates, &noise, &mut self.rng);
        (plate_map, self.plates)
    }
}

/// Generate plates and their field in one call.
pub fn generate_plate_field(
    config: &PlateFieldConfig,
    seed: u64,
) -> Result<(Tilemap<PlateId>, Vec<Plate>), ConfigError> {
    let generator = TectonicsGenerator::new(config.clone(), seed)?;
    Ok(generator.generate())
}

/// Multi-source weighted shortest-path growth.
///
/// Every plate starts from one distinct random cell at cost 0. The cheapest
/// frontier entry is expanded into its unassigned orthogonal neighbors with a
/// step cost of `1 + |noise(neighbor)| * noise_strength`. The noise depends
/// only on the neighbor's absolute coordinates, so competing fronts are
/// slowed by the same landscape and meet along irregular, non-Voronoi
/// borders. A cell is assigned once, to the first plate that reaches it.
///
/// `plates[i].id` must equal `PlateId(i)`.
pub fn grow_plate_field<R: Rng + ?Sized>(
    config: &PlateFieldConfig,
    plates: &[Plate],
    noise: &CoherentNoise,
    rng: &mut R,
) -> Tilemap<PlateId> {
    let width = config.width;
    let height = config.height;

    let mut owner: Tilemap<Option<PlateId>> = Tilemap::new_with(width, height, None);
    let mut cost_map = Tilemap::new_with(width, height, f64::INFINITY);
    let mut heap: BinaryHeap<ExpansionCell> = BinaryHeap::with_capacity(width * height);

    // Distinct seed cells so no plate is lost to a shared seed
    let seed_cells = index::sample(rng, width * height, plates.len());
    for (plate, cell) in plates.iter().zip(seed_cells.iter()) {
        let (x, y) = (cell % width, cell / width);
        owner.set(x, y, Some(plate.id));
        cost_map.set(x, y, 0.0);
        heap.push(ExpansionCell { cost: 0.0, x, y, plate_id: plate.id });
    }

    let mut pops = 0usize;
    while let Some(cell) = heap.pop() {
        pops += 1;
        if cell.cost > *cost_map.get(cell.x, cell.y) {
            continue;
        }

        for &(dx, dy) in &NEIGHBORS_4 {
            let Some((nx, ny)) = owner.offset(cell.x, cell.y, dx, dy) else {
                continue;
            };
            if owner.get(nx, ny).is_some() {
                continue;
            }

            let noise_val = noise.fbm(
                nx as f64 * config.noise_scale,
                ny as f64 * config.noise_scale,
                COST_NOISE_OCTAVES,
            );
            let step_cost = 1.0 + noise_val.abs() * config.noise_strength;
            let new_cost = cell.cost + step_cost;

            if new_cost < *cost_map.get(nx, ny) {
                cost_map.set(nx, ny, new_cost);
                owner.set(nx, ny, Some(cell.plate_id));
                heap.push(ExpansionCell {
                    cost: new_cost,
                    x: nx,
                    y: ny,
                    plate_id: cell.plate_id,
                });
            }
        }
    }
    debug!("plate growth finished after {pops} frontier pops");

    let unassigned = owner.iter().filter(|(_, _, id)| id.is_none()).count();
    if unassigned > 0 {
        warn!("{unassigned} cells were unreachable during plate growth, assigning plate 0");
    }

    let plate_map = owner.map(|id| id.unwrap_or_default());
    let areas = plate_areas(&plate_map, plates.len());
    info!(
        "grew {} plates over {}x{} cells (largest {} cells, smallest {} cells)",
        plates.len(),
        width,
        height,
        areas.iter().max().copied().unwrap_or(0),
        areas.iter().min().copied().unwrap_or(0),
    );

    plate_map
}

/// Number of cells owned by each plate.
pub fn plate_areas(plate_map: &Tilemap<PlateId>, plate_count: usize) -> Vec<usize> {
    let mut areas = vec![0usize; plate_count];
    for (_, _, id) in plate_map.iter() {
        if let Some(area) = areas.get_mut(id.index()) {
            *area += 1;
        }
    }
    areas
}
