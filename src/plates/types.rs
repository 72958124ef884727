use std::ops::Sub;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique identifier for a tectonic plate. Doubles as the index into the
/// plate list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PlateId(pub u16);

impl PlateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PlateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Crust type of a plate. Governs thickness, density and base elevation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrustType {
    /// Thick, light crust that sits high.
    Continental,
    /// Thin, dense crust that sits low.
    #[default]
    Oceanic,
    /// Transitional crust between the two.
    Mixed,
}

impl CrustType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrustType::Continental => "continental",
            CrustType::Oceanic => "oceanic",
            CrustType::Mixed => "mixed",
        }
    }

    pub fn all() -> &'static [CrustType] {
        &[CrustType::Continental, CrustType::Oceanic, CrustType::Mixed]
    }
}

impl std::fmt::Display for CrustType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D vector (plate velocities in cm/yr, boundary normals).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// Crust sampling weights (continental, oceanic, remainder mixed)
const CONTINENTAL_WEIGHT: f32 = 0.35;
const OCEANIC_WEIGHT: f32 = 0.40;

// Plate speed range, cm/yr
const MIN_SPEED: f32 = 1.0;
const MAX_SPEED: f32 = 10.0;

// Oldest oceanic crust, Myr
const MAX_OCEANIC_AGE: f32 = 180.0;

/// A tectonic plate with its physical properties. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub id: PlateId,
    pub crust_type: CrustType,
    /// Crust thickness in km
    pub thickness_km: f32,
    /// Density in g/cm³
    pub density: f32,
    /// Velocity in cm/yr
    pub velocity: Vec2,
    /// Age of the ocean floor in Myr, oceanic crust only
    pub oceanic_age_myr: Option<f32>,
}

impl Plate {
    /// Sample a random plate with the given ID.
    pub fn random<R: Rng + ?Sized>(id: PlateId, rng: &mut R) -> Self {
        let roll: f32 = rng.gen();
        let crust_type = if roll < CONTINENTAL_WEIGHT {
            CrustType::Continental
        } else if roll < CONTINENTAL_WEIGHT + OCEANIC_WEIGHT {
            CrustType::Oceanic
        } else {
            CrustType::Mixed
        };

        Self::with_crust(id, crust_type, rng)
    }

    /// Sample the physical attributes for a plate of a fixed crust type.
    pub fn with_crust<R: Rng + ?Sized>(id: PlateId, crust_type: CrustType, rng: &mut R) -> Self {
        let (thickness_km, density) = match crust_type {
            CrustType::Continental => (rng.gen_range(120.0..200.0), 2.7),
            CrustType::Oceanic => (rng.gen_range(15.0..40.0), 3.0),
            CrustType::Mixed => (rng.gen_range(60.0..140.0), rng.gen_range(2.7..3.0)),
        };

        let speed = rng.gen_range(MIN_SPEED..MAX_SPEED);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);

        let oceanic_age_myr = match crust_type {
            CrustType::Oceanic => Some(rng.gen_range(0.0..MAX_OCEANIC_AGE)),
            _ => None,
        };

        Self {
            id,
            crust_type,
            thickness_km,
            density,
            velocity,
            oceanic_age_myr,
        }
    }

    /// A plate with explicit velocity and nominal attributes for its crust.
    /// Useful for hand-built scenarios.
    pub fn fixed(id: PlateId, crust_type: CrustType, velocity: Vec2) -> Self {
        let (thickness_km, density) = match crust_type {
            CrustType::Continental => (160.0, 2.7),
            CrustType::Oceanic => (25.0, 3.0),
            CrustType::Mixed => (100.0, 2.85),
        };
        Self {
            id,
            crust_type,
            thickness_km,
            density,
            velocity,
            oceanic_age_myr: (crust_type == CrustType::Oceanic).then_some(90.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_random_plate_attributes_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for i in 0..500 {
            let plate = Plate::random(PlateId(i), &mut rng);
            let speed = plate.velocity.length();
            assert!(speed >= MIN_SPEED - 1e-3 && speed <= MAX_SPEED + 1e-3, "speed {speed}");

            match plate.crust_type {
                CrustType::Continental => {
                    assert!((120.0..200.0).contains(&plate.thickness_km));
                    assert_eq!(plate.density, 2.7);
                    assert!(plate.oceanic_age_myr.is_none());
                }
                CrustType::Oceanic => {
                    assert!((15.0..40.0).contains(&plate.thickness_km));
                    assert_eq!(plate.density, 3.0);
                    let age = plate.oceanic_age_myr.unwrap();
                    assert!((0.0..MAX_OCEANIC_AGE).contains(&age));
                }
                CrustType::Mixed => {
                    assert!((60.0..140.0).contains(&plate.thickness_km));
                    assert!((2.7..3.0).contains(&plate.density));
                    assert!(plate.oceanic_age_myr.is_none());
                }
            }
        }
    }

    #[test]
    fn test_all_crust_types_sampled() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let plates: Vec<Plate> = (0..200).map(|i| Plate::random(PlateId(i), &mut rng)).collect();
        for crust in CrustType::all() {
            assert!(plates.iter().any(|p| p.crust_type == *crust), "no {crust} plates");
        }
    }

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(5.0, 0.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a - b, Vec2::new(4.0, -2.0));
        assert_eq!(a.dot(&b), 5.0);
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
    }
}
