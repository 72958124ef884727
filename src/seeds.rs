//! Seed management for world generation
//!
//! One master seed drives a run. Each stage gets its own sub-seed so that,
//! for example, the terrain roughness can be varied while the plate layout
//! stays fixed.

/// Seeds for all world generation stages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Plate attribute sampling and seed-cell placement
    pub tectonics: u64,
    /// Growth-cost noise for the plate field
    pub plate_noise: u64,
    /// Base elevation sampling
    pub heightmap: u64,
    /// Terrain roughness noise
    pub terrain_noise: u64,
    /// Temperature/moisture perturbation noise
    pub climate_noise: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            tectonics: derive_seed(master, TECTONICS_SALT),
            plate_noise: derive_seed(master, PLATE_NOISE_SALT),
            heightmap: derive_seed(master, HEIGHTMAP_SALT),
            terrain_noise: derive_seed(master, TERRAIN_NOISE_SALT),
            climate_noise: derive_seed(master, CLIMATE_NOISE_SALT),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    pub fn tectonics(mut self, seed: u64) -> Self {
        self.seeds.tectonics = seed;
        self
    }

    pub fn plate_noise(mut self, seed: u64) -> Self {
        self.seeds.plate_noise = seed;
        self
    }

    pub fn heightmap(mut self, seed: u64) -> Self {
        self.seeds.heightmap = seed;
        self
    }

    pub fn terrain_noise(mut self, seed: u64) -> Self {
        self.seeds.terrain_noise = seed;
        self
    }

    pub fn climate_noise(mut self, seed: u64) -> Self {
        self.seeds.climate_noise = seed;
        self
    }

    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

// Per-stage salts mixed into the master seed
const TECTONICS_SALT: u64 = 0x7465_6374_6f6e_6963;
const PLATE_NOISE_SALT: u64 = 0x706c_6174_656e_6f69;
const HEIGHTMAP_SALT: u64 = 0x6865_6967_6874_6d61;
const TERRAIN_NOISE_SALT: u64 = 0x7465_7272_6169_6e6e;
const CLIMATE_NOISE_SALT: u64 = 0x636c_696d_6174_656e;

/// Derive a sub-seed from a master seed and a stage salt with the
/// splitmix64 finalizer. Stable across toolchains and platforms.
fn derive_seed(master: u64, salt: u64) -> u64 {
    let mut z = (master ^ salt).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, tectonics: {}, plate_noise: {}, heightmap: {}, \
             terrain_noise: {}, climate_noise: {} }}",
            self.master,
            self.tectonics,
            self.plate_noise,
            self.heightmap,
            self.terrain_noise,
            self.climate_noise,
        )
    }
}
