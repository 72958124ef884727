//! World grid and the ordered generation pipeline
//!
//! A [`World`] owns every [`Cell`] in a flat row-major grid. Fields are
//! filled in place, once, by four stages that must run in order:
//! [`create_base_world`](World::create_base_world),
//! [`detect_boundaries`](World::detect_boundaries),
//! [`apply_terrain`](World::apply_terrain) and
//! [`assign_biomes`](World::assign_biomes). Until a stage has run, the fields
//! it produces hold their default values.

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biomes::TileType;
use crate::climate::{self, ClimateParams};
use crate::config::GeneratorConfig;
use crate::error::WorldError;
use crate::heightmap::{self, HeightParams};
use crate::noise_field::CoherentNoise;
use crate::plates::{self, BoundaryEdge, BoundaryType, CrustType, Plate, PlateId, TectonicsGenerator};
use crate::seeds::WorldSeeds;
use crate::tilemap::Tilemap;

/// Pipeline progress. Each variant names the last stage that completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Empty,
    BaseWorld,
    Boundaries,
    Terrain,
    Biomes,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Empty => "empty",
            Stage::BaseWorld => "create_base_world",
            Stage::Boundaries => "detect_boundaries",
            Stage::Terrain => "apply_terrain",
            Stage::Biomes => "assign_biomes",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One grid element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
    pub plate_id: PlateId,
    pub crust_type: CrustType,
    pub is_boundary: bool,
    pub boundary_type: Option<BoundaryType>,
    /// Elevation in meters, negative underwater
    pub height: f32,
    pub tile_type: Option<TileType>,
    pub color: [u8; 3],
    /// Moisture in [0, 1]
    pub moisture: f32,
}

/// Per-plate summary after boundary detection.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateStats {
    pub id: PlateId,
    pub crust_type: CrustType,
    pub cells: usize,
    pub boundary_cells: usize,
}

/// All generated world data bundled together
pub struct World {
    pub width: usize,
    pub height: usize,
    cells: Tilemap<Cell>,
    plate_map: Tilemap<PlateId>,
    plates: Vec<Plate>,
    boundary_edges: Vec<BoundaryEdge>,
    stage: Stage,
}

impl World {
    /// Wrap a finished plate field. Every cell of `plate_map` must reference
    /// an existing plate, and `plates[i].id` must be `PlateId(i)`.
    pub fn new(
        width: usize,
        height: usize,
        plate_map: Tilemap<PlateId>,
        plates: Vec<Plate>,
    ) -> Result<Self, WorldError> {
        if plate_map.width != width || plate_map.height != height {
            return Err(WorldError::DimensionMismatch {
                width,
                height,
                found_width: plate_map.width,
                found_height: plate_map.height,
            });
        }
        if let Some((x, y, id)) = plate_map.iter().find(|(_, _, id)| id.index() >= plates.len()) {
            return Err(WorldError::UnknownPlate {
                x,
                y,
                plate: id.0,
                count: plates.len(),
            });
        }

        let mut cells: Tilemap<Cell> = Tilemap::new(width, height);
        for (x, y, cell) in cells.iter_mut() {
            cell.x = x;
            cell.y = y;
        }

        Ok(Self {
            width,
            height,
            cells,
            plate_map,
            plates,
            boundary_edges: Vec::new(),
            stage: Stage::Empty,
        })
    }

    /// Run the whole pipeline from a configuration and seed set.
    pub fn generate(config: &GeneratorConfig, seeds: &WorldSeeds) -> Result<Self, WorldError> {
        config.validate()?;

        let (plate_map, plates) = TectonicsGenerator::new(config.plates.clone(), seeds.tectonics)?
            .with_noise_seed(seeds.plate_noise)
            .generate();
        let mut world = World::new(config.plates.width, config.plates.height, plate_map, plates)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seeds.heightmap);
        world.create_base_world()?;
        world.detect_boundaries()?;
        world.apply_terrain(&config.terrain, &mut rng, seeds.terrain_noise)?;
        world.assign_biomes(&config.climate, seeds.climate_noise)?;
        Ok(world)
    }

    fn require(&self, requested: Stage, required: Stage) -> Result<(), WorldError> {
        if self.stage != required {
            return Err(WorldError::StageOrder {
                requested,
                required,
                current: self.stage,
            });
        }
        Ok(())
    }

    /// Copy plate ownership and crust type onto every cell.
    pub fn create_base_world(&mut self) -> Result<(), WorldError> {
        self.require(Stage::BaseWorld, Stage::Empty)?;

        for (x, y, cell) in self.cells.iter_mut() {
            let plate_id = *self.plate_map.get(x, y);
            cell.plate_id = plate_id;
            cell.crust_type = self.plates[plate_id.index()].crust_type;
        }

        self.stage = Stage::BaseWorld;
        info!("base world: {}x{} cells over {} plates", self.width, self.height, self.plates.len());
        Ok(())
    }

    /// Mark cells on plate boundaries and classify each boundary.
    ///
    /// Both cells of a differing pair are marked. A cell bordering several
    /// plates keeps the strongest type found (convergent over divergent over
    /// transform).
    pub fn detect_boundaries(&mut self) -> Result<(), WorldError> {
        self.require(Stage::Boundaries, Stage::BaseWorld)?;

        let edges = plates::find_boundary_edges(&self.plate_map, &self.plates);
        for edge in &edges {
            for (x, y) in [edge.a, edge.b] {
                let cell = self.cells.get_mut(x, y);
                cell.is_boundary = true;
                cell.boundary_type = Some(BoundaryType::strongest(cell.boundary_type, edge.kind));
            }
        }

        let count = |kind: BoundaryType| edges.iter().filter(|e| e.kind == kind).count();
        info!(
            "boundaries: {} edges ({} convergent, {} divergent, {} transform)",
            edges.len(),
            count(BoundaryType::Convergent),
            count(BoundaryType::Divergent),
            count(BoundaryType::Transform),
        );

        self.boundary_edges = edges;
        self.stage = Stage::Boundaries;
        Ok(())
    }

    /// Synthesize heights. Base elevations are drawn from `rng`; roughness
    /// noise is keyed by `noise_seed`.
    pub fn apply_terrain(
        &mut self,
        params: &HeightParams,
        rng: &mut ChaCha8Rng,
        noise_seed: u64,
    ) -> Result<(), WorldError> {
        self.require(Stage::Terrain, Stage::Boundaries)?;

        let crust_map = self.cells.map(|c| c.crust_type);
        let convergent = self.cells.map(|c| c.boundary_type == Some(BoundaryType::Convergent));
        let noise = CoherentNoise::new(noise_seed);

        let heights = heightmap::synthesize_heights(&crust_map, &convergent, params, rng, &noise);
        for (x, y, cell) in self.cells.iter_mut() {
            cell.height = *heights.get(x, y);
        }

        self.stage = Stage::Terrain;
        let above_sea = self.cells.iter().filter(|(_, _, c)| c.height >= 0.0).count();
        info!(
            "terrain: {:.1}% of cells above sea level",
            100.0 * above_sea as f64 / self.cells.len() as f64
        );
        Ok(())
    }

    /// Derive moisture and temperature from heights and classify every cell.
    pub fn assign_biomes(&mut self, params: &ClimateParams, noise_seed: u64) -> Result<(), WorldError> {
        self.require(Stage::Biomes, Stage::Terrain)?;

        let heights = self.height_map();
        let noise = CoherentNoise::new(noise_seed);
        let climate = climate::generate_climate(&heights, params, &noise);

        for (x, y, cell) in self.cells.iter_mut() {
            cell.moisture = *climate.moisture.get(x, y);
            let tile = TileType::classify(
                cell.height,
                *climate.temperature.get(x, y),
                *climate.classification_moisture.get(x, y),
            );
            cell.tile_type = Some(tile);
            cell.color = tile.color();
        }

        self.stage = Stage::Biomes;
        for tile in TileType::all() {
            let n = self.cells.iter().filter(|(_, _, c)| c.tile_type == Some(*tile)).count();
            debug!("biome {tile}: {n} cells");
        }
        info!("biomes assigned");
        Ok(())
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Biomes
    }

    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        self.cells.get(x, y)
    }

    pub fn cells(&self) -> &Tilemap<Cell> {
        &self.cells
    }

    pub fn plate_map(&self) -> &Tilemap<PlateId> {
        &self.plate_map
    }

    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    /// Boundary pairs found by [`detect_boundaries`](World::detect_boundaries).
    pub fn boundary_edges(&self) -> &[BoundaryEdge] {
        &self.boundary_edges
    }

    pub fn height_map(&self) -> Tilemap<f32> {
        self.cells.map(|c| c.height)
    }

    pub fn moisture_map(&self) -> Tilemap<f32> {
        self.cells.map(|c| c.moisture)
    }

    /// Per-plate cell and boundary counts.
    pub fn plate_stats(&self) -> Vec<PlateStats> {
        let mut stats: Vec<PlateStats> = self
            .plates
            .iter()
            .map(|p| PlateStats {
                id: p.id,
                crust_type: p.crust_type,
                cells: 0,
                boundary_cells: 0,
            })
            .collect();

        for (_, _, cell) in self.cells.iter() {
            let entry = &mut stats[cell.plate_id.index()];
            entry.cells += 1;
            if cell.is_boundary {
                entry.boundary_cells += 1;
            }
        }
        stats
    }

    /// Number of cells per tile type, in [`TileType::all`] order.
    pub fn biome_counts(&self) -> Vec<(TileType, usize)> {
        TileType::all()
            .iter()
            .map(|&tile| {
                let n = self.cells.iter().filter(|(_, _, c)| c.tile_type == Some(tile)).count();
                (tile, n)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plates::{PlateFieldConfig, Vec2};

    fn two_plate_world(left: Plate, right: Plate, width: usize, height: usize) -> World {
        let mut plate_map = Tilemap::new_with(width, height, PlateId(0));
        for y in 0..height {
            for x in width / 2..width {
                plate_map.set(x, y, PlateId(1));
            }
        }
        World::new(width, height, plate_map, vec![left, right]).unwrap()
    }

    fn small_config(seed_plates: usize) -> GeneratorConfig {
        GeneratorConfig {
            plates: PlateFieldConfig {
                width: 48,
                height: 32,
                plate_count: seed_plates,
                ..PlateFieldConfig::default()
            },
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_stage_order_enforced() {
        let plates = vec![Plate::fixed(PlateId(0), CrustType::Oceanic, Vec2::default())];
        let mut world = World::new(4, 4, Tilemap::new_with(4, 4, PlateId(0)), plates).unwrap();

        let err = world.detect_boundaries().unwrap_err();
        assert_eq!(
            err,
            WorldError::StageOrder {
                requested: Stage::Boundaries,
                required: Stage::BaseWorld,
                current: Stage::Empty,
            }
        );
        assert!(world.assign_biomes(&ClimateParams::default(), 0).is_err());

        world.create_base_world().unwrap();
        assert!(world.create_base_world().is_err());
        assert_eq!(world.stage(), Stage::BaseWorld);

        // Fields from later stages are still at their defaults
        assert_eq!(world.cell(1, 1).height, 0.0);
        assert_eq!(world.cell(1, 1).tile_type, None);
    }

    #[test]
    fn test_rejects_mismatched_inputs() {
        let plates = vec![Plate::fixed(PlateId(0), CrustType::Oceanic, Vec2::default())];
        assert!(matches!(
            World::new(5, 4, Tilemap::new_with(4, 4, PlateId(0)), plates.clone()),
            Err(WorldError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            World::new(4, 4, Tilemap::new_with(4, 4, PlateId(3)), plates),
            Err(WorldError::UnknownPlate { plate: 3, count: 1, .. })
        ));
    }

    #[test]
    fn test_base_world_copies_plate_data() {
        let left = Plate::fixed(PlateId(0), CrustType::Continental, Vec2::default());
        let right = Plate::fixed(PlateId(1), CrustType::Mixed, Vec2::default());
        let mut world = two_plate_world(left, right, 6, 3);
        world.create_base_world().unwrap();

        assert_eq!(world.cell(0, 0).crust_type, CrustType::Continental);
        assert_eq!(world.cell(5, 2).crust_type, CrustType::Mixed);
        assert_eq!(world.cell(5, 2).plate_id, PlateId(1));
        assert_eq!((world.cell(4, 1).x, world.cell(4, 1).y), (4, 1));
    }

    #[test]
    fn test_boundary_cells_are_symmetric() {
        let left = Plate::fixed(PlateId(0), CrustType::Continental, Vec2::new(5.0, 0.0));
        let right = Plate::fixed(PlateId(1), CrustType::Oceanic, Vec2::new(0.0, 0.0));
        let mut world = two_plate_world(left, right, 8, 5);
        world.create_base_world().unwrap();
        world.detect_boundaries().unwrap();

        for y in 0..5 {
            for x in 0..8 {
                let cell = world.cell(x, y);
                let on_seam = x == 3 || x == 4;
                assert_eq!(cell.is_boundary, on_seam, "({x}, {y})");
                if on_seam {
                    assert_eq!(cell.boundary_type, Some(BoundaryType::Convergent));
                } else {
                    assert_eq!(cell.boundary_type, None);
                }
            }
        }
    }

    /// Symmetry holds per edge: both cells of a differing pair are marked and
    /// share the edge's `kind`. A cell's own `boundary_type` is the strongest
    /// kind over all its edges, so two neighbors may keep different types.
    #[test]
    fn test_generated_boundaries_symmetric() {
        let world = World::generate(&small_config(8), &WorldSeeds::from_master(21)).unwrap();
        assert!(!world.boundary_edges().is_empty());

        for edge in world.boundary_edges() {
            let a = world.cell(edge.a.0, edge.a.1);
            let b = world.cell(edge.b.0, edge.b.1);
            assert_ne!(a.plate_id, b.plate_id);
            assert!(a.is_boundary && b.is_boundary);

            // The edge kind is what classifying the pair gives
            let relative = world.plates()[edge.plate_a.index()].velocity
                - world.plates()[edge.plate_b.index()].velocity;
            let dx = edge.b.0 as f32 - edge.a.0 as f32;
            let dy = edge.b.1 as f32 - edge.a.1 as f32;
            let normal = Vec2::new(dx / (1.0 + 1e-6), dy / (1.0 + 1e-6));
            assert_eq!(edge.kind, plates::classify_boundary(relative, normal));

            // Each cell keeps the strongest kind over all its edges
            for (x, y) in [edge.a, edge.b] {
                let strongest = world
                    .boundary_edges()
                    .iter()
                    .filter(|e| e.a == (x, y) || e.b == (x, y))
                    .map(|e| e.kind)
                    .max_by_key(|k| k.precedence());
                assert_eq!(world.cell(x, y).boundary_type, strongest);
            }
        }

        // Every differing adjacent pair is an edge
        let differing = world
            .cells()
            .iter()
            .map(|(x, y, c)| {
                world
                    .cells()
                    .neighbors(x, y)
                    .filter(|&(nx, ny)| (nx, ny) > (x, y) && world.cell(nx, ny).plate_id != c.plate_id)
                    .count()
            })
            .sum::<usize>();
        assert_eq!(differing, world.boundary_edges().len());
    }

    #[test]
    fn test_full_pipeline_classifies_everything() {
        let world = World::generate(&small_config(6), &WorldSeeds::from_master(5)).unwrap();
        assert!(world.is_complete());

        for (_, _, cell) in world.cells().iter() {
            let tile = cell.tile_type.expect("classified");
            assert_eq!(cell.color, tile.color());
            assert!((0.0..=1.0).contains(&cell.moisture));
            if cell.height < 0.0 {
                assert!(tile.is_water());
                assert_eq!(cell.moisture, 1.0);
            }
        }

        let total: usize = world.biome_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(total, 48 * 32);
        let stats = world.plate_stats();
        assert_eq!(stats.iter().map(|s| s.cells).sum::<usize>(), 48 * 32);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let config = small_config(7);
        let seeds = WorldSeeds::from_master(99);
        let a = World::generate(&config, &seeds).unwrap();
        let b = World::generate(&config, &seeds).unwrap();
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn test_continents_stand_higher_than_oceans() {
        let mut continental = (0.0f64, 0usize);
        let mut oceanic = (0.0f64, 0usize);

        for seed in 0..12 {
            let world = World::generate(&small_config(8), &WorldSeeds::from_master(seed)).unwrap();

            let convergent = world
                .cells()
                .map(|c| c.boundary_type == Some(BoundaryType::Convergent));
            let distance = crate::distance::distance_transform(&convergent);

            for (x, y, cell) in world.cells().iter() {
                if *distance.get(x, y) < 8.0 {
                    continue;
                }
                match cell.crust_type {
                    CrustType::Continental => {
                        continental.0 += cell.height as f64;
                        continental.1 += 1;
                    }
                    CrustType::Oceanic => {
                        oceanic.0 += cell.height as f64;
                        oceanic.1 += 1;
                    }
                    CrustType::Mixed => {}
                }
            }
        }

        assert!(continental.1 > 0 && oceanic.1 > 0);
        let continental_mean = continental.0 / continental.1 as f64;
        let oceanic_mean = oceanic.0 / oceanic.1 as f64;
        assert!(
            continental_mean > oceanic_mean,
            "continental {continental_mean:.1} vs oceanic {oceanic_mean:.1}"
        );
    }

    #[test]
    fn test_single_plate_world() {
        let config = GeneratorConfig {
            plates: PlateFieldConfig {
                width: 4,
                height: 4,
                plate_count: 1,
                ..PlateFieldConfig::default()
            },
            ..GeneratorConfig::default()
        };
        let world = World::generate(&config, &WorldSeeds::from_master(3)).unwrap();
        assert!(world.cells().iter().all(|(_, _, c)| c.plate_id == PlateId(0)));
        assert!(world.cells().iter().all(|(_, _, c)| !c.is_boundary));
        assert!(world.boundary_edges().is_empty());
    }
}
