pub mod boundaries;
pub mod generation;
pub mod types;

pub use boundaries::{classify_boundary, find_boundary_edges, BoundaryEdge, BoundaryType};
pub use generation::{generate_plate_field, grow_plate_field, plate_areas, PlateFieldConfig, TectonicsGenerator};
pub use types::{CrustType, Plate, PlateId, Vec2};
