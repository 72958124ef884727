//! Plate boundary classification from relative plate motion.

use serde::{Deserialize, Serialize};

use crate::tilemap::Tilemap;

use super::types::{Plate, PlateId, Vec2};

/// Relative speed along the boundary normal above which plates close.
const CONVERGENT_THRESHOLD: f32 = 0.5;
/// Relative speed along the boundary normal below which plates spread.
const DIVERGENT_THRESHOLD: f32 = -0.5;
/// Guard added to the normal length before normalising.
const NORMAL_EPSILON: f32 = 1e-6;

/// How two plates interact along a shared edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryType {
    /// Plates closing on each other. Drives uplift.
    Convergent,
    /// Plates spreading apart.
    Divergent,
    /// Plates sliding past each other.
    Transform,
}

impl BoundaryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryType::Convergent => "convergent",
            BoundaryType::Divergent => "divergent",
            BoundaryType::Transform => "transform",
        }
    }

    /// Rank used when one cell borders several plates: the stronger
    /// interaction wins.
    pub fn precedence(&self) -> u8 {
        match self {
            BoundaryType::Convergent => 2,
            BoundaryType::Divergent => 1,
            BoundaryType::Transform => 0,
        }
    }

    /// Merge a newly found edge type into a cell's current type.
    pub fn strongest(current: Option<BoundaryType>, found: BoundaryType) -> BoundaryType {
        match current {
            Some(existing) if existing.precedence() >= found.precedence() => existing,
            _ => found,
        }
    }
}

impl std::fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a boundary from the velocity of the cell's plate relative to the
/// neighbor's plate, projected on the unit normal pointing from cell to
/// neighbor. A near-zero relative velocity projects to ~0 and lands on
/// `Transform`.
pub fn classify_boundary(relative_velocity: Vec2, normal: Vec2) -> BoundaryType {
    let dot = relative_velocity.dot(&normal);
    if dot > CONVERGENT_THRESHOLD {
        BoundaryType::Convergent
    } else if dot < DIVERGENT_THRESHOLD {
        BoundaryType::Divergent
    } else {
        BoundaryType::Transform
    }
}

/// One pair of orthogonally adjacent cells owned by different plates.
/// Both sides share `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundaryEdge {
    pub a: (usize, usize),
    pub b: (usize, usize),
    pub plate_a: PlateId,
    pub plate_b: PlateId,
    pub kind: BoundaryType,
}

/// Find and classify every adjacent pair of cells on different plates.
///
/// Each cell is compared with its right and bottom neighbor only, so every
/// adjacent pair is visited exactly once. Edges come out in row-major order.
pub fn find_boundary_edges(plate_map: &Tilemap<PlateId>, plates: &[Plate]) -> Vec<BoundaryEdge> {
    let mut edges = Vec::new();

    for y in 0..plate_map.height {
        for x in 0..plate_map.width {
            let plate_a = *plate_map.get(x, y);

            for (dx, dy) in [(1, 0), (0, 1)] {
                let Some((nx, ny)) = plate_map.offset(x, y, dx, dy) else {
                    continue;
                };
                let plate_b = *plate_map.get(nx, ny);
                if plate_a == plate_b {
                    continue;
                }

                let relative_velocity =
                    plates[plate_a.index()].velocity - plates[plate_b.index()].velocity;
                let raw = Vec2::new(dx as f32, dy as f32);
                let len = raw.length() + NORMAL_EPSILON;
                let normal = Vec2::new(raw.x / len, raw.y / len);

                edges.push(BoundaryEdge {
                    a: (x, y),
                    b: (nx, ny),
                    plate_a,
                    plate_b,
                    kind: classify_boundary(relative_velocity, normal),
                });
            }
        }
    }

    edges
}
