//! Structural addresses into polygons

use std::fmt;

use fc_geom::{Point, point_serde};
use serde::{Deserialize, Serialize};

/// Polygon index plus position inside it.
///
/// `pos == EDGE_POS` addresses edge-level data; `pos >= 0` addresses a
/// specific vertex, edge or multi-dock slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolyId {
    pub idx: i32,
    pub pos: i32,
}

impl PolyId {
    pub const EDGE_POS: i32 = -1;

    pub fn new(idx: i32, pos: i32) -> Self {
        Self { idx, pos }
    }

    /// Edge-level address for polygon `idx`
    pub fn edge(idx: i32) -> Self {
        Self::new(idx, Self::EDGE_POS)
    }

    pub fn is_edge_level(&self) -> bool {
        self.pos == Self::EDGE_POS
    }

    pub fn is_multi_dock(&self) -> bool {
        self.pos >= 0
    }
}

impl fmt::Display for PolyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.idx, self.pos)
    }
}

/// A docking point tied to a location on another polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockData {
    #[serde(with = "point_serde")]
    pub pt: Point,
    pub idx: PolyId,
}

impl DockData {
    pub fn new(pt: Point, idx: PolyId) -> Self {
        Self { pt, idx }
    }
}
