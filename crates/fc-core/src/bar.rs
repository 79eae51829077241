//! Frame bars and sashes

use fc_geom::{Direction, Edge, PolyShape, Tolerance};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dock::DockManager;
use crate::poly_id::PolyId;

/// Structural roles assigned by the push-slide analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRoles {
    pub is_slide: bool,
    pub is_push_slide: bool,
    pub is_push_track: bool,
}

impl BarRoles {
    pub fn any(&self) -> bool {
        self.is_slide || self.is_push_slide || self.is_push_track
    }
}

/// A profile bar running along one edge of a frame polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bar {
    pub id: Uuid,
    /// Owning polygon and edge index
    pub poly_id: PolyId,
    pub edge: Edge,
    #[serde(default)]
    pub roles: BarRoles,
}

impl Bar {
    pub fn new(poly_id: PolyId, edge: Edge) -> Self {
        Self {
            id: Uuid::new_v4(),
            poly_id,
            edge,
            roles: BarRoles::default(),
        }
    }

    /// Bars along every edge of `shape`, addressed as polygon `idx`
    pub fn along(shape: &PolyShape, idx: i32) -> Vec<Self> {
        shape
            .edges()
            .iter()
            .enumerate()
            .map(|(pos, edge)| Self::new(PolyId::new(idx, pos as i32), *edge))
            .collect()
    }

    pub fn is_vertical(&self, tol: &Tolerance) -> bool {
        self.edge.chord().is_vertical(tol)
    }

    pub fn is_horizontal(&self, tol: &Tolerance) -> bool {
        self.edge.chord().is_horizontal(tol)
    }
}

/// Movable panel inside a frame opening
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sash {
    pub id: Uuid,
    pub polygon: PolyShape,
    /// Direction the sash slides open; `None` for fixed or hinged sashes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide: Option<Direction>,
    /// Keyed by sash edge: `pos == -1` for bars along the edge, `pos >= 0`
    /// for bars T-jointed onto it
    #[serde(default)]
    pub docks: DockManager,
}

impl Sash {
    pub fn new(polygon: impl Into<PolyShape>) -> Self {
        Self {
            id: Uuid::new_v4(),
            polygon: polygon.into(),
            slide: None,
            docks: DockManager::new(),
        }
    }

    pub fn sliding(mut self, direction: Direction) -> Self {
        self.slide = Some(direction);
        self
    }

    /// Move the outline and its docking points together
    pub fn translate(&mut self, offset: DVec2) {
        self.polygon = self.polygon.translate(offset);
        self.docks.translate(offset);
    }
}
