//! Parametric polygon shapes
//!
//! Every edit returns a new shape; the receiver is never modified.
//! Degenerate edits (collapsing dimensions, radius shorter than half a chord,
//! curving a side that cannot be curved) return an unchanged copy. Edge and
//! vertex indices out of range are reported as [`ShapeError::IndexOutOfRange`].

mod dim;
mod hollow_side;
mod onion;
mod polygon;

pub use dim::{DimInfo, ExtraDimType};
pub use hollow_side::HollowSidePoly;
pub use onion::OnionPoly;
pub use polygon::WinPolygon;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge::{Edge, Point};

/// Shape operation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Index {index} out of range for {len} edges")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type ShapeResult<T> = Result<T, ShapeError>;

/// Any editable window polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolyShape {
    Polygon(WinPolygon),
    Onion(OnionPoly),
    HollowSide(HollowSidePoly),
}

impl From<WinPolygon> for PolyShape {
    fn from(p: WinPolygon) -> Self {
        PolyShape::Polygon(p)
    }
}

impl From<OnionPoly> for PolyShape {
    fn from(p: OnionPoly) -> Self {
        PolyShape::Onion(p)
    }
}

impl From<HollowSidePoly> for PolyShape {
    fn from(p: HollowSidePoly) -> Self {
        PolyShape::HollowSide(p)
    }
}

impl PolyShape {
    /// Human-readable variant name
    pub fn name(&self) -> &'static str {
        match self {
            PolyShape::Polygon(_) => "Polygon",
            PolyShape::Onion(_) => "Onion",
            PolyShape::HollowSide(_) => "HollowSide",
        }
    }

    pub fn base(&self) -> &WinPolygon {
        match self {
            PolyShape::Polygon(p) => p,
            PolyShape::Onion(p) => &p.base,
            PolyShape::HollowSide(p) => &p.base,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.base().edges
    }

    pub fn edge(&self, index: usize) -> ShapeResult<&Edge> {
        self.base().edge(index)
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.base().vertices()
    }

    /// Point that scale and rotate act around
    pub fn reference_point(&self) -> Point {
        match self {
            PolyShape::Polygon(p) => p.center(),
            PolyShape::Onion(p) => p.cpt,
            PolyShape::HollowSide(p) => p.cpt,
        }
    }

    pub fn translate(&self, offset: DVec2) -> Self {
        match self {
            PolyShape::Polygon(p) => p.translate(offset).into(),
            PolyShape::Onion(p) => p.translate(offset).into(),
            PolyShape::HollowSide(p) => p.translate(offset).into(),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        match self {
            PolyShape::Polygon(p) => p.scale(factor, p.center()).into(),
            PolyShape::Onion(p) => p.scale(factor).into(),
            PolyShape::HollowSide(p) => p.scale(factor).into(),
        }
    }

    pub fn rotate(&self, angle: f64) -> Self {
        match self {
            PolyShape::Polygon(p) => p.rotate(angle, p.center()).into(),
            PolyShape::Onion(p) => p.rotate(angle).into(),
            PolyShape::HollowSide(p) => p.rotate(angle).into(),
        }
    }

    pub fn drag_edge(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        Ok(match self {
            PolyShape::Polygon(p) => p.drag_edge(index, offset)?.into(),
            PolyShape::Onion(p) => p.drag_edge(index, offset)?.into(),
            PolyShape::HollowSide(p) => p.drag_edge(index, offset)?.into(),
        })
    }

    pub fn drag_vertex(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        Ok(match self {
            PolyShape::Polygon(p) => p.drag_vertex(index, offset)?.into(),
            PolyShape::Onion(p) => p.drag_vertex(index, offset)?.into(),
            PolyShape::HollowSide(p) => p.drag_vertex(index, offset)?.into(),
        })
    }

    pub fn drag_arc(&self, index: usize, sagitta: f64) -> ShapeResult<Self> {
        Ok(match self {
            PolyShape::Polygon(p) => p.drag_arc(index, sagitta)?.into(),
            PolyShape::Onion(p) => p.drag_arc(index, sagitta)?.into(),
            PolyShape::HollowSide(p) => p.drag_arc(index, sagitta)?.into(),
        })
    }

    pub fn edit_dim(&self, kind: ExtraDimType, index: usize, value: f64) -> ShapeResult<Self> {
        Ok(match self {
            PolyShape::Polygon(p) => p.edit_dim(kind, index, value)?.into(),
            PolyShape::Onion(p) => p.edit_dim(kind, index, value)?.into(),
            PolyShape::HollowSide(p) => p.edit_dim(kind, index, value)?.into(),
        })
    }

    pub fn init_dim_info(&self) -> Vec<DimInfo> {
        match self {
            PolyShape::Polygon(p) => p.init_dim_info(),
            PolyShape::Onion(p) => p.init_dim_info(),
            PolyShape::HollowSide(p) => p.init_dim_info(),
        }
    }

    // ============== Persistence ==============

    pub fn to_json(&self) -> ShapeResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ShapeError::Serialization(e.to_string()))
    }

    /// Parse a stored shape, rejecting parametric shapes with the wrong edge count
    pub fn deserialize(value: serde_json::Value) -> ShapeResult<Self> {
        let shape: PolyShape =
            serde_json::from_value(value).map_err(|e| ShapeError::Serialization(e.to_string()))?;
        let expected = match &shape {
            PolyShape::Polygon(_) => None,
            PolyShape::Onion(_) => Some(OnionPoly::EDGE_COUNT),
            PolyShape::HollowSide(_) => Some(HollowSidePoly::EDGE_COUNT),
        };
        match expected {
            Some(expected) if shape.edges().len() != expected => {
                Err(ShapeError::Serialization(format!(
                    "{} shape needs {} edges, found {}",
                    shape.name(),
                    expected,
                    shape.edges().len()
                )))
            }
            _ => Ok(shape),
        }
    }
}
