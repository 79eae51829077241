//! 2D Geometry Kernel for Window Frame Shapes
//!
//! This crate provides:
//! - Segment / arc edge primitives on `glam::DVec2` points
//! - Arc construction and segment/arc intersection with explicit tolerances
//! - Cardinal directions and direction-based edge lookup
//! - Parametric polygon shapes with copy-on-edit drag and dimension edits

pub mod arc_utils;
pub mod config;
pub mod direction;
pub mod edge;
pub mod point_serde;
pub mod shape;

// Re-exports for convenience
pub use arc_utils::ArcUtils;
pub use config::Tolerance;
pub use direction::{Direction, EdgeFinder};
pub use edge::{Arc, Edge, Point, Segment, normalize_angle, rotate_point, scale_point};
pub use shape::{
    DimInfo, ExtraDimType, HollowSidePoly, OnionPoly, PolyShape, ShapeError, ShapeResult,
    WinPolygon,
};
