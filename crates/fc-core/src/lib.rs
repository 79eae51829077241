//! Frame Configurator Core Model
//!
//! This crate contains the frame model built on `fc-geom` shapes:
//! - PolyId / DockData: structural addresses and docking points
//! - DockManager: registry of docking points between polygons
//! - FrameRelationData: per-vertex frame/dock relationships
//! - SubFrame / SubFrameSettings: profiled outlines and their edit facade
//! - PushSlideCCBar: slide / push-slide / push-track bar classification

pub mod bar;
pub mod dock;
pub mod frame_relation;
pub mod poly_id;
pub mod push_slide;
pub mod sub_frame;

pub use bar::*;
pub use dock::*;
pub use frame_relation::*;
pub use poly_id::*;
pub use push_slide::*;
pub use sub_frame::*;
