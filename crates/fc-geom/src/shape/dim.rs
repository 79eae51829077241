//! Editable dimension metadata

use serde::{Deserialize, Serialize};

/// How an `edit_dim` call interprets its new value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtraDimType {
    /// Edge (chord) length in its own direction
    Arbitrary,
    /// Horizontal extent; only horizontally aligned vertices move
    Horizontal,
    /// Vertical extent; only vertically aligned vertices move
    Vertical,
    /// Edge angle from +x in degrees
    Angle,
    /// Arc radius
    Radius,
}

/// One user-editable dimension of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimInfo {
    /// Edge the dimension is attached to
    pub edge: usize,
    pub kind: ExtraDimType,
    pub value: f64,
    /// Editable but not drawn by default
    pub hidden: bool,
}

impl DimInfo {
    pub fn new(edge: usize, kind: ExtraDimType, value: f64) -> Self {
        Self {
            edge,
            kind,
            value,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}
