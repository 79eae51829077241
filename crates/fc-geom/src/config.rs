//! Numeric tolerance configuration
//!
//! Every classification the kernel makes on floating point input
//! ("are these parallel", "is this a tangent", "are these collinear")
//! goes through one of these thresholds instead of an inline constant.

use serde::{Deserialize, Serialize};

/// Tolerances used for geometric classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tolerance {
    /// Distance under which two points coincide, or a point lies on a curve
    pub linear: f64,
    /// |sin θ| under which two directions count as parallel
    pub parallel: f64,
    /// Normalized triangle area under which three points count as collinear
    pub collinear: f64,
    /// Gap under which two circles (or a line and a circle) touch tangentially
    pub tangent: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: 1e-6,
            parallel: 1e-9,
            collinear: 1e-9,
            tangent: 1e-6,
        }
    }
}

impl Tolerance {
    /// Tight tolerances for synthetic input (unit tests, generated shapes)
    pub fn strict() -> Self {
        Self {
            linear: 1e-9,
            parallel: 1e-12,
            collinear: 1e-12,
            tangent: 1e-9,
        }
    }

    /// Loose tolerances for user-drawn input snapped to a millimetre grid
    pub fn coarse() -> Self {
        Self {
            linear: 1e-3,
            parallel: 1e-6,
            collinear: 1e-6,
            tangent: 1e-3,
        }
    }

    /// Set the point coincidence distance
    pub fn with_linear(mut self, linear: f64) -> Self {
        self.linear = linear.abs();
        self
    }

    /// Set the parallel threshold
    pub fn with_parallel(mut self, parallel: f64) -> Self {
        self.parallel = parallel.abs();
        self
    }

    /// Set the collinear threshold
    pub fn with_collinear(mut self, collinear: f64) -> Self {
        self.collinear = collinear.abs();
        self
    }

    /// Set the tangency gap
    pub fn with_tangent(mut self, tangent: f64) -> Self {
        self.tangent = tangent.abs();
        self
    }

    /// Whether two scalars are equal within the linear tolerance
    pub fn approx_eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.linear
    }
}
