//! Rectangle with one concave side
//!
//! The hollow side faces `direction`. Edges run counter-clockwise from the
//! bottom: 0 faces down, 1 right, 2 up, 3 left. Every edit recomputes the
//! whole edge list from `cpt`, `direction`, `width`, `height` and the hollow
//! depth, so the hollow edge always matches the direction.

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dim::{DimInfo, ExtraDimType};
use super::polygon::WinPolygon;
use super::ShapeResult;
use crate::arc_utils::ArcUtils;
use crate::config::Tolerance;
use crate::direction::Direction;
use crate::edge::{Edge, Point, rotate_point};
use crate::point_serde;

const SIDES: [Direction; 4] = [
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
];

fn side_index(direction: Direction) -> usize {
    match direction {
        Direction::Down => 0,
        Direction::Right => 1,
        Direction::Up => 2,
        Direction::Left => 3,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HollowSidePoly {
    #[serde(with = "point_serde")]
    pub cpt: Point,
    pub direction: Direction,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub base: WinPolygon,
}

impl HollowSidePoly {
    pub const EDGE_COUNT: usize = 4;

    /// Default hollow depth: a fifth of the shorter side
    pub fn create(cpt: Point, direction: Direction, width: f64, height: f64) -> Self {
        Self::with_depth(cpt, direction, width, height, 0.2 * width.min(height))
    }

    pub fn with_depth(cpt: Point, direction: Direction, width: f64, height: f64, depth: f64) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        let vertices = [
            cpt + DVec2::new(-hw, -hh),
            cpt + DVec2::new(hw, -hh),
            cpt + DVec2::new(hw, hh),
            cpt + DVec2::new(-hw, hh),
        ];
        let mut base = WinPolygon::from_vertices(&vertices);

        let hollow = side_index(direction);
        if let Some(arc) = ArcUtils::new().arc_from_chord(
            vertices[hollow],
            vertices[(hollow + 1) % 4],
            -depth.abs(),
        ) {
            base.edges[hollow] = Edge::Arc(arc);
        }

        Self {
            cpt,
            direction,
            width,
            height,
            base,
        }
    }

    /// Same parameters with a new geometry, keeping the edit tool
    fn rebuilt(&self, cpt: Point, direction: Direction, width: f64, height: f64, depth: f64) -> Self {
        let mut next = Self::with_depth(cpt, direction, width, height, depth);
        next.base.edit_tool = self.base.edit_tool.clone();
        next
    }

    pub fn edges(&self) -> &[Edge] {
        &self.base.edges
    }

    pub fn hollow_index(&self) -> usize {
        side_index(self.direction)
    }

    /// Sagitta of the hollow edge (zero when it is straight)
    pub fn depth(&self) -> f64 {
        self.base
            .edges
            .get(self.hollow_index())
            .map(|e| e.bulge().abs())
            .unwrap_or(0.0)
    }

    /// Length of side `index`
    fn side_length(&self, index: usize) -> f64 {
        if index % 2 == 0 { self.width } else { self.height }
    }

    // ============== Copy-on-edit ==============

    pub fn translate(&self, offset: DVec2) -> Self {
        self.rebuilt(self.cpt + offset, self.direction, self.width, self.height, self.depth())
    }

    /// Scale about `cpt`; a negative factor turns the hollow side around
    pub fn scale(&self, factor: f64) -> Self {
        let direction = if factor < 0.0 {
            self.direction.opposite()
        } else {
            self.direction
        };
        let f = factor.abs();
        self.rebuilt(self.cpt, direction, self.width * f, self.height * f, self.depth() * f)
    }

    /// Rotate about `cpt`, snapped to whole quarter turns
    pub fn rotate(&self, angle: f64) -> Self {
        self.rotate_about(angle, self.cpt)
    }

    pub fn rotate_about(&self, angle: f64, origin: Point) -> Self {
        let quarters = (angle / FRAC_PI_2).round();
        let snapped = quarters * FRAC_PI_2;
        if (snapped - angle).abs() > f64::EPSILON {
            debug!("HollowSide rotation {} snapped to {}", angle, snapped);
        }
        let quarters = quarters as i32;
        let (width, height) = if quarters.rem_euclid(2) == 1 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        self.rebuilt(
            rotate_point(self.cpt, snapped, origin),
            self.direction.rotated_quarters(quarters),
            width,
            height,
            self.depth(),
        )
    }

    /// Push side `index` along its outward normal; the opposite side stays put
    pub fn drag_edge(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        self.base.check_index(index)?;
        let normal = SIDES[index].unit_vector();
        let amount = offset.dot(normal);
        let (mut width, mut height) = (self.width, self.height);
        if index % 2 == 0 {
            height += amount;
        } else {
            width += amount;
        }
        if width <= 0.0 || height <= 0.0 {
            debug!("HollowSide drag on side {} would collapse the shape", index);
            return Ok(self.clone());
        }
        let cpt = self.cpt + normal * (amount * 0.5);
        Ok(self.rebuilt(cpt, self.direction, width, height, self.depth()))
    }

    /// Move corner `index`; both sides meeting there follow
    pub fn drag_vertex(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        self.base.check_index(index)?;
        self.drag_edge(index, offset)?
            .drag_edge((index + 3) % 4, offset)
    }

    /// Change the hollow depth; other sides cannot be curved
    pub fn drag_arc(&self, index: usize, sagitta: f64) -> ShapeResult<Self> {
        self.base.check_index(index)?;
        if index != self.hollow_index() {
            debug!("Arc drag on non-hollow side {} ignored", index);
            return Ok(self.clone());
        }
        Ok(self.rebuilt(self.cpt, self.direction, self.width, self.height, sagitta.abs()))
    }

    /// Width edits keep the left side, height edits keep the bottom side
    pub fn edit_dim(&self, kind: ExtraDimType, index: usize, value: f64) -> ShapeResult<Self> {
        self.base.check_index(index)?;
        let tol = Tolerance::default();

        let kind = match kind {
            ExtraDimType::Arbitrary if index % 2 == 0 => ExtraDimType::Horizontal,
            ExtraDimType::Arbitrary => ExtraDimType::Vertical,
            other => other,
        };

        match kind {
            ExtraDimType::Horizontal | ExtraDimType::Vertical if value <= tol.linear => {
                debug!("HollowSide dimension {} ignored", value);
                Ok(self.clone())
            }
            ExtraDimType::Horizontal => {
                let cpt = self.cpt + DVec2::new((value - self.width) * 0.5, 0.0);
                Ok(self.rebuilt(cpt, self.direction, value, self.height, self.depth()))
            }
            ExtraDimType::Vertical => {
                let cpt = self.cpt + DVec2::new(0.0, (value - self.height) * 0.5);
                Ok(self.rebuilt(cpt, self.direction, self.width, value, self.depth()))
            }
            ExtraDimType::Radius => {
                let half = self.side_length(self.hollow_index()) * 0.5;
                if value < half {
                    debug!("Hollow radius {} shorter than half chord {}", value, half);
                    return Ok(self.clone());
                }
                let depth = value - (value * value - half * half).sqrt();
                Ok(self.rebuilt(self.cpt, self.direction, self.width, self.height, depth))
            }
            ExtraDimType::Angle | ExtraDimType::Arbitrary => {
                debug!("Dimension {:?} does not apply to HollowSide", kind);
                Ok(self.clone())
            }
        }
    }

    pub fn init_dim_info(&self) -> Vec<DimInfo> {
        let mut dims = vec![
            DimInfo::new(0, ExtraDimType::Horizontal, self.width),
            DimInfo::new(1, ExtraDimType::Vertical, self.height),
        ];
        let hollow = self.hollow_index();
        if let Some(arc) = self.base.edges.get(hollow).and_then(Edge::as_arc) {
            dims.push(DimInfo::new(hollow, ExtraDimType::Radius, arc.radius).hidden());
        }
        dims
    }
}
