//! Onion dome: a rectangle body under a bulb and a pointed apex
//!
//! Seven vertices, counter-clockwise from the bottom left:
//!
//! ```text
//!            v4
//!          /    \        e3, e4: concave neck
//!        v5      v3
//!       (          )     e5, e2: bulb arcs
//!       v6   cpt   v2
//!       |          |     e6, e1: sides
//!       v0 ------- v1    e0: bottom
//! ```
//!
//! The shape is mirror symmetric about the axis through `cpt`
//! perpendicular to the bottom edge. Any one-sided edit is applied to the
//! side it touches and then copied onto the other half.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dim::{DimInfo, ExtraDimType};
use super::polygon::{WinPolygon, mirror_point};
use super::ShapeResult;
use crate::arc_utils::ArcUtils;
use crate::config::Tolerance;
use crate::edge::{Edge, Point};
use crate::point_serde;

const VERTEX_PAIRS: [(usize, usize); 3] = [(1, 0), (2, 6), (3, 5)];
const EDGE_PAIRS: [(usize, usize); 3] = [(1, 6), (2, 5), (3, 4)];
const APEX: usize = 4;

/// Which half drives a symmetric rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Right,
    Left,
}

impl Side {
    fn of_edge(index: usize) -> Self {
        if (4..=6).contains(&index) {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn of_vertex(index: usize) -> Self {
        if index == 0 || index >= 5 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnionPoly {
    #[serde(with = "point_serde")]
    pub cpt: Point,
    /// Half the body width
    pub radius: f64,
    #[serde(flatten)]
    pub base: WinPolygon,
}

impl OnionPoly {
    pub const EDGE_COUNT: usize = 7;

    /// Onion with default proportions: body as tall as `radius`, dome 1.6 times it
    pub fn create(cpt: Point, radius: f64) -> Self {
        Self::create_with(cpt, radius, radius, radius * 1.6)
    }

    /// Onion whose shoulders sit on `cpt`, with the given body and dome heights
    pub fn create_with(cpt: Point, radius: f64, body_height: f64, dome_height: f64) -> Self {
        let local = [
            DVec2::new(-radius, -body_height),
            DVec2::new(radius, -body_height),
            DVec2::new(radius, 0.0),
            DVec2::new(0.35 * radius, 0.6 * dome_height),
            DVec2::new(0.0, dome_height),
            DVec2::new(-0.35 * radius, 0.6 * dome_height),
            DVec2::new(-radius, 0.0),
        ];
        let vertices: Vec<Point> = local.iter().map(|v| cpt + *v).collect();
        let mut base = WinPolygon::from_vertices(&vertices);

        let utils = ArcUtils::new();
        let mut curve = |index: usize, ratio: f64| {
            let (start, end) = (vertices[index], vertices[(index + 1) % 7]);
            if let Some(arc) = utils.arc_from_chord(start, end, ratio * start.distance(end)) {
                base.edges[index] = Edge::Arc(arc);
            }
        };
        curve(2, 0.2);
        curve(3, -0.1);
        curve(4, -0.1);
        curve(5, 0.2);

        Self { cpt, radius, base }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.base.edges
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.base.vertices()
    }

    /// Unit direction of the symmetry axis, from `cpt` towards the apex
    pub fn axis(&self) -> DVec2 {
        self.base
            .edges
            .first()
            .map(|e| e.chord().direction().perp())
            .filter(|u| *u != DVec2::ZERO)
            .unwrap_or(DVec2::Y)
    }

    /// Height from the bottom edge to the apex
    pub fn height(&self) -> f64 {
        let v = self.vertices();
        if v.len() != Self::EDGE_COUNT {
            return 0.0;
        }
        (v[APEX] - v[0]).dot(self.axis())
    }

    pub fn width(&self) -> f64 {
        self.radius * 2.0
    }

    // ============== Copy-on-edit ==============

    pub fn translate(&self, offset: DVec2) -> Self {
        Self {
            cpt: self.cpt + offset,
            radius: self.radius,
            base: self.base.translate(offset),
        }
    }

    /// Scale about `cpt`
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            cpt: self.cpt,
            radius: self.radius * factor.abs(),
            base: self.base.scale(factor, self.cpt),
        }
    }

    /// Rotate about `cpt`
    pub fn rotate(&self, angle: f64) -> Self {
        Self {
            cpt: self.cpt,
            radius: self.radius,
            base: self.base.rotate(angle, self.cpt),
        }
    }

    pub fn drag_edge(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        let base = self.base.drag_edge(index, offset)?;
        Ok(self.symmetrized(base, Side::of_edge(index)))
    }

    pub fn drag_vertex(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        let base = self.base.drag_vertex(index, offset)?;
        Ok(self.symmetrized(base, Side::of_vertex(index)))
    }

    pub fn drag_arc(&self, index: usize, sagitta: f64) -> ShapeResult<Self> {
        let base = self.base.drag_arc(index, sagitta)?;
        Ok(self.symmetrized(base, Side::of_edge(index)))
    }

    /// Width and radius edits grow both sides evenly; height edits move the
    /// bottom edge along the axis. Lengths and angles on the bottom edge and
    /// the neck are solved so the apex stays on the axis.
    pub fn edit_dim(&self, kind: ExtraDimType, index: usize, value: f64) -> ShapeResult<Self> {
        self.base.check_index(index)?;

        match (kind, index) {
            (ExtraDimType::Horizontal, _) | (ExtraDimType::Arbitrary, 0) => {
                Ok(self.with_width(value))
            }
            (ExtraDimType::Radius, _) => Ok(self.with_width(value * 2.0)),
            (ExtraDimType::Vertical, _) => {
                if value <= Tolerance::default().linear {
                    debug!("Onion height {} ignored", value);
                    return Ok(self.clone());
                }
                let shift = -self.axis() * (value - self.height());
                Ok(self.moved_vertices(&[0, 1], shift))
            }
            (ExtraDimType::Angle, 0) => {
                debug!("Angle {} on the onion bottom cannot keep the onion symmetric", value);
                Ok(self.clone())
            }
            (ExtraDimType::Arbitrary, 3 | 4) => Ok(self.with_neck_length(index, value)),
            (ExtraDimType::Angle, 3 | 4) => Ok(self.with_neck_angle(index, value)),
            (ExtraDimType::Arbitrary | ExtraDimType::Angle, _) => {
                let base = self.base.edit_dim(kind, index, value)?;
                Ok(self.symmetrized(base, Side::of_edge(index)))
            }
        }
    }

    pub fn init_dim_info(&self) -> Vec<DimInfo> {
        vec![
            DimInfo::new(0, ExtraDimType::Horizontal, self.width()),
            DimInfo::new(1, ExtraDimType::Vertical, self.height()),
            DimInfo::new(2, ExtraDimType::Radius, self.radius).hidden(),
        ]
    }

    // ============== Symmetry ==============

    /// Unit normal of the axis pointing at the right half
    fn outward(&self) -> DVec2 {
        let u = self.axis();
        DVec2::new(u.y, -u.x)
    }

    fn with_width(&self, width: f64) -> Self {
        if width <= Tolerance::default().linear {
            debug!("Onion width {} ignored", width);
            return self.clone();
        }
        let shift = self.outward() * ((width - self.width()) * 0.5);
        self.moved_vertices(&[1, 2, 3], shift)
    }

    /// Neck vertex shared with the apex by neck edge `index`
    fn neck_vertex(&self, index: usize) -> Option<Point> {
        let v = self.vertices();
        if v.len() != Self::EDGE_COUNT {
            return None;
        }
        Some(if index == 3 { v[3] } else { v[5] })
    }

    /// Slide the apex along the axis until neck edge `index` has `length`
    fn with_neck_length(&self, index: usize, length: f64) -> Self {
        let Some(neck) = self.neck_vertex(index) else {
            return self.clone();
        };
        let rel = neck - self.cpt;
        let (along, off) = (rel.dot(self.axis()), rel.dot(self.outward()));
        if length <= off.abs() + Tolerance::default().linear {
            debug!("Neck length {} on edge {} cannot reach the axis", length, index);
            return self.clone();
        }
        let rise = (length * length - off * off).sqrt();
        self.with_apex(self.cpt + self.axis() * (along + rise), Side::of_edge(index))
    }

    /// Put the apex where neck edge `index` meets the axis at `degrees`
    fn with_neck_angle(&self, index: usize, degrees: f64) -> Self {
        let Some(neck) = self.neck_vertex(index) else {
            return self.clone();
        };
        let dir = DVec2::from_angle(degrees.to_radians());
        let off = (neck - self.cpt).dot(self.outward());
        let slope = dir.dot(self.outward());
        // edge 3 runs neck to apex, edge 4 apex to neck
        let reach = if index == 3 { -off / slope } else { off / slope };
        if !reach.is_finite() || reach <= Tolerance::default().linear {
            debug!("Neck angle {} on edge {} never meets the axis", degrees, index);
            return self.clone();
        }
        let apex = if index == 3 {
            neck + dir * reach
        } else {
            neck - dir * reach
        };
        self.with_apex(apex, Side::of_edge(index))
    }

    fn with_apex(&self, apex: Point, master: Side) -> Self {
        let mut vertices = self.vertices();
        if let Some(v) = vertices.get_mut(APEX) {
            *v = apex;
        }
        self.symmetrized(self.base.with_vertices(&vertices), master)
    }

    fn moved_vertices(&self, indices: &[usize], shift: DVec2) -> Self {
        let mut vertices = self.vertices();
        for &i in indices {
            if let Some(v) = vertices.get_mut(i) {
                *v += shift;
            }
        }
        self.symmetrized(self.base.with_vertices(&vertices), Side::Right)
    }

    /// Copy the `master` half of `edited` onto the other half, using this
    /// shape's axis.
    fn symmetrized(&self, edited: WinPolygon, master: Side) -> Self {
        if edited.len() != Self::EDGE_COUNT {
            debug!("Onion with {} edges left unsymmetrized", edited.len());
            return Self {
                cpt: self.cpt,
                radius: self.radius,
                base: edited,
            };
        }

        let axis = self.axis();
        let mut v = edited.vertices();
        for (right, left) in VERTEX_PAIRS {
            match master {
                Side::Right => v[left] = mirror_point(v[right], self.cpt, axis),
                Side::Left => v[right] = mirror_point(v[left], self.cpt, axis),
            }
        }
        v[APEX] = self.cpt + axis * (v[APEX] - self.cpt).dot(axis);

        let utils = ArcUtils::new();
        let mut edges = edited.edges.clone();
        edges[0] = utils.edge_with_endpoints(&edited.edges[0], v[0], v[1]);
        for (right, left) in EDGE_PAIRS {
            let source = match master {
                Side::Right => &edited.edges[right],
                Side::Left => &edited.edges[left],
            };
            edges[right] = utils.edge_with_endpoints(source, v[right], v[right + 1]);
            edges[left] = utils.edge_with_endpoints(source, v[left], v[(left + 1) % 7]);
        }

        let radius = (v[2] - self.cpt).dot(DVec2::new(axis.y, -axis.x)).abs();
        Self {
            cpt: self.cpt,
            radius,
            base: WinPolygon {
                edges,
                edit_tool: edited.edit_tool,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn onion() -> OnionPoly {
        OnionPoly::create(DVec2::new(100.0, 50.0), 10.0)
    }

    fn assert_symmetric(shape: &OnionPoly) {
        let v = shape.vertices();
        let axis = shape.axis();
        let across = DVec2::new(axis.y, -axis.x);
        for (r, l) in VERTEX_PAIRS {
            let (rv, lv) = (v[r] - shape.cpt, v[l] - shape.cpt);
            assert_abs_diff_eq!(rv.dot(across), -lv.dot(across), epsilon = 1e-9);
            assert_abs_diff_eq!(rv.dot(axis), lv.dot(axis), epsilon = 1e-9);
        }
        assert_abs_diff_eq!((v[APEX] - shape.cpt).dot(across), 0.0, epsilon = 1e-9);
        for (r, l) in EDGE_PAIRS {
            assert_abs_diff_eq!(shape.edges()[r].bulge(), shape.edges()[l].bulge(), epsilon = 1e-9);
        }
    }

    #[test]
    fn created_onion_is_closed_and_symmetric() {
        let shape = onion();
        assert_eq!(shape.edges().len(), OnionPoly::EDGE_COUNT);
        assert!(shape.base.is_ccw());
        for i in 0..7 {
            assert_eq!(shape.edges()[i].end(), shape.edges()[(i + 1) % 7].start());
        }
        assert!(shape.edges()[2].bulge() > 0.0);
        assert!(shape.edges()[3].bulge() < 0.0);
        assert_symmetric(&shape);
        assert_abs_diff_eq!(shape.height(), 26.0, epsilon = 1e-9);
    }

    #[test]
    fn right_side_drag_is_mirrored() {
        let wider = onion().drag_edge(1, DVec2::new(3.0, 7.0)).unwrap();
        assert_symmetric(&wider);
        assert_abs_diff_eq!(wider.radius, 13.0, epsilon = 1e-9);
        assert_abs_diff_eq!(wider.vertices()[6].x, 87.0, epsilon = 1e-9);
    }

    #[test]
    fn left_side_drag_is_mirrored() {
        let shape = onion().drag_vertex(5, DVec2::new(-2.0, 1.0)).unwrap();
        assert_symmetric(&shape);
        assert_abs_diff_eq!(shape.vertices()[3].x, 100.0 + 3.5 + 2.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_drag_is_mirrored() {
        let shape = onion().drag_arc(5, 4.0).unwrap();
        assert_symmetric(&shape);
        assert_abs_diff_eq!(shape.edges()[2].bulge(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn apex_stays_on_axis() {
        let shape = onion().drag_vertex(APEX, DVec2::new(5.0, 2.0)).unwrap();
        assert_symmetric(&shape);
        assert_abs_diff_eq!(shape.vertices()[APEX].x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shape.vertices()[APEX].y, 50.0 + 16.0 + 2.0, epsilon = 1e-9);
    }

    #[test]
    fn rotated_onion_keeps_its_own_axis() {
        let shape = onion().rotate(std::f64::consts::FRAC_PI_2);
        let axis = shape.axis();
        assert_abs_diff_eq!(axis.x, -1.0, epsilon = 1e-12);
        let dragged = shape.drag_edge(2, DVec2::new(0.0, 2.0)).unwrap();
        assert_symmetric(&dragged);
    }

    #[test]
    fn dimension_edits() {
        let shape = onion();
        let wide = shape.edit_dim(ExtraDimType::Horizontal, 0, 30.0).unwrap();
        assert_abs_diff_eq!(wide.width(), 30.0, epsilon = 1e-9);
        assert_symmetric(&wide);

        let round = shape.edit_dim(ExtraDimType::Radius, 2, 12.0).unwrap();
        assert_abs_diff_eq!(round.radius, 12.0, epsilon = 1e-9);

        let tall = shape.edit_dim(ExtraDimType::Vertical, 1, 40.0).unwrap();
        assert_abs_diff_eq!(tall.height(), 40.0, epsilon = 1e-9);
        assert_symmetric(&tall);

        assert_eq!(shape.edit_dim(ExtraDimType::Vertical, 1, 0.0).unwrap(), shape);
        assert!(shape.edit_dim(ExtraDimType::Vertical, 7, 40.0).is_err());
    }

    fn chord_degrees(edge: &Edge) -> f64 {
        let d = edge.end() - edge.start();
        d.y.atan2(d.x).to_degrees().rem_euclid(360.0)
    }

    #[test]
    fn length_edits_hit_every_edge() {
        let shape = onion();
        for index in 0..OnionPoly::EDGE_COUNT {
            let edited = shape.edit_dim(ExtraDimType::Arbitrary, index, 30.0).unwrap();
            assert_abs_diff_eq!(edited.edges()[index].chord().length(), 30.0, epsilon = 1e-9);
            assert_symmetric(&edited);
        }
        let bottom = shape.edit_dim(ExtraDimType::Arbitrary, 0, 30.0).unwrap();
        assert_abs_diff_eq!(bottom.radius, 15.0, epsilon = 1e-9);
        let neck = shape.edit_dim(ExtraDimType::Arbitrary, 4, 30.0).unwrap();
        assert_abs_diff_eq!(neck.edges()[3].chord().length(), 30.0, epsilon = 1e-9);

        // the neck cannot be shorter than its reach to the axis
        assert_eq!(shape.edit_dim(ExtraDimType::Arbitrary, 3, 2.0).unwrap(), shape);
    }

    #[test]
    fn angle_edits_keep_the_apex_on_axis() {
        let shape = onion();
        for (index, degrees) in [(1, 80.0), (2, 130.0), (3, 120.0), (4, 240.0), (5, 230.0), (6, 260.0)] {
            let edited = shape.edit_dim(ExtraDimType::Angle, index, degrees).unwrap();
            assert_abs_diff_eq!(chord_degrees(&edited.edges()[index]), degrees, epsilon = 1e-9);
            assert_symmetric(&edited);
        }
        assert_eq!(shape.edit_dim(ExtraDimType::Angle, 0, 10.0).unwrap(), shape);
        // a neck pointing away from the axis never reaches it
        assert_eq!(shape.edit_dim(ExtraDimType::Angle, 3, 60.0).unwrap(), shape);
    }

    #[test]
    fn scale_and_translate_carry_parameters() {
        let shape = onion().scale(2.0);
        assert_eq!(shape.radius, 20.0);
        assert_eq!(shape.cpt, DVec2::new(100.0, 50.0));
        let moved = shape.translate(DVec2::new(-100.0, 0.0));
        assert_eq!(moved.cpt, DVec2::new(0.0, 50.0));
        assert_symmetric(&moved);
    }

    #[test]
    fn dims_hide_radius() {
        let dims = onion().init_dim_info();
        assert_eq!(dims.len(), 3);
        assert!(dims[2].hidden);
        assert_eq!(dims[0].value, 20.0);
    }
}
