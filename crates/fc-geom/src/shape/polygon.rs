//! Generic closed edge loop

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dim::{DimInfo, ExtraDimType};
use super::{ShapeError, ShapeResult};
use crate::arc_utils::ArcUtils;
use crate::config::Tolerance;
use crate::direction::signed_area;
use crate::edge::{Edge, Point};

/// Closed loop of edges; vertex `i` is the start point of edge `i`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinPolygon {
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_tool: Option<String>,
}

impl WinPolygon {
    pub fn new(edges: Vec<Edge>) -> Self {
        Self {
            edges,
            edit_tool: None,
        }
    }

    /// Segment loop through the given vertices
    pub fn from_vertices(vertices: &[Point]) -> Self {
        let n = vertices.len();
        let edges = (0..n)
            .map(|i| Edge::segment(vertices[i], vertices[(i + 1) % n]))
            .collect();
        Self::new(edges)
    }

    pub fn with_edit_tool(mut self, tool: impl Into<String>) -> Self {
        self.edit_tool = Some(tool.into());
        self
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edge at `index`, or `IndexOutOfRange`
    pub fn edge(&self, index: usize) -> ShapeResult<&Edge> {
        self.edges.get(index).ok_or(ShapeError::IndexOutOfRange {
            index,
            len: self.edges.len(),
        })
    }

    pub(crate) fn check_index(&self, index: usize) -> ShapeResult<()> {
        self.edge(index).map(|_| ())
    }

    pub fn vertices(&self) -> Vec<Point> {
        self.edges.iter().map(Edge::start).collect()
    }

    /// Axis-aligned bounds over vertices and arc midpoints
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self
            .edges
            .iter()
            .flat_map(|e| [e.start(), e.middle()]);
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Center of the bounds (origin for an empty loop)
    pub fn center(&self) -> Point {
        self.bounds()
            .map(|(lo, hi)| (lo + hi) * 0.5)
            .unwrap_or(DVec2::ZERO)
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.edges)
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Four straight, alternately horizontal and vertical sides
    pub fn is_rectangle(&self, tol: &Tolerance) -> bool {
        if self.edges.len() != 4 {
            return false;
        }
        let segments: Vec<_> = self.edges.iter().filter_map(Edge::as_segment).collect();
        if segments.len() != 4 {
            return false;
        }
        let first_horizontal = segments[0].is_horizontal(tol);
        segments.iter().enumerate().all(|(i, s)| {
            if (i % 2 == 0) == first_horizontal {
                s.is_horizontal(tol)
            } else {
                s.is_vertical(tol)
            }
        })
    }

    // ============== Copy-on-edit ==============

    pub fn translate(&self, offset: DVec2) -> Self {
        self.map_edges(|e| e.translate(offset))
    }

    pub fn scale(&self, factor: f64, origin: Point) -> Self {
        self.map_edges(|e| e.scale(factor, origin))
    }

    pub fn rotate(&self, angle: f64, origin: Point) -> Self {
        self.map_edges(|e| e.rotate(angle, origin))
    }

    fn map_edges(&self, f: impl Fn(&Edge) -> Edge) -> Self {
        Self {
            edges: self.edges.iter().map(f).collect(),
            edit_tool: self.edit_tool.clone(),
        }
    }

    /// Rebuild every edge between new vertex positions, keeping arc sagitta
    pub(crate) fn with_vertices(&self, vertices: &[Point]) -> Self {
        let utils = ArcUtils::new();
        let n = vertices.len().min(self.edges.len());
        let edges = (0..n)
            .map(|i| utils.edge_with_endpoints(&self.edges[i], vertices[i], vertices[(i + 1) % n]))
            .collect();
        Self {
            edges,
            edit_tool: self.edit_tool.clone(),
        }
    }

    /// Move vertex `index` to `point`; both adjacent edges follow
    pub fn set_vertex(&self, index: usize, point: Point) -> ShapeResult<Self> {
        self.check_index(index)?;
        let mut vertices = self.vertices();
        vertices[index] = point;
        Ok(self.with_vertices(&vertices))
    }

    pub fn drag_vertex(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        let v = self.edge(index)?.start();
        self.set_vertex(index, v + offset)
    }

    /// Move both endpoints of edge `index` by `offset`
    pub fn drag_edge(&self, index: usize, offset: DVec2) -> ShapeResult<Self> {
        self.check_index(index)?;
        let n = self.edges.len();
        let mut vertices = self.vertices();
        vertices[index] += offset;
        vertices[(index + 1) % n] += offset;
        Ok(self.with_vertices(&vertices))
    }

    /// Re-curve edge `index` to a signed sagitta over its chord.
    ///
    /// Positive bulges outward for a counter-clockwise loop; a zero sagitta
    /// straightens the edge.
    pub fn drag_arc(&self, index: usize, sagitta: f64) -> ShapeResult<Self> {
        let edge = *self.edge(index)?;
        let utils = ArcUtils::new();
        let replaced = if sagitta.abs() <= utils.tolerance().linear {
            Edge::segment(edge.start(), edge.end())
        } else {
            match utils.arc_from_chord(edge.start(), edge.end(), sagitta) {
                Some(arc) => Edge::Arc(arc),
                None => {
                    debug!("Arc drag on degenerate edge {} ignored", index);
                    return Ok(self.clone());
                }
            }
        };
        let mut next = self.clone();
        next.edges[index] = replaced;
        Ok(next)
    }

    /// Apply a new dimension value to edge `index`
    pub fn edit_dim(&self, kind: ExtraDimType, index: usize, value: f64) -> ShapeResult<Self> {
        let edge = *self.edge(index)?;
        let tol = Tolerance::default();
        let n = self.edges.len();
        let (start, end) = (edge.start(), edge.end());
        let end_index = (index + 1) % n;

        match kind {
            ExtraDimType::Arbitrary => {
                let dir = (end - start).normalize_or_zero();
                if value <= tol.linear || dir == DVec2::ZERO {
                    debug!("Length {} on edge {} ignored", value, index);
                    return Ok(self.clone());
                }
                self.set_vertex(end_index, start + dir * value)
            }
            ExtraDimType::Horizontal => {
                let dx = end.x - start.x;
                if value <= tol.linear || dx.abs() <= tol.linear {
                    debug!("Horizontal dimension {} on edge {} ignored", value, index);
                    return Ok(self.clone());
                }
                let delta = DVec2::new(dx.signum() * value - dx, 0.0);
                Ok(self.shift_aligned(end, delta, |a, b| tol.approx_eq(a.x, b.x)))
            }
            ExtraDimType::Vertical => {
                let dy = end.y - start.y;
                if value <= tol.linear || dy.abs() <= tol.linear {
                    debug!("Vertical dimension {} on edge {} ignored", value, index);
                    return Ok(self.clone());
                }
                let delta = DVec2::new(0.0, dy.signum() * value - dy);
                Ok(self.shift_aligned(end, delta, |a, b| tol.approx_eq(a.y, b.y)))
            }
            ExtraDimType::Angle => {
                let length = start.distance(end);
                let target = start + DVec2::from_angle(value.to_radians()) * length;
                self.set_vertex(end_index, target)
            }
            ExtraDimType::Radius => {
                let Some(arc) = edge.as_arc() else {
                    debug!("Radius edit on straight edge {} ignored", index);
                    return Ok(self.clone());
                };
                match ArcUtils::new().arc_with_radius(arc, value) {
                    Some(rebuilt) => {
                        let mut next = self.clone();
                        next.edges[index] = Edge::Arc(rebuilt);
                        Ok(next)
                    }
                    None => {
                        debug!("Radius {} shorter than half chord on edge {}", value, index);
                        Ok(self.clone())
                    }
                }
            }
        }
    }

    /// Shift every vertex aligned with `anchor` by `delta`
    fn shift_aligned(&self, anchor: Point, delta: DVec2, aligned: impl Fn(Point, Point) -> bool) -> Self {
        let vertices: Vec<Point> = self
            .vertices()
            .into_iter()
            .map(|v| if aligned(v, anchor) { v + delta } else { v })
            .collect();
        self.with_vertices(&vertices)
    }

    /// One dimension per edge: radius for arcs, extent for aligned segments,
    /// length otherwise
    pub fn init_dim_info(&self) -> Vec<DimInfo> {
        let tol = Tolerance::default();
        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| match edge {
                Edge::Arc(arc) => DimInfo::new(i, ExtraDimType::Radius, arc.radius),
                Edge::Segment(s) if s.is_horizontal(&tol) => {
                    DimInfo::new(i, ExtraDimType::Horizontal, (s.end.x - s.start.x).abs())
                }
                Edge::Segment(s) if s.is_vertical(&tol) => {
                    DimInfo::new(i, ExtraDimType::Vertical, (s.end.y - s.start.y).abs())
                }
                Edge::Segment(s) => DimInfo::new(i, ExtraDimType::Arbitrary, s.length()),
            })
            .collect()
    }
}

/// Reflect `p` across the line through `origin` with unit direction `axis`
pub(crate) fn mirror_point(p: Point, origin: Point, axis: DVec2) -> Point {
    let v = p - origin;
    origin + axis * (2.0 * v.dot(axis)) - v
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square() -> WinPolygon {
        WinPolygon::from_vertices(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ])
    }

    #[test]
    fn square_queries() {
        let sq = square();
        assert!(sq.is_ccw());
        assert!(sq.is_rectangle(&Tolerance::default()));
        assert_eq!(sq.center(), DVec2::new(5.0, 5.0));
        assert_abs_diff_eq!(sq.signed_area(), 100.0);
    }

    #[test]
    fn drag_vertex_moves_both_neighbours() {
        let sq = square();
        let moved = sq.drag_vertex(2, DVec2::new(2.0, 3.0)).unwrap();
        assert_eq!(moved.edges[1].end(), DVec2::new(12.0, 13.0));
        assert_eq!(moved.edges[2].start(), DVec2::new(12.0, 13.0));
        assert!(!moved.is_rectangle(&Tolerance::default()));
        // Copy-on-edit
        assert_eq!(sq, square());
    }

    #[test]
    fn drag_edge_keeps_loop_closed() {
        let moved = square().drag_edge(3, DVec2::new(-5.0, 0.0)).unwrap();
        let n = moved.len();
        for i in 0..n {
            assert_eq!(moved.edges[i].end(), moved.edges[(i + 1) % n].start());
        }
        assert_eq!(moved.vertices()[0], DVec2::new(-5.0, 0.0));
        assert!(moved.is_rectangle(&Tolerance::default()));
    }

    #[test]
    fn drag_arc_and_back() {
        let arched = square().drag_arc(2, 2.0).unwrap();
        let top = arched.edges[2].as_arc().unwrap();
        assert_abs_diff_eq!(top.middle().y, 12.0, epsilon = 1e-9);

        // Moving an arc's endpoint keeps its sagitta
        let wider = arched.drag_edge(1, DVec2::new(4.0, 0.0)).unwrap();
        assert_abs_diff_eq!(wider.edges[2].bulge(), 2.0, epsilon = 1e-9);

        let flat = arched.drag_arc(2, 0.0).unwrap();
        assert!(!flat.edges[2].is_arc());
    }

    #[test]
    fn edit_dim_horizontal_moves_aligned_vertices() {
        let wider = square().edit_dim(ExtraDimType::Horizontal, 0, 16.0).unwrap();
        let v = wider.vertices();
        assert_eq!(v[1], DVec2::new(16.0, 0.0));
        assert_eq!(v[2], DVec2::new(16.0, 10.0));
        assert_eq!(v[3], DVec2::new(0.0, 10.0));
    }

    #[test]
    fn edit_dim_vertical_and_angle() {
        let taller = square().edit_dim(ExtraDimType::Vertical, 1, 4.0).unwrap();
        assert_eq!(taller.vertices()[2], DVec2::new(10.0, 4.0));
        assert_eq!(taller.vertices()[3], DVec2::new(0.0, 4.0));

        let tilted = square().edit_dim(ExtraDimType::Angle, 0, 90.0).unwrap();
        let v = tilted.vertices()[1];
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn edit_dim_radius_requires_arc() {
        let sq = square();
        assert_eq!(sq.edit_dim(ExtraDimType::Radius, 0, 3.0).unwrap(), sq);

        let arched = sq.drag_arc(2, 2.0).unwrap();
        let round = arched.edit_dim(ExtraDimType::Radius, 2, 20.0).unwrap();
        assert_abs_diff_eq!(round.edges[2].as_arc().unwrap().radius, 20.0, epsilon = 1e-9);
        // Shorter than half the chord
        assert_eq!(arched.edit_dim(ExtraDimType::Radius, 2, 1.0).unwrap(), arched);
    }

    #[test]
    fn index_boundary_fails_loudly() {
        let sq = square();
        assert!(sq.drag_edge(3, DVec2::X).is_ok());
        assert_eq!(
            sq.drag_edge(4, DVec2::X),
            Err(ShapeError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert!(sq.drag_vertex(4, DVec2::X).is_err());
        assert!(sq.drag_arc(4, 1.0).is_err());
        assert!(sq.edit_dim(ExtraDimType::Arbitrary, 4, 1.0).is_err());
    }

    #[test]
    fn dim_info_per_edge() {
        let dims = square().drag_arc(2, 2.0).unwrap().init_dim_info();
        assert_eq!(dims.len(), 4);
        assert_eq!(dims[0].kind, ExtraDimType::Horizontal);
        assert_eq!(dims[1].kind, ExtraDimType::Vertical);
        assert_eq!(dims[2].kind, ExtraDimType::Radius);
        assert_eq!(dims[0].value, 10.0);
    }
}
