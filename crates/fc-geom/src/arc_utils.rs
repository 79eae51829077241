//! Arc construction and edge intersection
//!
//! All routines are pure. Degenerate input (collinear points, parallel
//! segments, circles that never meet) yields `None`, never a panic or an
//! error. Classification thresholds come from the [`Tolerance`] the
//! [`ArcUtils`] instance was built with.

use std::cmp::Ordering;

use glam::DVec2;

use crate::config::Tolerance;
use crate::edge::{Arc, Edge, Point, Segment};

/// Arc construction and intersection routines bound to a tolerance
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcUtils {
    tol: Tolerance,
}

impl ArcUtils {
    /// Create with the default tolerance
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tolerance
    pub fn with_tolerance(mut self, tol: Tolerance) -> Self {
        self.tol = tol;
        self
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tol
    }

    /// Tolerance used to accept a computed intersection as lying on a curve.
    /// A tangent point may sit up to `tangent` away from the second curve.
    fn on_curve_tolerance(&self) -> Tolerance {
        self.tol.with_linear(self.tol.linear.max(self.tol.tangent))
    }

    // ============== Construction ==============

    /// Circle arc travelling from `start` through `through` to `end`.
    ///
    /// Returns `None` when the points are collinear or two of them coincide.
    pub fn create_arc_from_3_points(&self, start: Point, end: Point, through: Point) -> Option<Arc> {
        let b = end - start;
        let c = through - start;
        let (lb, lc) = (b.length(), c.length());
        if lb <= self.tol.linear || lc <= self.tol.linear || through.distance(end) <= self.tol.linear
        {
            return None;
        }

        let cross = b.perp_dot(c);
        if cross.abs() / (lb * lc) <= self.tol.collinear {
            return None;
        }

        // Circumcenter relative to `start`
        let d = 2.0 * cross;
        let (b2, c2) = (b.length_squared(), c.length_squared());
        let offset = DVec2::new(c.y * b2 - b.y * c2, b.x * c2 - c.x * b2) / d;
        let center = start + offset;

        let counter_clockwise = (through - start).perp_dot(end - through) > 0.0;
        Some(Arc::new(center, offset.length(), counter_clockwise, start, end))
    }

    /// Arc over the chord `start -> end` with a signed sagitta.
    ///
    /// Positive sagitta bulges to the right of the travel direction, which is
    /// outward for counter-clockwise loops. Returns `None` for a zero chord or
    /// a zero sagitta.
    pub fn arc_from_chord(&self, start: Point, end: Point, sagitta: f64) -> Option<Arc> {
        if start.distance(end) <= self.tol.linear || sagitta.abs() <= self.tol.linear {
            return None;
        }
        Arc::from_chord(start, end, sagitta)
    }

    /// Keep the chord of `arc` fixed and rebuild it for a new sagitta.
    ///
    /// The bulge side is kept unless `reverse_direction` is set.
    pub fn arc_with_same_chord(
        &self,
        arc: &Arc,
        new_chord_height: f64,
        reverse_direction: bool,
    ) -> Option<Arc> {
        let mut sign = if arc.counter_clockwise { 1.0 } else { -1.0 };
        if reverse_direction {
            sign = -sign;
        }
        self.arc_from_chord(arc.start, arc.end, sign * new_chord_height.abs())
    }

    /// Keep the chord and bulge side of `arc` and rebuild it for a new radius.
    ///
    /// Returns `None` when the radius is shorter than half the chord.
    pub fn arc_with_radius(&self, arc: &Arc, radius: f64) -> Option<Arc> {
        let half_chord = arc.chord().length() * 0.5;
        if radius + self.tol.linear < half_chord {
            return None;
        }
        let rise = (radius * radius - half_chord * half_chord).max(0.0).sqrt();
        let major = arc.chord_height() > arc.radius;
        let height = if major { radius + rise } else { radius - rise };
        let sign = if arc.counter_clockwise { 1.0 } else { -1.0 };
        self.arc_from_chord(arc.start, arc.end, sign * height)
    }

    /// Same kind of edge between new endpoints, keeping an arc's signed sagitta.
    ///
    /// An arc whose new chord collapses falls back to a segment.
    pub fn edge_with_endpoints(&self, edge: &Edge, start: Point, end: Point) -> Edge {
        match edge {
            Edge::Segment(_) => Edge::segment(start, end),
            Edge::Arc(arc) => self
                .arc_from_chord(start, end, arc.bulge())
                .map(Edge::Arc)
                .unwrap_or_else(|| Edge::segment(start, end)),
        }
    }

    // ============== Intersection ==============

    /// Intersection of two edges, dispatched on their variants.
    ///
    /// When several points qualify, the one nearest `reference` wins.
    pub fn edge_cross_pt(&self, edge1: &Edge, edge2: &Edge, reference: Option<Point>) -> Option<Point> {
        match (edge1, edge2) {
            (Edge::Segment(a), Edge::Segment(b)) => self.segment_segment_pt(a, b),
            (Edge::Segment(s), Edge::Arc(a)) | (Edge::Arc(a), Edge::Segment(s)) => {
                self.segment_arc_pt(s, a, reference, true)
            }
            (Edge::Arc(a), Edge::Arc(b)) => self.arc_arc_pt(a, b, reference),
        }
    }

    /// Unique intersection point of two bounded segments.
    ///
    /// Parallel, collinear and overlapping segments give `None`. The result
    /// does not depend on argument order.
    pub fn segment_segment_pt(&self, a: &Segment, b: &Segment) -> Option<Point> {
        let (a, b) = if segment_order(a, b) == Ordering::Greater {
            (b, a)
        } else {
            (a, b)
        };

        let d1 = a.end - a.start;
        let d2 = b.end - b.start;
        let (l1, l2) = (d1.length(), d2.length());
        if l1 <= self.tol.linear || l2 <= self.tol.linear {
            return None;
        }

        let denom = d1.perp_dot(d2);
        if denom.abs() <= self.tol.parallel * l1 * l2 {
            return None;
        }

        let w = b.start - a.start;
        let t = w.perp_dot(d2) / denom;
        let u = w.perp_dot(d1) / denom;
        let (eps_t, eps_u) = (self.tol.linear / l1, self.tol.linear / l2);
        if t < -eps_t || t > 1.0 + eps_t || u < -eps_u || u > 1.0 + eps_u {
            return None;
        }
        Some(a.start + d1 * t)
    }

    /// Intersection of two unbounded lines given as point + direction.
    pub fn line_line_pt(&self, p1: Point, d1: DVec2, p2: Point, d2: DVec2) -> Option<Point> {
        let (l1, l2) = (d1.length(), d2.length());
        if l1 <= f64::EPSILON || l2 <= f64::EPSILON {
            return None;
        }
        let denom = d1.perp_dot(d2);
        if denom.abs() <= self.tol.parallel * l1 * l2 {
            return None;
        }
        let t = (p2 - p1).perp_dot(d2) / denom;
        Some(p1 + d1 * t)
    }

    /// Intersection of a segment with an arc.
    ///
    /// Candidates are the line/circle roots lying on both the segment and the
    /// arc's span. With two candidates the one nearer `reference` is picked;
    /// without a reference, the segment's end point (or its start point when
    /// `use_end_point` is false) serves as reference.
    pub fn segment_arc_pt(
        &self,
        segment: &Segment,
        arc: &Arc,
        reference: Option<Point>,
        use_end_point: bool,
    ) -> Option<Point> {
        let on_tol = self.on_curve_tolerance();
        let candidates: Vec<Point> = self
            .line_circle_roots(segment.start, segment.end - segment.start, arc.center, arc.radius)
            .into_iter()
            .filter(|p| segment.contains(*p, &on_tol) && arc.contains(*p, &on_tol))
            .collect();

        let reference = reference.unwrap_or(if use_end_point {
            segment.end
        } else {
            segment.start
        });
        nearest(&candidates, reference)
    }

    /// Intersection of two arcs.
    ///
    /// Tangent circles give their single touching point; separate, nested and
    /// concentric circles give `None`. With two candidates the one nearer
    /// `reference` (default: the first arc's end point) is picked.
    pub fn arc_arc_pt(&self, arc1: &Arc, arc2: &Arc, reference: Option<Point>) -> Option<Point> {
        let on_tol = self.on_curve_tolerance();
        let candidates: Vec<Point> = self
            .circle_circle_roots(arc1.center, arc1.radius, arc2.center, arc2.radius)
            .into_iter()
            .filter(|p| arc1.contains(*p, &on_tol) && arc2.contains(*p, &on_tol))
            .collect();
        nearest(&candidates, reference.unwrap_or(arc1.end))
    }

    /// Intersection of an unbounded line with a full circle, nearest `reference`
    pub fn line_circle_pt(
        &self,
        origin: Point,
        dir: DVec2,
        center: Point,
        radius: f64,
        reference: Point,
    ) -> Option<Point> {
        nearest(&self.line_circle_roots(origin, dir, center, radius), reference)
    }

    /// Intersection of two full circles, nearest `reference`
    pub fn circle_circle_pt(
        &self,
        c1: Point,
        r1: f64,
        c2: Point,
        r2: f64,
        reference: Point,
    ) -> Option<Point> {
        nearest(&self.circle_circle_roots(c1, r1, c2, r2), reference)
    }

    /// Points where the line `origin + t * dir` meets a circle
    fn line_circle_roots(&self, origin: Point, dir: DVec2, center: Point, radius: f64) -> Vec<Point> {
        let len_sq = dir.length_squared();
        if len_sq <= self.tol.linear * self.tol.linear {
            return Vec::new();
        }
        let t0 = (center - origin).dot(dir) / len_sq;
        let foot = origin + dir * t0;
        let dist = foot.distance(center);

        if (dist - radius).abs() <= self.tol.tangent {
            // Snap the tangent point onto the circle
            let radial = (foot - center).normalize_or_zero();
            let touch = if radial == DVec2::ZERO {
                foot
            } else {
                center + radial * radius
            };
            return vec![touch];
        }
        if dist > radius {
            return Vec::new();
        }

        let half = (radius * radius - dist * dist).sqrt();
        let unit = dir / len_sq.sqrt();
        vec![foot - unit * half, foot + unit * half]
    }

    /// Points where two circles meet
    fn circle_circle_roots(&self, c1: Point, r1: f64, c2: Point, r2: f64) -> Vec<Point> {
        let d = c1.distance(c2);
        if d <= self.tol.linear {
            return Vec::new();
        }

        let outer_gap = d - (r1 + r2);
        let inner_gap = (r1 - r2).abs() - d;
        if outer_gap > self.tol.tangent || inner_gap > self.tol.tangent {
            return Vec::new();
        }

        let u = (c2 - c1) / d;
        if outer_gap.abs() <= self.tol.tangent {
            return vec![c1 + u * r1];
        }
        if inner_gap.abs() <= self.tol.tangent {
            let side = if r1 >= r2 { 1.0 } else { -1.0 };
            return vec![c1 + u * r1 * side];
        }

        let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
        let h = (r1 * r1 - a * a).max(0.0).sqrt();
        let base = c1 + u * a;
        let n = u.perp();
        vec![base + n * h, base - n * h]
    }
}

/// Lexicographic order on segment coordinates, used to make pairwise
/// routines independent of argument order.
fn segment_order(a: &Segment, b: &Segment) -> Ordering {
    let ka = [a.start.x, a.start.y, a.end.x, a.end.y];
    let kb = [b.start.x, b.start.y, b.end.x, b.end.y];
    ka.iter()
        .zip(kb.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn nearest(candidates: &[Point], reference: Point) -> Option<Point> {
    candidates
        .iter()
        .copied()
        .min_by(|p, q| p.distance_squared(reference).total_cmp(&q.distance_squared(reference)))
}
