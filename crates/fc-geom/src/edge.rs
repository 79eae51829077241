//! Geometry primitives
//!
//! Points are `glam::DVec2`. An [`Edge`] is either a straight [`Segment`] or
//! a circular [`Arc`]; closed edge loops make up every polygon shape.
//!
//! Coordinates are y-up. For a counter-clockwise loop the outward side of an
//! edge is to the right of its travel direction.

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::Tolerance;
use crate::point_serde;

/// A 2D point
pub type Point = DVec2;

/// Rotate `p` by `angle` radians counter-clockwise around `origin`
pub fn rotate_point(p: Point, angle: f64, origin: Point) -> Point {
    origin + DVec2::from_angle(angle).rotate(p - origin)
}

/// Scale `p` by `factor` away from `origin`
pub fn scale_point(p: Point, factor: f64, origin: Point) -> Point {
    origin + (p - origin) * factor
}

/// Normalize an angle into `[0, 2π)`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Straight edge between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(with = "point_serde")]
    pub start: Point,
    #[serde(with = "point_serde")]
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn middle(&self) -> Point {
        (self.start + self.end) * 0.5
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Unit travel direction (zero for a degenerate segment)
    pub fn direction(&self) -> DVec2 {
        (self.end - self.start).normalize_or_zero()
    }

    /// Unit normal on the right of the travel direction
    pub fn normal(&self) -> DVec2 {
        let d = self.direction();
        DVec2::new(d.y, -d.x)
    }

    pub fn reverse(&self) -> Self {
        Self::new(self.end, self.start)
    }

    pub fn translate(&self, offset: DVec2) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    pub fn scale(&self, factor: f64, origin: Point) -> Self {
        Self::new(
            scale_point(self.start, factor, origin),
            scale_point(self.end, factor, origin),
        )
    }

    pub fn rotate(&self, angle: f64, origin: Point) -> Self {
        Self::new(
            rotate_point(self.start, angle, origin),
            rotate_point(self.end, angle, origin),
        )
    }

    /// Horizontal within the linear tolerance (rise over the whole run)
    pub fn is_horizontal(&self, tol: &Tolerance) -> bool {
        self.length() > tol.linear && (self.end.y - self.start.y).abs() <= tol.linear
    }

    /// Vertical within the linear tolerance
    pub fn is_vertical(&self, tol: &Tolerance) -> bool {
        self.length() > tol.linear && (self.end.x - self.start.x).abs() <= tol.linear
    }

    /// Distance from `p` to the closest point of the segment
    pub fn distance_to(&self, p: Point) -> f64 {
        let d = self.end - self.start;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return p.distance(self.start);
        }
        let t = ((p - self.start).dot(d) / len_sq).clamp(0.0, 1.0);
        p.distance(self.start + d * t)
    }

    pub fn contains(&self, p: Point, tol: &Tolerance) -> bool {
        self.distance_to(p) <= tol.linear
    }
}

/// Circular arc travelled from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    #[serde(with = "point_serde")]
    pub center: Point,
    pub radius: f64,
    pub counter_clockwise: bool,
    #[serde(with = "point_serde")]
    pub start: Point,
    #[serde(with = "point_serde")]
    pub end: Point,
}

impl Arc {
    pub fn new(center: Point, radius: f64, counter_clockwise: bool, start: Point, end: Point) -> Self {
        Self {
            center,
            radius,
            counter_clockwise,
            start,
            end,
        }
    }

    /// Arc over the chord `start -> end` with a signed sagitta.
    ///
    /// Positive sagitta bulges to the right of the travel direction, which is
    /// outward for counter-clockwise loops. `None` for a zero chord or sagitta.
    pub fn from_chord(start: Point, end: Point, sagitta: f64) -> Option<Self> {
        let chord = end - start;
        let c = chord.length();
        let h = sagitta.abs();
        if c == 0.0 || h == 0.0 || !sagitta.is_finite() {
            return None;
        }

        let radius = (c * c / 4.0 + h * h) / (2.0 * h);
        let normal = DVec2::new(chord.y, -chord.x) / c;
        let apex = (start + end) * 0.5 + normal * sagitta;
        let center = apex - normal * sagitta.signum() * radius;
        Some(Self::new(center, radius, sagitta > 0.0, start, end))
    }

    /// Polar angle of `p` around the center
    pub fn angle_of(&self, p: Point) -> f64 {
        let v = p - self.center;
        v.y.atan2(v.x)
    }

    pub fn start_angle(&self) -> f64 {
        self.angle_of(self.start)
    }

    pub fn end_angle(&self) -> f64 {
        self.angle_of(self.end)
    }

    /// Angular distance from the start to `angle`, measured along the travel direction
    fn offset_from_start(&self, angle: f64) -> f64 {
        let delta = if self.counter_clockwise {
            angle - self.start_angle()
        } else {
            self.start_angle() - angle
        };
        normalize_angle(delta)
    }

    /// Swept angle in `(0, 2π]`; coincident endpoints mean a full circle
    pub fn sweep(&self) -> f64 {
        let sweep = self.offset_from_start(self.end_angle());
        if sweep <= f64::EPSILON { TAU } else { sweep }
    }

    pub fn length(&self) -> f64 {
        self.radius * self.sweep()
    }

    /// Point on the circle at polar `angle`
    pub fn point_at_angle(&self, angle: f64) -> Point {
        self.center + DVec2::from_angle(angle) * self.radius
    }

    /// Point halfway along the arc
    pub fn middle(&self) -> Point {
        let half = self.sweep() * 0.5;
        let angle = if self.counter_clockwise {
            self.start_angle() + half
        } else {
            self.start_angle() - half
        };
        self.point_at_angle(angle)
    }

    pub fn chord(&self) -> Segment {
        Segment::new(self.start, self.end)
    }

    /// Sagitta: distance from the chord midpoint to the arc midpoint
    pub fn chord_height(&self) -> f64 {
        self.middle().distance(self.chord().middle())
    }

    /// Signed sagitta, positive when the arc bulges to the right of its chord
    pub fn bulge(&self) -> f64 {
        if self.counter_clockwise {
            self.chord_height()
        } else {
            -self.chord_height()
        }
    }

    /// Whether `p` lies on the circle within the arc's angular span
    pub fn contains(&self, p: Point, tol: &Tolerance) -> bool {
        if (p.distance(self.center) - self.radius).abs() > tol.linear {
            return false;
        }
        if p.distance(self.start) <= tol.linear || p.distance(self.end) <= tol.linear {
            return true;
        }
        self.offset_from_start(self.angle_of(p)) <= self.sweep()
    }

    /// Unit travel direction at the start point
    pub fn tangent_at_start(&self) -> DVec2 {
        self.tangent_at(self.start)
    }

    /// Unit travel direction at the end point
    pub fn tangent_at_end(&self) -> DVec2 {
        self.tangent_at(self.end)
    }

    fn tangent_at(&self, p: Point) -> DVec2 {
        let radial = (p - self.center).normalize_or_zero();
        if self.counter_clockwise {
            radial.perp()
        } else {
            -radial.perp()
        }
    }

    pub fn reverse(&self) -> Self {
        Self::new(self.center, self.radius, !self.counter_clockwise, self.end, self.start)
    }

    pub fn translate(&self, offset: DVec2) -> Self {
        Self::new(
            self.center + offset,
            self.radius,
            self.counter_clockwise,
            self.start + offset,
            self.end + offset,
        )
    }

    pub fn scale(&self, factor: f64, origin: Point) -> Self {
        Self::new(
            scale_point(self.center, factor, origin),
            self.radius * factor.abs(),
            self.counter_clockwise,
            scale_point(self.start, factor, origin),
            scale_point(self.end, factor, origin),
        )
    }

    pub fn rotate(&self, angle: f64, origin: Point) -> Self {
        Self::new(
            rotate_point(self.center, angle, origin),
            self.radius,
            self.counter_clockwise,
            rotate_point(self.start, angle, origin),
            rotate_point(self.end, angle, origin),
        )
    }
}

/// Polygon edge: a segment or an arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Edge {
    Segment(Segment),
    Arc(Arc),
}

impl From<Segment> for Edge {
    fn from(segment: Segment) -> Self {
        Edge::Segment(segment)
    }
}

impl From<Arc> for Edge {
    fn from(arc: Arc) -> Self {
        Edge::Arc(arc)
    }
}

impl Edge {
    /// Shorthand for a segment edge
    pub fn segment(start: Point, end: Point) -> Self {
        Edge::Segment(Segment::new(start, end))
    }

    pub fn start(&self) -> Point {
        match self {
            Edge::Segment(s) => s.start,
            Edge::Arc(a) => a.start,
        }
    }

    pub fn end(&self) -> Point {
        match self {
            Edge::Segment(s) => s.end,
            Edge::Arc(a) => a.end,
        }
    }

    pub fn middle(&self) -> Point {
        match self {
            Edge::Segment(s) => s.middle(),
            Edge::Arc(a) => a.middle(),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Edge::Segment(s) => s.length(),
            Edge::Arc(a) => a.length(),
        }
    }

    /// Straight line between the endpoints
    pub fn chord(&self) -> Segment {
        Segment::new(self.start(), self.end())
    }

    /// Signed sagitta (zero for segments)
    pub fn bulge(&self) -> f64 {
        match self {
            Edge::Segment(_) => 0.0,
            Edge::Arc(a) => a.bulge(),
        }
    }

    pub fn is_arc(&self) -> bool {
        matches!(self, Edge::Arc(_))
    }

    pub fn as_arc(&self) -> Option<&Arc> {
        match self {
            Edge::Arc(a) => Some(a),
            Edge::Segment(_) => None,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Edge::Segment(s) => Some(s),
            Edge::Arc(_) => None,
        }
    }

    pub fn tangent_at_start(&self) -> DVec2 {
        match self {
            Edge::Segment(s) => s.direction(),
            Edge::Arc(a) => a.tangent_at_start(),
        }
    }

    pub fn tangent_at_end(&self) -> DVec2 {
        match self {
            Edge::Segment(s) => s.direction(),
            Edge::Arc(a) => a.tangent_at_end(),
        }
    }

    pub fn contains(&self, p: Point, tol: &Tolerance) -> bool {
        match self {
            Edge::Segment(s) => s.contains(p, tol),
            Edge::Arc(a) => a.contains(p, tol),
        }
    }

    pub fn reverse(&self) -> Self {
        match self {
            Edge::Segment(s) => Edge::Segment(s.reverse()),
            Edge::Arc(a) => Edge::Arc(a.reverse()),
        }
    }

    pub fn translate(&self, offset: DVec2) -> Self {
        match self {
            Edge::Segment(s) => Edge::Segment(s.translate(offset)),
            Edge::Arc(a) => Edge::Arc(a.translate(offset)),
        }
    }

    pub fn scale(&self, factor: f64, origin: Point) -> Self {
        match self {
            Edge::Segment(s) => Edge::Segment(s.scale(factor, origin)),
            Edge::Arc(a) => Edge::Arc(a.scale(factor, origin)),
        }
    }

    pub fn rotate(&self, angle: f64, origin: Point) -> Self {
        match self {
            Edge::Segment(s) => Edge::Segment(s.rotate(angle, origin)),
            Edge::Arc(a) => Edge::Arc(a.rotate(angle, origin)),
        }
    }
}
