//! Sub-frames and their settings facade
//!
//! A [`SubFrame`] is an outline polygon with a profile of constant width
//! running along its edges. [`SubFrameSettings`] is the only way the editor
//! changes a sub-frame's properties: every setter recomputes the bars,
//! notifies the view, redraws and records an undo checkpoint.

use fc_geom::{Arc, ArcUtils, Edge, Point, PolyShape, ShapeError, ShapeResult};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// How bars meet at corners
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointWay {
    /// 45° mitre at every corner
    #[default]
    Miter,
    /// Horizontal bars run through, vertical bars butt between them
    Horizontal,
    /// Vertical bars run through, horizontal bars butt between them
    Vertical,
}

/// Profile bar along one outline edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFrameBar {
    pub edge_index: usize,
    pub outer: Edge,
    pub inner: Edge,
    pub cut_length: f64,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubFrame {
    pub id: Uuid,
    pub polygon: PolyShape,
    pub joint_way: JointWay,
    pub profile_size: f64,
    /// Per-edge visibility of the profile
    pub hidden: Vec<bool>,
    /// Frames redrawn whenever this one changes
    #[serde(default)]
    pub related: Vec<Uuid>,
    #[serde(skip)]
    bars: Vec<SubFrameBar>,
}

impl SubFrame {
    pub fn new(polygon: impl Into<PolyShape>, profile_size: f64) -> Self {
        let polygon = polygon.into();
        let mut frame = Self {
            id: Uuid::new_v4(),
            hidden: vec![false; polygon.edges().len()],
            polygon,
            joint_way: JointWay::default(),
            profile_size,
            related: Vec::new(),
            bars: Vec::new(),
        };
        frame.update_poly();
        frame
    }

    /// Bars as of the last [`update_poly`](Self::update_poly)
    pub fn bars(&self) -> &[SubFrameBar] {
        &self.bars
    }

    pub fn to_json(&self) -> ShapeResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| ShapeError::Serialization(e.to_string()))
    }

    /// Load a stored sub-frame; bars are rebuilt rather than stored
    pub fn deserialize(value: serde_json::Value) -> ShapeResult<Self> {
        let mut frame: Self =
            serde_json::from_value(value).map_err(|e| ShapeError::Serialization(e.to_string()))?;
        frame.update_poly();
        Ok(frame)
    }

    /// Recompute every bar from the outline, profile size, hidden sides and
    /// joint way
    pub fn update_poly(&mut self) {
        let edges = self.polygon.edges();
        let n = edges.len();
        self.hidden.resize(n, false);
        if n == 0 {
            self.bars.clear();
            return;
        }

        let utils = ArcUtils::new();
        let tol = *utils.tolerance();
        let ccw = self.polygon.base().is_ccw();
        let width = |i: usize| if self.hidden[i] { 0.0 } else { self.profile_size };
        let offsets: Vec<Offset> = edges
            .iter()
            .enumerate()
            .map(|(i, e)| Offset::of(e, width(i), ccw))
            .collect();

        // Inner corner at the start of each edge
        let corners: Vec<Point> = (0..n)
            .map(|i| {
                let prev = &offsets[(i + n - 1) % n];
                let fallback = offsets[i].start;
                prev.meet(&offsets[i], &utils).unwrap_or(fallback)
            })
            .collect();

        let bars = edges
            .iter()
            .enumerate()
            .map(|(i, outer)| {
                let (a, b) = (corners[i], corners[(i + 1) % n]);
                let inner = match (outer, offsets[i].curve) {
                    (Edge::Arc(arc), Curve::Circle { center, radius }) if radius > tol.linear => {
                        Edge::Arc(Arc::new(center, radius, arc.counter_clockwise, a, b))
                    }
                    _ => Edge::segment(a, b),
                };

                let chord = outer.chord();
                let butts = match self.joint_way {
                    JointWay::Miter => false,
                    JointWay::Horizontal => chord.is_vertical(&tol),
                    JointWay::Vertical => chord.is_horizontal(&tol),
                };
                let hidden = self.hidden[i];
                let cut_length = if hidden {
                    0.0
                } else if butts {
                    inner.length()
                } else {
                    outer.length()
                };

                SubFrameBar {
                    edge_index: i,
                    outer: *outer,
                    inner,
                    cut_length,
                    hidden,
                }
            })
            .collect();
        self.bars = bars;
    }
}

/// Unbounded carrier of an edge
#[derive(Debug, Clone, Copy)]
enum Curve {
    Line { origin: Point, dir: DVec2 },
    Circle { center: Point, radius: f64 },
}

/// An edge moved inward by the profile width
#[derive(Debug, Clone, Copy)]
struct Offset {
    curve: Curve,
    start: Point,
}

impl Offset {
    fn of(edge: &Edge, width: f64, ccw: bool) -> Self {
        let t = edge.tangent_at_start();
        let inward = if ccw { t.perp() } else { -t.perp() };
        let start = edge.start() + inward * width;
        let curve = match edge {
            Edge::Segment(_) => Curve::Line { origin: start, dir: t },
            Edge::Arc(arc) => {
                // Inward points at the center when the arc turns with the loop
                let sign = if arc.counter_clockwise == ccw { -1.0 } else { 1.0 };
                Curve::Circle {
                    center: arc.center,
                    radius: arc.radius + sign * width,
                }
            }
        };
        Self { curve, start }
    }

    /// Where this offset meets the `next` one, nearest the start of `next`
    fn meet(&self, next: &Offset, utils: &ArcUtils) -> Option<Point> {
        let reference = next.start;
        match (self.curve, next.curve) {
            (Curve::Line { origin: p1, dir: d1 }, Curve::Line { origin: p2, dir: d2 }) => {
                utils.line_line_pt(p1, d1, p2, d2)
            }
            (Curve::Line { origin, dir }, Curve::Circle { center, radius })
            | (Curve::Circle { center, radius }, Curve::Line { origin, dir }) => {
                utils.line_circle_pt(origin, dir, center, radius, reference)
            }
            (Curve::Circle { center: c1, radius: r1 }, Curve::Circle { center: c2, radius: r2 }) => {
                utils.circle_circle_pt(c1, r1, c2, r2, reference)
            }
        }
    }
}

/// Redraw surface of the owning view
pub trait RedrawSurface {
    /// Redraw the sub-frame itself
    fn draw(&mut self, frame: &SubFrame);
    /// Redraw a frame that depends on the edited one
    fn draw_related(&mut self, id: Uuid);
    /// Flush the active layer
    fn batch_draw(&mut self);
}

/// Undo manager
pub trait UndoCheckpoint {
    fn check_point(&mut self);
}

/// Frame manager notification after geometry-affecting edits
pub trait RecreateHook {
    fn recreated(&mut self, frame: &SubFrame);
}

/// Mutation facade over a [`SubFrame`]
pub struct SubFrameSettings<'a, V>
where
    V: RedrawSurface + UndoCheckpoint + RecreateHook,
{
    frame: &'a mut SubFrame,
    view: &'a mut V,
    batching: bool,
    dirty: bool,
}

impl<'a, V> SubFrameSettings<'a, V>
where
    V: RedrawSurface + UndoCheckpoint + RecreateHook,
{
    pub fn new(frame: &'a mut SubFrame, view: &'a mut V) -> Self {
        Self {
            frame,
            view,
            batching: false,
            dirty: false,
        }
    }

    pub fn frame(&self) -> &SubFrame {
        self.frame
    }

    pub fn joint_way(&self) -> JointWay {
        self.frame.joint_way
    }

    pub fn profile_size(&self) -> f64 {
        self.frame.profile_size
    }

    pub fn hidden(&self, index: usize) -> Option<bool> {
        self.frame.hidden.get(index).copied()
    }

    /// Returns whether anything changed
    pub fn set_joint_way(&mut self, joint_way: JointWay) -> bool {
        if self.frame.joint_way == joint_way {
            return false;
        }
        self.frame.joint_way = joint_way;
        self.commit();
        true
    }

    /// Returns whether anything changed; non-positive sizes are ignored
    pub fn set_profile_size(&mut self, size: f64) -> bool {
        if !(size.is_finite() && size > 0.0) {
            debug!("Profile size {} ignored", size);
            return false;
        }
        if self.frame.profile_size == size {
            return false;
        }
        self.frame.profile_size = size;
        self.commit();
        true
    }

    /// Returns whether anything changed
    pub fn set_hidden(&mut self, index: usize, hidden: bool) -> ShapeResult<bool> {
        let len = self.frame.hidden.len();
        let Some(current) = self.frame.hidden.get_mut(index) else {
            return Err(ShapeError::IndexOutOfRange { index, len });
        };
        if *current == hidden {
            return Ok(false);
        }
        *current = hidden;
        self.commit();
        Ok(true)
    }

    /// Run several setters as one undoable command.
    ///
    /// Checkpoints inside `f` are deferred; one checkpoint is recorded at the
    /// end if any setter changed something.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        if self.batching {
            return f(self);
        }
        self.batching = true;
        self.dirty = false;
        let out = f(self);
        self.batching = false;
        if std::mem::take(&mut self.dirty) {
            self.view.check_point();
        }
        out
    }

    fn commit(&mut self) {
        self.frame.update_poly();
        self.view.recreated(self.frame);
        self.view.draw(self.frame);
        for id in &self.frame.related {
            self.view.draw_related(*id);
        }
        self.view.batch_draw();
        if self.batching {
            self.dirty = true;
        } else {
            self.view.check_point();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use fc_geom::WinPolygon;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Recreated,
        Draw,
        DrawRelated(Uuid),
        BatchDraw,
        CheckPoint,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Recorder {
        fn count(&self, event: &Event) -> usize {
            self.events.iter().filter(|e| *e == event).count()
        }
    }

    impl RedrawSurface for Recorder {
        fn draw(&mut self, _frame: &SubFrame) {
            self.events.push(Event::Draw);
        }
        fn draw_related(&mut self, id: Uuid) {
            self.events.push(Event::DrawRelated(id));
        }
        fn batch_draw(&mut self) {
            self.events.push(Event::BatchDraw);
        }
    }

    impl UndoCheckpoint for Recorder {
        fn check_point(&mut self) {
            self.events.push(Event::CheckPoint);
        }
    }

    impl RecreateHook for Recorder {
        fn recreated(&mut self, _frame: &SubFrame) {
            self.events.push(Event::Recreated);
        }
    }

    fn frame() -> SubFrame {
        SubFrame::new(
            WinPolygon::from_vertices(&[
                DVec2::new(0.0, 0.0),
                DVec2::new(100.0, 0.0),
                DVec2::new(100.0, 60.0),
                DVec2::new(0.0, 60.0),
            ]),
            5.0,
        )
    }

    #[test]
    fn mitred_bars_of_a_rectangle() {
        let frame = frame();
        let bars = frame.bars();
        assert_eq!(bars.len(), 4);
        assert_eq!(bars[0].inner.start(), DVec2::new(5.0, 5.0));
        assert_eq!(bars[0].inner.end(), DVec2::new(95.0, 5.0));
        assert_eq!(bars[2].inner.start(), DVec2::new(95.0, 55.0));
        assert_eq!(bars[0].cut_length, 100.0);
        assert_eq!(bars[1].cut_length, 60.0);
    }

    #[test]
    fn joint_way_changes_cut_lengths() {
        let mut frame = frame();
        frame.joint_way = JointWay::Horizontal;
        frame.update_poly();
        assert_abs_diff_eq!(frame.bars()[0].cut_length, 100.0);
        assert_abs_diff_eq!(frame.bars()[1].cut_length, 50.0);

        frame.joint_way = JointWay::Vertical;
        frame.update_poly();
        assert_abs_diff_eq!(frame.bars()[0].cut_length, 90.0);
        assert_abs_diff_eq!(frame.bars()[3].cut_length, 60.0);
    }

    #[test]
    fn hidden_side_has_no_width() {
        let mut frame = frame();
        frame.hidden[0] = true;
        frame.update_poly();
        assert_eq!(frame.bars()[1].inner.start(), DVec2::new(95.0, 0.0));
        assert!(frame.bars()[0].hidden);
        assert_eq!(frame.bars()[0].cut_length, 0.0);
    }

    #[test]
    fn arc_edges_get_concentric_inner_arcs() {
        let polygon = WinPolygon::from_vertices(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 0.0),
            DVec2::new(100.0, 60.0),
            DVec2::new(0.0, 60.0),
        ])
        .drag_arc(2, 20.0)
        .unwrap();
        let frame = SubFrame::new(polygon, 5.0);
        let outer = frame.bars()[2].outer.as_arc().copied().unwrap();
        let inner = frame.bars()[2].inner.as_arc().copied().unwrap();
        assert_abs_diff_eq!(inner.center.x, outer.center.x, epsilon = 1e-6);
        assert_abs_diff_eq!(inner.center.y, outer.center.y, epsilon = 1e-6);
        assert_abs_diff_eq!(inner.radius, outer.radius - 5.0, epsilon = 1e-6);
    }

    #[test]
    fn setters_follow_the_full_sequence() {
        let mut frame = frame();
        let related = Uuid::new_v4();
        frame.related.push(related);
        let mut view = Recorder::default();
        {
            let mut settings = SubFrameSettings::new(&mut frame, &mut view);
            assert!(settings.set_joint_way(JointWay::Vertical));
        }
        assert_eq!(
            view.events,
            vec![
                Event::Recreated,
                Event::Draw,
                Event::DrawRelated(related),
                Event::BatchDraw,
                Event::CheckPoint,
            ]
        );
        assert_abs_diff_eq!(frame.bars()[0].cut_length, 90.0);
    }

    #[test]
    fn unchanged_values_short_circuit() {
        let mut frame = frame();
        let mut view = Recorder::default();
        let mut settings = SubFrameSettings::new(&mut frame, &mut view);
        assert!(!settings.set_joint_way(JointWay::Miter));
        assert!(!settings.set_profile_size(5.0));
        assert!(!settings.set_profile_size(-1.0));
        assert_eq!(settings.set_hidden(0, false), Ok(false));
        drop(settings);
        assert!(view.events.is_empty());
    }

    #[test]
    fn every_setter_checkpoints() {
        let mut frame = frame();
        let mut view = Recorder::default();
        let mut settings = SubFrameSettings::new(&mut frame, &mut view);
        assert!(settings.set_profile_size(8.0));
        assert_eq!(settings.set_hidden(3, true), Ok(true));
        assert_eq!(
            settings.set_hidden(4, true),
            Err(ShapeError::IndexOutOfRange { index: 4, len: 4 })
        );
        drop(settings);
        assert_eq!(view.count(&Event::CheckPoint), 2);
        assert_eq!(view.count(&Event::BatchDraw), 2);
        assert_eq!(frame.bars()[0].inner.start(), DVec2::new(0.0, 8.0));
    }

    #[test]
    fn batch_records_one_checkpoint() {
        let mut frame = frame();
        let mut view = Recorder::default();
        let mut settings = SubFrameSettings::new(&mut frame, &mut view);
        let changed = settings.batch(|s| {
            let a = s.set_joint_way(JointWay::Horizontal);
            let b = s.set_profile_size(10.0);
            let c = s.batch(|inner| inner.set_hidden(1, true));
            a && b && c == Ok(true)
        });
        assert!(changed);
        let nothing = settings.batch(|s| s.set_profile_size(10.0));
        assert!(!nothing);
        drop(settings);
        assert_eq!(view.count(&Event::CheckPoint), 1);
        assert_eq!(view.count(&Event::Draw), 3);
        assert_eq!(view.events.last(), Some(&Event::CheckPoint));
    }

    #[test]
    fn json_rebuilds_bars() {
        let mut frame = frame();
        frame.hidden[2] = true;
        frame.update_poly();
        let json = frame.to_json().unwrap();
        assert!(json.get("bars").is_none());
        assert_eq!(json["jointWay"], "Miter");

        let back = SubFrame::deserialize(json).unwrap();
        assert_eq!(back, frame);
        assert_eq!(back.bars()[2].cut_length, 0.0);
        assert!(SubFrame::deserialize(serde_json::json!({"id": 3})).is_err());
    }
}
