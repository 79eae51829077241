use fc_core::{
    Bar, DockData, DockManager, FrameRelationData, FrameRelations, PolyId, PushSlideCCBar, Sash,
    ShapeLookup,
};
use fc_geom::{Direction, Edge, PolyShape, WinPolygon};
use glam::DVec2;
use proptest::prelude::*;

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> WinPolygon {
    WinPolygon::from_vertices(&[
        DVec2::new(x0, y0),
        DVec2::new(x1, y0),
        DVec2::new(x1, y1),
        DVec2::new(x0, y1),
    ])
}

fn points(m: &DockManager) -> Vec<DVec2> {
    m.iter().flat_map(|(_, data)| data.iter().map(|d| d.pt)).collect()
}

fn manager_strategy() -> impl Strategy<Value = DockManager> {
    prop::collection::vec(
        (0i32..4, -1i32..3, -50.0f64..50.0, -50.0f64..50.0, 0i32..4, 0i32..4),
        0..12,
    )
    .prop_map(|entries| {
        let mut m = DockManager::new();
        for (idx, pos, x, y, tidx, tpos) in entries {
            m.push(PolyId::new(idx, pos), DockData::new(DVec2::new(x, y), PolyId::new(tidx, tpos)));
        }
        m
    })
}

proptest! {
    #[test]
    fn translations_compose(
        m in manager_strategy(),
        ax in -20.0f64..20.0, ay in -20.0f64..20.0,
        bx in -20.0f64..20.0, by in -20.0f64..20.0,
    ) {
        let (a, b) = (DVec2::new(ax, ay), DVec2::new(bx, by));
        let mut stepwise = m.clone();
        stepwise.translate(a);
        stepwise.translate(b);
        let mut once = m.clone();
        once.translate(a + b);

        let keys = |m: &DockManager| m.iter().map(|(k, d)| (k, d.len())).collect::<Vec<_>>();
        prop_assert_eq!(keys(&stepwise), keys(&m));
        for ((p, q), orig) in points(&stepwise).into_iter().zip(points(&once)).zip(points(&m)) {
            prop_assert!(p.distance(q) <= 1e-9);
            prop_assert!(p.distance(orig + a + b) <= 1e-9);
        }

        // find_pt follows the points into the same buckets
        let key_at = |m: &DockManager, pt: DVec2| m.find_pt(pt).map(|(k, _)| k);
        for orig in points(&m) {
            prop_assert_eq!(key_at(&once, orig + a + b), key_at(&m, orig));
        }
    }

    #[test]
    fn remove_mul_data_keeps_exactly_edge_buckets(m in manager_strategy()) {
        let edge_buckets: Vec<_> = m
            .iter()
            .filter(|(k, _)| k.is_edge_level())
            .map(|(k, d)| (k, d.to_vec()))
            .collect();
        let mut trimmed = m.clone();
        trimmed.remove_mul_data();
        let after: Vec<_> = trimmed.iter().map(|(k, d)| (k, d.to_vec())).collect();
        prop_assert_eq!(&after, &edge_buckets);

        let mut twice = trimmed.clone();
        twice.remove_mul_data();
        prop_assert_eq!(twice, trimmed);
    }

    #[test]
    fn dock_json_round_trip(m in manager_strategy()) {
        let back = DockManager::deserialize(m.to_json().unwrap()).unwrap();
        prop_assert_eq!(back, m);
    }
}

/// Two-sash sliding window: sash A slides right, sash B slides left, a
/// mullion separates them and a vertical track bar T-joins A's sill.
#[test]
fn sliding_window_roles() {
    let frame: PolyShape = rect(0.0, 0.0, 200.0, 100.0).into();
    let shapes = vec![frame.clone()];
    let mut bars = Bar::along(&frame, 0);
    let mullion = Bar::new(
        PolyId::new(1, 0),
        Edge::segment(DVec2::new(100.0, 0.0), DVec2::new(100.0, 100.0)),
    );
    let track = Bar::new(
        PolyId::new(2, 0),
        Edge::segment(DVec2::new(50.0, -30.0), DVec2::new(50.0, 0.0)),
    );
    bars.push(mullion.clone());
    bars.push(track.clone());

    let mut a = Sash::new(rect(0.0, 0.0, 100.0, 100.0)).sliding(Direction::Right);
    a.docks.push(PolyId::edge(1), DockData::new(DVec2::new(100.0, 50.0), PolyId::new(1, 0)));
    a.docks.push(PolyId::edge(3), DockData::new(DVec2::new(0.0, 50.0), PolyId::new(0, 3)));
    a.docks.push(PolyId::edge(0), DockData::new(DVec2::new(50.0, 0.0), PolyId::new(0, 0)));
    a.docks.push(PolyId::new(0, 0), DockData::new(DVec2::new(50.0, 0.0), PolyId::new(2, 0)));

    let mut b = Sash::new(rect(100.0, 0.0, 200.0, 100.0)).sliding(Direction::Left);
    b.docks.push(PolyId::edge(3), DockData::new(DVec2::new(100.0, 50.0), PolyId::new(1, 0)));
    b.docks.push(PolyId::edge(1), DockData::new(DVec2::new(200.0, 50.0), PolyId::new(0, 1)));

    let report = PushSlideCCBar::new().analyze(&[a.clone(), b], &mut bars);
    assert_eq!(report.sashes, 2);

    let roles = |id: PolyId| bars.iter().find(|bar| bar.poly_id == id).map(|bar| bar.roles);
    let mullion_roles = roles(PolyId::new(1, 0)).unwrap();
    assert!(mullion_roles.is_slide && mullion_roles.is_push_slide);
    assert!(roles(PolyId::new(2, 0)).unwrap().is_push_track);
    assert!(!roles(PolyId::new(0, 0)).unwrap().any());
    assert!(!roles(PolyId::new(0, 1)).unwrap().any());
    assert!(!roles(PolyId::new(0, 3)).unwrap().any());
    assert_eq!(report.push_track, 1);

    // sill of sash A resolves back to the outer frame
    let sill = a.docks.get_dock_edge(PolyId::edge(0), &shapes).unwrap();
    assert_eq!(sill.start(), DVec2::new(0.0, 0.0));
    assert!(shapes.shape(1).is_none());
}

#[test]
fn relations_track_docked_vertices() {
    let sash = Sash::new(rect(0.0, 0.0, 100.0, 100.0));
    let vertex_count = sash.polygon.vertices().len();
    let mut relations = FrameRelations::framed(vertex_count);
    relations.set(FrameRelationData::dock(1, PolyId::edge(1), PolyId::new(0, 1)));
    relations.set(FrameRelationData::dock(2, PolyId::edge(1), PolyId::new(0, 1)));

    assert!(relations.validate(vertex_count).is_ok());
    assert_eq!(relations.docked().count(), 2);
    relations.set(FrameRelationData::frame(2));
    assert_eq!(relations.docked().count(), 1);
    assert_eq!(relations.len(), vertex_count);
}
