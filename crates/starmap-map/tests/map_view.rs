//! End-to-end behaviour of a map view driven through snapshots and ticks.

use std::cell::RefCell;
use std::rc::Rc;

use starmap_engine::coords::{Vec2, Viewport};
use starmap_engine::scene::DrawList;
use starmap_map::paths::{PathHost, PathKey};
use starmap_map::world::{MoverSnapshot, StarSnapshot};
use starmap_map::{Camera, EntityId, Leg, LodCallback, MapConfig, MapView, WorldSnapshot};

const S1: EntityId = EntityId(1);
const S2: EntityId = EntityId(2);
const C1: EntityId = EntityId(101);
const C2: EntityId = EntityId(102);

fn config() -> MapConfig {
    MapConfig { chunk_size: 100.0, ..MapConfig::default() }
}

fn two_carriers() -> WorldSnapshot {
    WorldSnapshot {
        stars: vec![
            StarSnapshot { id: S1, location: Vec2::new(10.0, 10.0) },
            StarSnapshot { id: S2, location: Vec2::new(450.0, 10.0) },
        ],
        movers: vec![
            MoverSnapshot {
                id: C1,
                location: Vec2::new(10.0, 10.0),
                route: vec![Leg { source: S1, dest: S2 }, Leg { source: S2, dest: S1 }],
                looped: true,
            },
            MoverSnapshot {
                id: C2,
                location: Vec2::new(12.0, 10.0),
                route: vec![Leg { source: S1, dest: S2 }],
                looped: false,
            },
        ],
    }
}

// ── shared vs unique ──────────────────────────────────────────────────────

#[test]
fn looped_carrier_shares_direct_carrier_owns() {
    let mut view = MapView::new(config());
    view.reload(&two_carriers(), &mut |_| None);

    let key = PathKey::new(S1, S2);
    assert_eq!(view.paths().shared_len(), 1);
    assert_eq!(view.paths().member_count(key), 1);
    assert_eq!(view.paths().unique_len(), 1);

    let unique = view.unique_paths_of(C2)[0];
    let shared = view.paths().shared(key).unwrap().handle();
    assert_ne!(unique, shared);

    view.remove_object(C1);
    assert_eq!(view.paths().shared_len(), 0);
    assert!(!view.paths().is_attached(shared));
    assert!(view.paths().is_attached(unique));
    assert_eq!(view.paths().unique_len(), 1);
}

#[test]
fn long_edges_are_chunkless_and_always_drawn() {
    let mut view = MapView::new(config());
    view.reload(&two_carriers(), &mut |_| None);
    let key = PathKey::new(S1, S2);
    let shared = view.paths().shared(key).unwrap().handle();
    assert_eq!(view.paths().host_of(shared), Some(PathHost::Chunkless));

    // Camera far from both stars: markers are culled, the edge is not.
    view.tick(Camera::new(Vec2::new(200.0, 200.0), 100.0), Viewport::new(50.0, 50.0));
    let mut list = DrawList::new();
    view.draw(&mut list);
    assert!(!list.is_empty());
    assert!(view.paths().is_shown(shared));
    assert!(!view.index().is_visible(S1));
}

#[test]
fn reload_rebuilds_paths_from_scratch() {
    let mut view = MapView::new(config());
    let snapshot = two_carriers();
    view.reload(&snapshot, &mut |_| None);
    view.reload(&snapshot, &mut |_| None);
    assert_eq!(view.paths().shared_len(), 1);
    assert_eq!(view.paths().unique_len(), 1);
    assert_eq!(view.paths().node_count(), 2);
}

// ── per frame ─────────────────────────────────────────────────────────────

#[test]
fn unchanged_camera_mutates_nothing() {
    let mut view = MapView::new(config());
    view.reload(&two_carriers(), &mut |_| None);
    let camera = Camera::new(Vec2::zero(), 100.0);
    let screen = Viewport::new(300.0, 200.0);

    view.tick(camera, screen);
    let objects = view.index().mutation_count();
    let paths = view.paths().mutation_count();

    for _ in 0..10 {
        assert!(view.tick(camera, screen).is_idle());
    }
    assert_eq!(view.index().mutation_count(), objects);
    assert_eq!(view.paths().mutation_count(), paths);
}

#[test]
fn zoom_refreshes_visible_objects_and_pan_only_new_ones() {
    let calls: Rc<RefCell<Vec<(EntityId, f32)>>> = Rc::default();
    let mut view = MapView::new(config());
    let sink = Rc::clone(&calls);
    view.reload(&two_carriers(), &mut |object| {
        let sink = Rc::clone(&sink);
        let id = object.id;
        Some(Box::new(move |zoom| sink.borrow_mut().push((id, zoom))) as LodCallback)
    });

    let screen = Viewport::new(100.0, 100.0);
    view.tick(Camera::new(Vec2::zero(), 100.0), screen);
    let mut first: Vec<EntityId> = calls.borrow().iter().map(|c| c.0).collect();
    first.sort();
    assert_eq!(first, vec![S1, C1, C2]);

    calls.borrow_mut().clear();
    view.tick(Camera::new(Vec2::zero(), 200.0), screen);
    assert_eq!(calls.borrow().len(), 3);
    assert!(calls.borrow().iter().all(|&(_, zoom)| zoom == 200.0));

    calls.borrow_mut().clear();
    view.tick(Camera::new(Vec2::new(400.0, 0.0), 200.0), screen);
    assert_eq!(*calls.borrow(), vec![(S2, 200.0)]);
}
