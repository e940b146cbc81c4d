//! End-to-end behavior of one map view driven through the recording backend.

use glam::Vec2;
use tileview_engine::{DrawOutcome, Engine, EngineConfig};
use tileview_input::PointerEvent;
use tileview_kernel::{Building, Tile, World};
use tileview_persist::{KvStore, MemoryStore, load_json};
use tileview_render::{Layer, RecordingBackend, RenderBackend};
use tileview_stream::ModelId;

fn ready_engine() -> Engine<RecordingBackend> {
    let mut engine =
        Engine::with_defaults(EngineConfig::default(), RecordingBackend::new()).unwrap();
    for ticket in engine.begin_preload() {
        ticket.complete();
    }
    engine
}

/// 10x10 grid, forest at (3, 3) with height 0.5.
fn forest_world() -> World {
    let tiles = (0..10)
        .flat_map(|y| {
            (0..10).map(move |x| {
                if (x, y) == (3, 3) {
                    Tile::new(x, y, "forest", 0.5)
                } else {
                    Tile::new(x, y, "water", 0.0)
                }
            })
        })
        .collect();
    World::new(10, tiles, vec![]).unwrap()
}

fn presented_texts(engine: &Engine<RecordingBackend>) -> Vec<String> {
    engine
        .backend()
        .presented()
        .map(|f| f.texts().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn pick_tile_under_pointer() {
    let mut engine = ready_engine();
    assert!(matches!(engine.load_world(forest_world()), DrawOutcome::Walked(_)));

    let picked = engine.tile_at_screen_position(1050.0, 1050.0).unwrap();
    assert_eq!((picked.tile.x, picked.tile.y), (3, 3));
    assert_eq!(picked.tile.kind.as_str(), "forest");
    assert_eq!(picked.tile.height, 0.5);
    assert!(picked.building.is_none());
}

#[test]
fn pick_follows_pan_and_zoom() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    // Content follows the drag: the forest moves 300 pixels right.
    engine.move_by(300.0, 0.0);
    assert_eq!(engine.tile_at_screen_position(1050.0, 1050.0).unwrap().tile.x, 2);
    assert_eq!(engine.tile_at_screen_position(1350.0, 1050.0).unwrap().tile.x, 3);

    engine.zoom_in();
    let camera = *engine.camera();
    let transform = engine.transform();
    let center = transform.world_to_screen(&camera, Vec2::new(3.5, 3.5));
    let picked = engine.tile_at_screen_position(center.x, center.y).unwrap();
    assert_eq!((picked.tile.x, picked.tile.y), (3, 3));
}

#[test]
fn nothing_drawn_until_textures_load() {
    let mut engine =
        Engine::with_defaults(EngineConfig::default(), RecordingBackend::new()).unwrap();
    let tickets = engine.begin_preload();
    assert!(!engine.is_ready());
    assert_eq!(engine.load_world(forest_world()), DrawOutcome::NotReady);
    assert_eq!(engine.move_by(10.0, 0.0), DrawOutcome::NotReady);
    assert_eq!(engine.zoom_in(), DrawOutcome::NotReady);
    assert!(engine.backend().presented().is_none());

    let mut tickets = tickets.into_iter();
    let last = tickets.next_back().unwrap();
    for ticket in tickets {
        ticket.complete();
    }
    assert!(!engine.is_ready());
    last.complete();
    assert!(engine.is_ready());

    assert!(matches!(engine.on_animation_frame(), Some(DrawOutcome::Walked(_))));
    assert_eq!(engine.backend().present_count(), 1);
}

#[test]
fn cached_terrain_matches_full_walk() {
    let world = tileview_tools::sample_world(12).unwrap();
    let mut engine = ready_engine();
    engine.load_world(world.clone());
    let walked = engine.backend().presented().unwrap().terrain.clone();

    assert_eq!(engine.redraw(true), DrawOutcome::Cached);
    let cached = engine.backend().presented().unwrap().terrain.clone();
    assert_eq!(cached, walked);

    // Independent engine, same world: same terrain.
    let mut other = ready_engine();
    other.load_world(world);
    assert_eq!(other.backend().presented().unwrap().terrain, walked);
}

#[test]
fn redraw_without_cache_walks_again() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    assert!(matches!(engine.redraw(false), DrawOutcome::Walked(stats) if stats.tiles == 100));
    assert_eq!(engine.cache().len(), 1);
}

#[test]
fn pan_reuses_cached_frame() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    let misses = engine.cache().misses();

    for step in 1..=5 {
        assert_eq!(engine.move_by(-20.0, 10.0), DrawOutcome::Cached);
        let camera = engine.backend().presented().unwrap().camera.unwrap();
        assert_eq!(camera.offset, Vec2::new(-20.0, 10.0) * step as f32);
    }
    assert_eq!(engine.cache().misses(), misses);
    assert_eq!(engine.cache().hits(), 5);
}

#[test]
fn new_world_invalidates_cache() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    assert_eq!(engine.cache().len(), 1);

    let outcome = engine.load_world(tileview_tools::sample_world(6).unwrap());
    assert!(matches!(outcome, DrawOutcome::Walked(stats) if stats.tiles == 36));
    assert_eq!(engine.cache().len(), 1);
    assert_eq!(engine.backend().live(Layer::Terrain), 36);
}

#[test]
fn zoom_stays_within_range() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    for _ in 0..50 {
        engine.zoom_in();
    }
    assert_eq!(engine.camera().zoom, 0.1);
    for _ in 0..50 {
        engine.zoom_out();
    }
    assert_eq!(engine.camera().zoom, 1.0);
}

#[test]
fn wheel_zooms_on_next_frame() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());

    let response = engine.handle_pointer(PointerEvent::Wheel {
        delta_y: -3.0,
        at: Vec2::new(1050.0, 1050.0),
    });
    assert!(response.request_frame);
    assert!(response.outcome.is_none());
    assert_eq!(engine.camera().zoom, 1.0);

    engine.on_animation_frame().unwrap();
    assert!(engine.camera().zoom < 1.0);
    // The tile under the pointer stays under the pointer.
    let picked = engine.tile_at_screen_position(1050.0, 1050.0).unwrap();
    assert_eq!((picked.tile.x, picked.tile.y), (3, 3));

    let zero = engine.handle_pointer(PointerEvent::Wheel {
        delta_y: 0.0,
        at: Vec2::ZERO,
    });
    assert!(!zero.request_frame);
    assert!(engine.on_animation_frame().is_none());
}

#[test]
fn coalesced_moves_redraw_once() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    let before = engine.backend().present_count();

    engine.handle_pointer(PointerEvent::Down {
        at: Vec2::new(100.0, 100.0),
    });
    let first = engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(110.0, 100.0),
    });
    let second = engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(150.0, 120.0),
    });
    assert!(first.request_frame);
    assert!(!second.request_frame);

    assert_eq!(engine.on_animation_frame(), Some(DrawOutcome::Cached));
    assert_eq!(engine.backend().present_count(), before + 1);
    assert_eq!(engine.camera().offset, Vec2::new(50.0, 20.0));

    let up = engine.handle_pointer(PointerEvent::Up {
        at: Vec2::new(150.0, 120.0),
    });
    assert!(up.outcome.is_none());
    assert!(engine.on_animation_frame().is_none());
}

#[test]
fn hover_shows_tile_details() {
    let world = World::new(
        10,
        vec![Tile::new(3, 3, "forest", 0.5), Tile::new(0, 0, "water", 0.0)],
        vec![Building::new(3, 3, 2.0, "house")],
    )
    .unwrap();
    let mut engine = ready_engine();
    engine.load_world(world);

    engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(1050.0, 1050.0),
    });
    engine.on_animation_frame().unwrap();
    assert_eq!(
        presented_texts(&engine),
        ["forest", "Height: 0.5", "Coordinates: 3, 3", "Building: house"]
    );

    // Highlight plus one background per line.
    let overlay = &engine.backend().presented().unwrap().overlay;
    assert_eq!(overlay.len(), 1 + 4 * 2);
}

#[test]
fn hover_over_empty_space_draws_nothing() {
    let mut engine = ready_engine();
    engine.load_world(World::new(10, vec![Tile::new(0, 0, "water", 0.0)], vec![]).unwrap());
    engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(1050.0, 1050.0),
    });
    engine.on_animation_frame().unwrap();
    assert!(engine.backend().presented().unwrap().overlay.is_empty());
}

#[test]
fn leave_clears_overlay() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(1050.0, 1050.0),
    });
    engine.on_animation_frame().unwrap();
    assert!(!presented_texts(&engine).is_empty());

    let response = engine.handle_pointer(PointerEvent::Leave);
    assert_eq!(response.outcome, Some(DrawOutcome::Cached));
    assert!(engine.hover().is_none());
    assert!(presented_texts(&engine).is_empty());
    assert_eq!(engine.backend().live(Layer::Overlay), 0);
}

#[test]
fn drag_start_clears_overlay() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(1050.0, 1050.0),
    });
    engine.on_animation_frame().unwrap();
    assert!(engine.hover().is_some());

    let response = engine.handle_pointer(PointerEvent::Down {
        at: Vec2::new(1050.0, 1050.0),
    });
    assert_eq!(response.outcome, Some(DrawOutcome::Cached));
    assert!(engine.hover().is_none());
    assert!(presented_texts(&engine).is_empty());

    engine.handle_pointer(PointerEvent::Move {
        at: Vec2::new(1100.0, 1050.0),
    });
    engine.on_animation_frame().unwrap();
    assert!(presented_texts(&engine).is_empty());
    assert_eq!(engine.camera().offset, Vec2::new(50.0, 0.0));
}

#[test]
fn camera_survives_restart() {
    let mut engine = ready_engine().with_store(Box::new(MemoryStore::new()));
    engine.load_world(forest_world());
    engine.move_by(120.0, -40.0);
    engine.zoom_in();
    let camera = *engine.camera();

    // Hand the stored blobs to a fresh engine.
    let store = engine.store().unwrap();
    let mut copy = MemoryStore::new();
    for key in ["camera", "world"] {
        let raw = store.load_raw(key).unwrap().unwrap();
        copy.save_raw(key, &raw).unwrap();
    }
    assert_eq!(load_json::<World>(&copy, "world").unwrap().unwrap().tiles().len(), 100);

    let mut restarted = ready_engine().with_store(Box::new(copy));
    assert_eq!(*restarted.camera(), camera);
    assert!(restarted.restore_world().unwrap().unwrap().presented());
    assert_eq!(restarted.world().unwrap().resolution(), 10);
}

#[test]
fn models_cull_by_distance_to_eye() {
    let world = World::new(
        10,
        vec![Tile::new(0, 0, "valley", 0.0), Tile::new(3, 3, "forest", 1.0)],
        vec![Building::new(0, 0, 1.0, "house"), Building::new(3, 3, 1.0, "house")],
    )
    .unwrap();
    let corner = ModelId(0);
    let forest = ModelId(300_003);

    let mut engine = ready_engine();
    engine.load_world(world);
    assert_eq!(engine.instancer().len(), 2);
    assert!(engine.instancer().is_realized(forest));
    assert!(!engine.instancer().is_realized(corner));
    let house_voxels = engine.models().get("house").unwrap().voxel_count();
    assert_eq!(engine.backend().live(Layer::Models), house_voxels);

    // Center the view on the map corner.
    engine.move_by(1500.0, 1500.0);
    assert!(engine.instancer().is_realized(corner));
    assert!(!engine.instancer().is_realized(forest));
    assert_eq!(engine.backend().live(Layer::Models), house_voxels);
}

#[test]
fn backend_camera_tracks_state() {
    let mut engine = ready_engine();
    engine.load_world(forest_world());
    engine.zoom_out();
    engine.zoom_in();
    let view = *engine.backend().camera().unwrap();
    assert_eq!(view.zoom, engine.camera().zoom);
    assert_eq!(view.pose, engine.transform().pose(engine.camera()));
    // Text metrics come from the backend.
    assert_eq!(engine.backend().measure_text("ab", 10.0), Vec2::new(10.0, 10.0));
}
