//! Multi-peer scenarios over the Loro store.

use std::collections::BTreeMap;

use kurbo::Point;
use livesketch_core::{
    BoardConfig, BoardSession, CanvasEngine, CanvasEvent, KeyInput, LoroStore, ObjectId, SceneGraph, Shape,
    SharedStore, ToolKind, UndoConfig,
};
use serde_json::json;

type Session = BoardSession<LoroStore, SceneGraph>;

fn config() -> BoardConfig {
    BoardConfig {
        undo: UndoConfig {
            max_steps: 100,
            merge_interval_ms: 0,
        },
        ..BoardConfig::default()
    }
}

fn peer() -> Session {
    let config = config();
    BoardSession::new(LoroStore::with_config(&config.undo), SceneGraph::new(), config)
}

fn send(session: &mut Session, event: CanvasEvent) {
    session.engine_mut().emit(event);
    session.process_events();
}

fn draw(session: &mut Session, tool: ToolKind, from: (f64, f64), to: (f64, f64)) -> ObjectId {
    session.set_tool(tool);
    send(session, CanvasEvent::PointerDown { point: Point::new(from.0, from.1) });
    let id = session.interaction().target().cloned().expect("provisional shape");
    send(session, CanvasEvent::PointerMove { point: Point::new(to.0, to.1) });
    send(session, CanvasEvent::PointerUp { point: Point::new(to.0, to.1) });
    id
}

/// Import `from`'s missing updates into `to` without reconciling.
fn deliver(from: &Session, to: &mut Session) {
    let bytes = from.store().export_updates(&to.store().version()).unwrap();
    to.store_mut().import(&bytes).unwrap();
}

/// Full mesh exchange followed by a sync pass on every peer.
fn exchange(peers: &mut [Session]) {
    for i in 0..peers.len() {
        for j in 0..peers.len() {
            if i != j {
                let bytes = peers[i]
                    .store()
                    .export_updates(&peers[j].store().version())
                    .unwrap();
                peers[j].store_mut().import(&bytes).unwrap();
            }
        }
    }
    for peer in peers.iter_mut() {
        peer.sync();
    }
}

fn graph(session: &Session) -> BTreeMap<ObjectId, Shape> {
    let engine = session.engine();
    engine
        .object_ids()
        .into_iter()
        .filter_map(|id| engine.object(&id).cloned().map(|shape| (id, shape)))
        .collect()
}

#[test]
fn rectangle_reaches_second_client() {
    let mut peers = vec![peer(), peer()];
    let id = draw(&mut peers[0], ToolKind::Rectangle, (10.0, 10.0), (100.0, 100.0));

    let records = peers[0].store().canvas_objects();
    assert_eq!(records.len(), 1);
    let value = serde_json::to_value(&records[&id]).unwrap();
    assert_eq!(value["objectId"], json!(id.as_str()));
    assert_eq!(value["type"], json!("rectangle"));
    assert_eq!(value["left"], json!(10.0));
    assert_eq!(value["top"], json!(10.0));
    assert_eq!(value["width"], json!(90.0));
    assert_eq!(value["height"], json!(90.0));

    exchange(&mut peers);
    assert_eq!(peers[1].engine().object(&id), peers[0].engine().object(&id));
    assert_eq!(peers[1].engine().len(), 1);
}

#[test]
fn reset_clears_peer_in_one_pass() {
    let mut peers = vec![peer(), peer()];
    for i in 0..5 {
        let x = i as f64 * 30.0;
        draw(&mut peers[0], ToolKind::Rectangle, (x, 0.0), (x + 20.0, 20.0));
    }
    exchange(&mut peers);
    assert_eq!(peers[1].engine().len(), 5);

    assert!(peers[0].reset());
    assert!(peers[0].store().is_empty());
    assert!(peers[0].engine().is_empty());

    let (a, b) = peers.split_at_mut(1);
    deliver(&a[0], &mut b[0]);
    let renders = b[0].engine().render_count();
    let report = b[0].sync().unwrap();

    assert_eq!(report.removed.len(), 5);
    assert!(b[0].engine().is_empty());
    assert_eq!(b[0].engine().render_count(), renders + 1);
}

#[test]
fn peers_converge_after_concurrent_edits() {
    let mut peers = vec![peer(), peer(), peer()];
    let a = draw(&mut peers[0], ToolKind::Rectangle, (0.0, 0.0), (50.0, 50.0));
    let b = draw(&mut peers[1], ToolKind::Circle, (200.0, 200.0), (260.0, 260.0));
    draw(&mut peers[2], ToolKind::Line, (400.0, 0.0), (450.0, 80.0));
    exchange(&mut peers);

    // Concurrent edits to the same object, and a delete elsewhere
    send(&mut peers[0], CanvasEvent::SelectionCreated { id: a.clone() });
    peers[0].modify_active("fill", "#ff0000").unwrap();
    send(&mut peers[1], CanvasEvent::SelectionCreated { id: a.clone() });
    peers[1].modify_active("width", "120").unwrap();
    send(&mut peers[2], CanvasEvent::SelectionCreated { id: b.clone() });
    peers[2].handle_key(&KeyInput::new("Delete", false, false));

    for peer in peers.iter_mut() {
        send(peer, CanvasEvent::SelectionCleared);
    }
    exchange(&mut peers);
    exchange(&mut peers);

    let first = graph(&peers[0]);
    assert_eq!(first.len(), 2);
    assert!(!first.contains_key(&b));
    for peer in &peers[1..] {
        assert_eq!(graph(peer), first);
        assert_eq!(peer.store().canvas_objects(), peers[0].store().canvas_objects());
    }
}

#[test]
fn active_edit_is_not_clobbered() {
    let mut peers = vec![peer(), peer()];
    let id = draw(&mut peers[0], ToolKind::Rectangle, (0.0, 0.0), (100.0, 100.0));
    exchange(&mut peers);

    // A grabs the rectangle and drags it
    send(&mut peers[0], CanvasEvent::PointerDown { point: Point::new(50.0, 50.0) });
    send(&mut peers[0], CanvasEvent::PointerMove { point: Point::new(80.0, 50.0) });
    let dragged = peers[0].engine().object(&id).cloned().unwrap();

    // B resizes it meanwhile
    send(&mut peers[1], CanvasEvent::SelectionCreated { id: id.clone() });
    peers[1].modify_active("width", "300").unwrap();
    send(&mut peers[1], CanvasEvent::SelectionCleared);

    let (a, b) = peers.split_at_mut(1);
    deliver(&b[0], &mut a[0]);
    let report = a[0].sync().unwrap();
    assert_eq!(report.protected, vec![id.clone()]);
    assert_eq!(a[0].engine().object(&id), Some(&dragged));

    // Releasing persists A's state, which then wins everywhere
    send(&mut peers[0], CanvasEvent::PointerUp { point: Point::new(80.0, 50.0) });
    exchange(&mut peers);

    for peer in &peers {
        let shape = peer.engine().object(&id).unwrap();
        assert_eq!(shape, &dragged);
        assert!((shape.bounds().x0 - 30.0).abs() < 1e-9);
        assert!((shape.scaled_width() - 100.0).abs() < 1e-9);
    }
}

#[test]
fn delete_propagates() {
    let mut peers = vec![peer(), peer()];
    let id = draw(&mut peers[0], ToolKind::Triangle, (10.0, 10.0), (60.0, 60.0));
    exchange(&mut peers);
    assert!(peers[1].engine().contains(&id));

    send(&mut peers[0], CanvasEvent::SelectionCreated { id: id.clone() });
    peers[0].handle_key(&KeyInput::new("Backspace", false, false));
    assert!(!peers[0].engine().contains(&id));

    exchange(&mut peers);
    assert!(!peers[1].engine().contains(&id));
    assert!(peers[1].store().is_empty());
}

#[test]
fn undo_only_reverts_local_changes() {
    let mut peers = vec![peer(), peer()];
    let mine = draw(&mut peers[0], ToolKind::Rectangle, (0.0, 0.0), (10.0, 10.0));
    let theirs = draw(&mut peers[1], ToolKind::Rectangle, (100.0, 100.0), (110.0, 110.0));
    exchange(&mut peers);
    assert_eq!(peers[0].engine().len(), 2);

    peers[0].handle_key(&KeyInput::new("z", true, false));
    exchange(&mut peers);

    for peer in &peers {
        assert!(!peer.engine().contains(&mine));
        assert!(peer.engine().contains(&theirs));
    }
}

#[test]
fn late_joiner_renders_snapshot() {
    let mut host = peer();
    draw(&mut host, ToolKind::Rectangle, (0.0, 0.0), (40.0, 40.0));
    draw(&mut host, ToolKind::Text, (100.0, 100.0), (100.0, 100.0));
    draw(&mut host, ToolKind::Freehand, (300.0, 300.0), (340.0, 320.0));

    let snapshot = host.store().export_snapshot().unwrap();
    let config = config();
    let store = LoroStore::from_snapshot(&snapshot, &config.undo).unwrap();
    let joiner = BoardSession::new(store, SceneGraph::new(), config);

    assert_eq!(graph(&joiner), graph(&host));
}
