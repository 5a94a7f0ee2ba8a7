//! Integration tests: canvas interaction state machine (sb-editor).
//!
//! Drives `CanvasEditor` purely through `InputEvent`s and commands, the way
//! a host would, and checks graph, selection, viewport and frame output.

use pretty_assertions::assert_eq;
use sb_core::{CanvasConfig, CanvasMutation, Node, NodeId, Point};
use sb_editor::{CanvasEditor, CanvasEvent, InputEvent, Modifiers, PointerButton, Session};
use sb_render::{NodeVisual, SlotVisual};
use std::cell::RefCell;
use std::rc::Rc;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn editor() -> CanvasEditor {
    init();
    CanvasEditor::new(CanvasConfig::default())
}

fn add(ed: &mut CanvasEditor, node: Node) -> NodeId {
    let id = node.id;
    ed.apply(CanvasMutation::AddNode(Box::new(node)));
    id
}

fn position(ed: &CanvasEditor, id: NodeId) -> Point {
    ed.graph().node(id).map(|n| n.position).unwrap_or_default()
}

fn drag(ed: &mut CanvasEditor, from: Point, to: Point, modifiers: Modifiers) {
    ed.handle(&InputEvent::pointer_down(
        from.x,
        from.y,
        PointerButton::Primary,
        modifiers,
    ));
    ed.handle(&InputEvent::pointer_move((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
    ed.handle(&InputEvent::pointer_move(to.x, to.y));
    ed.handle(&InputEvent::pointer_up(to.x, to.y));
}

// ─── Selection & drag ───────────────────────────────────────────────────

#[test]
fn shift_select_then_group_drag() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_b_a"), Point::new(0.0, 0.0)));
    let b = add(&mut ed, Node::shot(NodeId::intern("it_b_b"), Point::new(400.0, 0.0)));
    let c = add(&mut ed, Node::shot(NodeId::intern("it_b_c"), Point::new(0.0, 400.0)));

    ed.handle(&InputEvent::click(50.0, 50.0));
    ed.handle(&InputEvent::pointer_up(50.0, 50.0));
    drag(
        &mut ed,
        Point::new(450.0, 50.0),
        Point::new(500.0, 70.0),
        Modifiers::SHIFT,
    );

    assert_eq!(ed.selection(), &[a, b]);
    assert_eq!(position(&ed, a), Point::new(50.0, 20.0));
    assert_eq!(position(&ed, b), Point::new(450.0, 20.0));
    assert_eq!(position(&ed, c), Point::new(0.0, 400.0));
    assert!(ed.session().is_idle());
}

#[test]
fn group_drag_keeps_relative_offsets_when_zoomed() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_rigid_a"), Point::new(10.0, 10.0)));
    let b = add(&mut ed, Node::shot(NodeId::intern("it_rigid_b"), Point::new(300.0, 250.0)));
    ed.zoom_by(2.0);
    ed.pan_to(Point::new(-40.0, 15.0));
    ed.select_all();

    let start = ed.viewport().world_to_screen(Point::new(60.0, 60.0));
    let end = start + Point::new(30.0, -12.0);
    drag(&mut ed, start, end, Modifiers::NONE);

    // 30 / -12 screen pixels at zoom 2.
    assert_eq!(position(&ed, a), Point::new(25.0, 4.0));
    assert_eq!(position(&ed, b), Point::new(315.0, 244.0));
}

#[test]
fn shift_press_on_selected_node_drags_whole_group() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_grab_a"), Point::new(0.0, 0.0)));
    let b = add(&mut ed, Node::shot(NodeId::intern("it_grab_b"), Point::new(400.0, 0.0)));
    ed.select_node(a, false);
    ed.select_node(b, true);

    ed.handle(&InputEvent::pointer_down(
        50.0,
        50.0,
        PointerButton::Primary,
        Modifiers::SHIFT,
    ));
    assert_eq!(ed.selection(), &[a, b]);
    assert!(matches!(ed.session(), Session::Dragging { .. }));

    ed.handle(&InputEvent::pointer_move(100.0, 70.0));
    ed.handle(&InputEvent::pointer_up(100.0, 70.0));
    assert_eq!(ed.selection(), &[a, b]);
    assert_eq!(position(&ed, a), Point::new(50.0, 20.0));
    assert_eq!(position(&ed, b), Point::new(450.0, 20.0));
    assert!(ed.session().is_idle());
}

#[test]
fn undo_of_drag_restores_positions() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_undo_drag"), Point::ZERO));
    drag(
        &mut ed,
        Point::new(50.0, 50.0),
        Point::new(150.0, 80.0),
        Modifiers::NONE,
    );
    assert_eq!(position(&ed, a), Point::new(100.0, 30.0));

    assert_eq!(ed.undo().as_deref(), Some("move nodes"));
    assert_eq!(position(&ed, a), Point::ZERO);
    assert_eq!(ed.redo().as_deref(), Some("move nodes"));
    assert_eq!(position(&ed, a), Point::new(100.0, 30.0));
}

#[test]
fn selection_changes_are_announced() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_announce"), Point::ZERO));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    ed.subscribe(move |e| {
        if let CanvasEvent::SelectionChanged(ids) = e {
            sink.borrow_mut().push(ids.clone());
        }
    });

    ed.handle(&InputEvent::click(50.0, 50.0));
    ed.handle(&InputEvent::pointer_up(50.0, 50.0));
    ed.handle(&InputEvent::click(900.0, 900.0));

    assert_eq!(*seen.borrow(), vec![vec![a], vec![]]);
}

// ─── Connecting ─────────────────────────────────────────────────────────

#[test]
fn connect_ignores_self_then_links_target() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_c_a"), Point::ZERO));
    let b = add(&mut ed, Node::shot(NodeId::intern("it_c_b"), Point::new(400.0, 0.0)));

    assert!(ed.start_connection(a));
    ed.handle(&InputEvent::click(50.0, 50.0));
    assert_eq!(ed.graph().connection_count(), 0);
    assert!(matches!(ed.session(), Session::ConnectingDraft { .. }));

    ed.handle(&InputEvent::click(450.0, 50.0));
    assert_eq!(ed.graph().connection_count(), 1);
    assert!(ed.graph().find_connection(a, b).is_some());
    assert!(ed.session().is_idle());
}

#[test]
fn connecting_pointer_moves_only_touch_the_preview() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_preview"), Point::ZERO));
    ed.start_connection(a);
    ed.handle(&InputEvent::pointer_move(600.0, 300.0));

    assert_eq!(
        ed.session().draft(),
        Some((a, Point::new(600.0, 300.0)))
    );
    assert_eq!(position(&ed, a), Point::ZERO);
    let frame = ed.frame();
    assert!(frame.draft.is_some());
    assert!(frame.connections.is_empty());
}

#[test]
fn background_click_cancels_connection() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_cancel_bg"), Point::ZERO));
    ed.start_connection(a);
    ed.handle(&InputEvent::click(1000.0, 1000.0));
    assert!(ed.session().is_idle());
    assert_eq!(ed.graph().connection_count(), 0);
    assert!(ed.frame().draft.is_none());
}

#[test]
fn duplicate_connection_is_silent() {
    let mut ed = editor();
    let a = add(&mut ed, Node::shot(NodeId::intern("it_dup_a"), Point::ZERO));
    add(&mut ed, Node::shot(NodeId::intern("it_dup_b"), Point::new(400.0, 0.0)));
    for _ in 0..2 {
        ed.start_connection(a);
        ed.handle(&InputEvent::click(450.0, 50.0));
    }
    assert_eq!(ed.graph().connection_count(), 1);
    assert!(ed.session().is_idle());
}

// ─── Panning & zoom ─────────────────────────────────────────────────────

#[test]
fn middle_button_pan_is_anchored() {
    let mut ed = editor();
    add(&mut ed, Node::shot(NodeId::intern("it_pan_node"), Point::ZERO));
    // Middle button pans even over a node.
    ed.handle(&InputEvent::pointer_down(
        10.0,
        10.0,
        PointerButton::Middle,
        Modifiers::NONE,
    ));
    for i in 1..=100 {
        let t = i as f64 / 100.0;
        ed.handle(&InputEvent::pointer_move(10.0 + 100.0 * t, 10.0 + 50.0 * t));
    }
    ed.handle(&InputEvent::pointer_up(110.0, 60.0));

    assert_eq!(ed.viewport().offset, Point::new(100.0, 50.0));
    assert_eq!(ed.viewport().zoom(), 1.0);
    assert!(ed.selection().is_empty());
}

#[test]
fn zoom_round_trip() {
    let mut ed = editor();
    for _ in 0..10 {
        ed.zoom_by(1.1);
    }
    for _ in 0..10 {
        ed.zoom_by(1.0 / 1.1);
    }
    assert!((ed.viewport().zoom() - 1.0).abs() < 1e-4);
}

#[test]
fn zoom_stays_clamped() {
    let mut ed = editor();
    for _ in 0..100 {
        ed.handle(&InputEvent::Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: -120.0,
        });
    }
    assert_eq!(ed.viewport().zoom(), 5.0);
    for _ in 0..200 {
        ed.handle(&InputEvent::Wheel {
            x: 0.0,
            y: 0.0,
            delta_y: 120.0,
        });
    }
    assert!((ed.viewport().zoom() - 0.1).abs() < 1e-6);
}

#[test]
fn reset_view_shortcut() {
    let mut ed = editor();
    ed.zoom_by(3.0);
    ed.pan_to(Point::new(40.0, -20.0));
    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    assert!(ed.handle(&InputEvent::key("0", cmd)));
    assert_eq!(ed.viewport().offset, Point::ZERO);
    assert_eq!(ed.viewport().zoom(), 1.0);
}

// ─── Scene-masters ──────────────────────────────────────────────────────

fn scene_with_children(ed: &mut CanvasEditor, prefix: &str, n: usize) -> (NodeId, Vec<NodeId>) {
    let s = add(
        ed,
        Node::scene_master(NodeId::intern(&format!("{prefix}_scene")), Point::ZERO),
    );
    let children = (0..n)
        .map(|i| {
            add(
                ed,
                Node::shot(NodeId::intern(&format!("{prefix}_child{i}")), Point::ZERO).in_scene(s),
            )
        })
        .collect();
    (s, children)
}

fn grid(ed: &CanvasEditor, scene: NodeId) -> Vec<Option<NodeId>> {
    ed.frame()
        .nodes
        .iter()
        .find_map(|v| match v {
            NodeVisual::Scene(s) if s.id == scene => {
                Some(s.slots.iter().map(SlotVisual::child).collect())
            }
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn expand_collapse_keeps_children_in_order() {
    let mut ed = editor();
    let (s, children) = scene_with_children(&mut ed, "it_d", 3);

    // Double-click in the collapsed body, away from the close control.
    ed.handle(&InputEvent::DoubleClick { x: 40.0, y: 60.0 });
    let first = grid(&ed, s);
    assert_eq!(first.len(), 25);
    assert_eq!(first.iter().filter(|c| c.is_some()).count(), 3);
    assert_eq!(
        first.iter().take(3).copied().collect::<Vec<_>>(),
        children.iter().copied().map(Some).collect::<Vec<_>>()
    );

    ed.toggle_expanded(s);
    assert!(grid(&ed, s).is_empty());
    ed.toggle_expanded(s);
    assert_eq!(grid(&ed, s), first);
    assert_eq!(ed.graph().children_of(s), children);
}

#[test]
fn slot_click_selects_child_not_scene() {
    let mut ed = editor();
    let (s, children) = scene_with_children(&mut ed, "it_slot", 2);
    ed.toggle_expanded(s);

    let scene_box = ed.layout().world_bounds(s).expect("scene is on the canvas");
    let slot = ed.layout().slot_bounds(&scene_box, 1);
    let screen = ed.viewport().world_to_screen(slot.center());
    ed.handle(&InputEvent::click(screen.x, screen.y));

    assert_eq!(ed.selection(), &[children[1]]);
    assert!(ed.session().is_idle());
    assert_eq!(position(&ed, s), Point::ZERO);
}

#[test]
fn deleting_scene_releases_children() {
    let mut ed = editor();
    let (s, children) = scene_with_children(&mut ed, "it_release", 2);
    ed.toggle_expanded(s);
    ed.select_node(s, false);
    ed.handle(&InputEvent::key("Backspace", Modifiers::NONE));

    assert!(!ed.graph().contains_node(s));
    assert!(!ed.is_expanded(s));
    for c in children {
        assert_eq!(ed.graph().node(c).and_then(|n| n.scene_id), None);
    }
}
