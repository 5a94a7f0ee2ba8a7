//! Property-based tests for group dragging (sb-editor).
//!
//! 1. A group drag moves every selected node by the same world delta
//! 2. The delta is the screen delta divided by zoom
//! 3. Undo puts every node back exactly

use proptest::prelude::*;
use sb_core::{CanvasConfig, CanvasMutation, Node, NodeId, Point};
use sb_editor::{CanvasEditor, InputEvent, Modifiers, PointerButton};

// ── Strategies ──────────────────────────────────────────────────────────

/// Node rows are far enough apart that no two boxes overlap.
const ROW: f64 = 1000.0;

fn layout_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-5000.0f64..5000.0, 2..6)
}

fn view_strategy() -> impl Strategy<Value = (f64, Point)> {
    (0.1f64..=5.0, -2000.0f64..2000.0, -2000.0f64..2000.0)
        .prop_map(|(zoom, x, y)| (zoom, Point::new(x, y)))
}

fn delta_strategy() -> impl Strategy<Value = Point> {
    (-800.0f64..800.0, -800.0f64..800.0).prop_map(|(x, y)| Point::new(x, y))
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

fn canvas(xs: &[f64], zoom: f64, offset: Point) -> (CanvasEditor, Vec<NodeId>) {
    let mut ed = CanvasEditor::new(CanvasConfig::default());
    let ids: Vec<NodeId> = xs
        .iter()
        .enumerate()
        .map(|(row, &x)| {
            let id = NodeId::with_prefix("pd_shot");
            ed.apply(CanvasMutation::AddNode(Box::new(Node::shot(
                id,
                Point::new(x, row as f64 * ROW),
            ))));
            id
        })
        .collect();
    ed.zoom_by(zoom);
    ed.pan_to(offset);
    (ed, ids)
}

fn positions(ed: &CanvasEditor, ids: &[NodeId]) -> Vec<Point> {
    ids.iter()
        .filter_map(|id| ed.graph().node(*id).map(|n| n.position))
        .collect()
}

/// Press the centre of `grab`, move by `delta` in two steps, release.
fn drag_group(ed: &mut CanvasEditor, grab: NodeId, delta: Point) {
    let Some(bounds) = ed.layout().world_bounds(grab) else {
        return;
    };
    let from = ed.viewport().world_to_screen(bounds.center());
    let to = from + delta;
    ed.handle(&InputEvent::pointer_down(
        from.x,
        from.y,
        PointerButton::Primary,
        Modifiers::NONE,
    ));
    ed.handle(&InputEvent::pointer_move(from.x + delta.x / 2.0, from.y + delta.y / 2.0));
    ed.handle(&InputEvent::pointer_move(to.x, to.y));
    ed.handle(&InputEvent::pointer_up(to.x, to.y));
}

proptest! {
    #[test]
    fn group_drag_is_rigid(
        xs in layout_strategy(),
        view in view_strategy(),
        delta in delta_strategy(),
        grab in any::<prop::sample::Index>(),
    ) {
        let (zoom, offset) = view;
        let (mut ed, ids) = canvas(&xs, zoom, offset);
        ed.select_all();
        let before = positions(&ed, &ids);
        let zoom = ed.viewport().zoom();

        drag_group(&mut ed, ids[grab.index(ids.len())], delta);

        let after = positions(&ed, &ids);
        prop_assert_eq!(after.len(), before.len());
        let expected = delta / zoom;
        for (old, new) in before.iter().zip(&after) {
            prop_assert!(
                close(*new - *old, expected),
                "moved by {:?}, expected {:?}", *new - *old, expected
            );
        }
        prop_assert!(ed.session().is_idle());
        prop_assert_eq!(ed.selection(), ids.as_slice());
    }

    #[test]
    fn undo_restores_positions_exactly(
        xs in layout_strategy(),
        view in view_strategy(),
        delta in delta_strategy(),
    ) {
        let (zoom, offset) = view;
        let (mut ed, ids) = canvas(&xs, zoom, offset);
        ed.select_all();
        let before = positions(&ed, &ids);

        drag_group(&mut ed, ids[0], delta);
        if delta != Point::ZERO {
            let undone = ed.undo();
            prop_assert_eq!(undone.as_deref(), Some("move nodes"));
        }
        prop_assert_eq!(positions(&ed, &ids), before);
    }
}
