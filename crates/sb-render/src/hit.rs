//! Hit testing: screen point → what the pointer is over.
//!
//! Walks free nodes front-to-back (last painted = topmost). Nested
//! interactive controls are reported as `Hit::Control` before the node body,
//! so the dispatcher can refuse to start a drag or selection for them.
//! Connections sit beneath every node.

use crate::connections::{ConnectionVisual, hit_test_connections};
use crate::layout::CanvasLayout;
use sb_core::{ConnectionId, NodeId, NodeKind, Point, Viewport};

/// Interactive controls nested inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeControl {
    /// Close icon in the top-right corner.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A nested control; never starts drag or selection.
    Control { node: NodeId, control: NodeControl },
    /// A grid slot of an expanded scene-master. `child` is `None` for an
    /// empty placeholder.
    Slot {
        scene: NodeId,
        index: usize,
        child: Option<NodeId>,
    },
    /// The body of a free-standing node.
    Node(NodeId),
    /// The widened hit stroke of a connection.
    Connection(ConnectionId),
    Background,
}

impl Hit {
    /// Whether the pointer landed on a nested interactive control.
    pub fn is_interactive_control(&self) -> bool {
        matches!(self, Hit::Control { .. })
    }

    /// The node a pointer-down would act on: the child for a filled slot,
    /// the scene-master for an empty one, the node itself for a body hit.
    pub fn target_node(&self) -> Option<NodeId> {
        match *self {
            Hit::Node(id) => Some(id),
            Hit::Slot { child: Some(c), .. } => Some(c),
            Hit::Slot { scene, child: None, .. } => Some(scene),
            Hit::Control { .. } | Hit::Connection(_) | Hit::Background => None,
        }
    }
}

/// Find what lies under `screen`.
///
/// `connections` are the visuals of the current frame; pass an empty slice to
/// ignore connections.
pub fn hit_test(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    connections: &[ConnectionVisual],
    screen: Point,
) -> Hit {
    let world = viewport.screen_to_world(screen);
    let nodes: Vec<_> = layout.free_nodes().collect();

    for node in nodes.iter().rev() {
        let node_box = layout.footprint(node);
        if !node_box.contains(world) {
            continue;
        }
        if layout.close_control(&node_box).contains(world) {
            return Hit::Control {
                node: node.id,
                control: NodeControl::Close,
            };
        }
        if node.kind == NodeKind::SceneMaster && layout.is_expanded(node.id) {
            let slots = layout.config.scene.slot_count();
            if let Some(index) = (0..slots).find(|i| layout.slot_bounds(&node_box, *i).contains(world)) {
                let child = layout.graph.children_of(node.id).get(index).copied();
                return Hit::Slot {
                    scene: node.id,
                    index,
                    child,
                };
            }
        }
        return Hit::Node(node.id);
    }

    match hit_test_connections(connections, screen) {
        Some(id) => Hit::Connection(id),
        None => Hit::Background,
    }
}
