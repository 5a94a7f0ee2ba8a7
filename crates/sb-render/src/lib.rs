//! Read-side projections of the canvas: node visuals, connection curves,
//! draft preview, and hit testing. Nothing here mutates the graph.

pub mod connections;
pub mod hit;
pub mod layout;
pub mod nodes;

pub use connections::{ConnectionVisual, DraftPreview};
pub use hit::{Hit, NodeControl, hit_test};
pub use layout::CanvasLayout;
pub use nodes::{NodeVisual, SceneVisual, ShotVisual, SlotVisual};

use sb_core::{NodeId, Point, Viewport};

/// Everything a host needs to paint one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Painted first, beneath the nodes.
    pub connections: Vec<ConnectionVisual>,
    pub nodes: Vec<NodeVisual>,
    /// Present only while a connection is being drawn.
    pub draft: Option<DraftPreview>,
}

/// Project the current canvas state into a frame.
///
/// `draft` is the source node and world-space pointer of an in-progress
/// connection, if any.
pub fn render_frame(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    selected: &[NodeId],
    draft: Option<(NodeId, Point)>,
) -> Frame {
    let frame = Frame {
        connections: connections::connection_visuals(layout, viewport),
        nodes: nodes::node_visuals(layout, viewport, selected),
        draft: draft.and_then(|(source, pointer)| {
            connections::draft_preview(layout, viewport, source, pointer)
        }),
    };
    log::trace!(
        "frame: {} nodes, {} connections, draft={}",
        frame.nodes.len(),
        frame.connections.len(),
        frame.draft.is_some()
    );
    frame
}
