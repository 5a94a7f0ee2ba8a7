//! Change notifications.
//!
//! The editor owns its state outright; renderers and side panels learn about
//! changes by subscribing here instead of relying on a UI framework's
//! re-render scheduling.

use crate::session::SessionKind;
use sb_core::{ConnectionId, MutationOutcome, NodeId, Point};
use sb_render::NodeControl;

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Emitted on every selection change. Drives the node edit side panel.
    SelectionChanged(Vec<NodeId>),
    /// A mutation changed the graph.
    Mutated(MutationOutcome),
    /// A drag gesture committed new positions.
    NodesMoved(Vec<NodeId>),
    /// The whole graph was replaced (hydration, undo, redo).
    GraphReplaced,
    ViewportChanged { offset: Point, zoom: f64 },
    SessionChanged(SessionKind),
    ExpansionToggled { id: NodeId, expanded: bool },
    /// A connection's hit stroke was clicked; the host confirms deletion.
    ConnectionClicked(ConnectionId),
    /// A nested control inside a node was pressed.
    ControlPressed { node: NodeId, control: NodeControl },
    /// Dependent UI (node edit panel) should close.
    PanelsDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&CanvasEvent)>;

/// Synchronous observer list. Events are delivered in emission order, on
/// the thread that mutates the canvas.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&CanvasEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    pub fn emit(&mut self, event: CanvasEvent) {
        log::trace!("event: {event:?}");
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
