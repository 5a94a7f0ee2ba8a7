//! The single active interaction session.

use sb_core::{NodeId, Point};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Idle,
    /// Moving the selection as a rigid group.
    Dragging {
        start_pointer_world: Point,
        /// Every dragged node with its position at gesture start.
        origins: Vec<(NodeId, Point)>,
    },
    /// Panning, anchored to the initial grab point.
    Panning {
        start_pointer_screen: Point,
        start_offset: Point,
    },
    /// Drawing a connection out of `source`.
    ConnectingDraft {
        source: NodeId,
        /// Live pointer in world space, for the preview curve only.
        mouse_position: Point,
    },
}

/// Discriminant of `Session`, for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Idle,
    Dragging,
    Panning,
    ConnectingDraft,
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Idle => SessionKind::Idle,
            Session::Dragging { .. } => SessionKind::Dragging,
            Session::Panning { .. } => SessionKind::Panning,
            Session::ConnectingDraft { .. } => SessionKind::ConnectingDraft,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    /// Whether the session holds a reference to `id`.
    pub fn references(&self, id: NodeId) -> bool {
        match self {
            Session::Dragging { origins, .. } => origins.iter().any(|(n, _)| *n == id),
            Session::ConnectingDraft { source, .. } => *source == id,
            Session::Idle | Session::Panning { .. } => false,
        }
    }

    /// Source node and pointer of an in-progress connection.
    pub fn draft(&self) -> Option<(NodeId, Point)> {
        match self {
            Session::ConnectingDraft {
                source,
                mouse_position,
            } => Some((*source, *mouse_position)),
            _ => None,
        }
    }
}
