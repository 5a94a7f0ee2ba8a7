//! Canvas data model: shot and scene-master nodes, directed connections.
//!
//! Nodes form a flat set. A shot may point at the scene-master that groups it
//! through `scene_id`; that link is a lookup key, not ownership. Connections
//! record narrative/sequence order between two node ids.

use crate::geometry::Point;
use crate::id::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};

/// Connection tag used when the caller doesn't name one.
pub const DEFAULT_CONNECTION_KIND: &str = "sequence";

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Leaf node: a single shot.
    Shot,
    /// Container that groups child shots into a collapsible grid.
    SceneMaster,
}

/// Production status of a shot. Cosmetic only: it colours the footer strip
/// and never takes part in graph invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Approved,
    Revision,
}

/// A visual unit on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    /// World-space top-left corner.
    pub position: Point,
    /// Owning scene-master, for shots grouped into a scene.
    pub scene_id: Option<NodeId>,
    pub number: String,
    pub title: String,
    pub subtitle: String,
    pub status: ShotStatus,
    pub thumbnail: Option<String>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, position: Point) -> Self {
        Self {
            id,
            kind,
            position,
            scene_id: None,
            number: String::new(),
            title: String::new(),
            subtitle: String::new(),
            status: ShotStatus::default(),
            thumbnail: None,
        }
    }

    pub fn shot(id: NodeId, position: Point) -> Self {
        Self::new(id, NodeKind::Shot, position)
    }

    pub fn scene_master(id: NodeId, position: Point) -> Self {
        Self::new(id, NodeKind::SceneMaster, position)
    }

    /// Builder-style title setter.
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder-style scene link.
    pub fn in_scene(mut self, scene_id: NodeId) -> Self {
        self.scene_id = Some(scene_id);
        self
    }

    pub fn is_scene_master(&self) -> bool {
        self.kind == NodeKind::SceneMaster
    }

    /// A shot drawn inside its scene-master's grid rather than free-standing.
    pub fn is_contained(&self) -> bool {
        self.kind == NodeKind::Shot && self.scene_id.is_some()
    }
}

/// Partial update for the display fields of a node.
///
/// `None` leaves a field untouched. `scene_id: Some(None)` detaches a shot
/// from its scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub number: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub status: Option<ShotStatus>,
    pub thumbnail: Option<Option<String>>,
    pub scene_id: Option<Option<NodeId>>,
}

impl NodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn status(status: ShotStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ─── Connections ─────────────────────────────────────────────────────────

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    /// Semantic tag such as `"sequence"`.
    pub kind: String,
}

impl Connection {
    pub fn new(id: ConnectionId, source: NodeId, target: NodeId, kind: impl Into<String>) -> Self {
        Self {
            id,
            source,
            target,
            kind: kind.into(),
        }
    }

    /// Whether either endpoint is `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}
