//! Persisted canvas document: the flat wire shape exchanged with the
//! document store, and lossless conversion to/from the in-memory graph.
//!
//! Positions are flattened (`position_x`, `position_y`) and the node kind is
//! carried in a `type` field, matching the store's schema.

use crate::geometry::{Point, Viewport};
use crate::graph::CanvasGraph;
use crate::id::{ConnectionId, NodeId};
use crate::model::{Connection, DEFAULT_CONNECTION_KIND, Node, NodeKind, NodePatch, ShotStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasDocument {
    #[serde(default)]
    pub viewport: ViewportDoc,
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
    #[serde(default)]
    pub connections: Vec<ConnectionDoc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportDoc {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for ViewportDoc {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position_x: f64,
    pub position_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<NodeId>,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub status: ShotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDoc {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type", default = "default_connection_kind")]
    pub kind: String,
}

fn default_connection_kind() -> String {
    DEFAULT_CONNECTION_KIND.to_string()
}

// ─── Viewport ────────────────────────────────────────────────────────────

impl ViewportDoc {
    pub fn from_viewport(viewport: &Viewport) -> Self {
        Self {
            x: viewport.offset.x,
            y: viewport.offset.y,
            zoom: viewport.zoom(),
        }
    }

    /// Apply onto a viewport, keeping its zoom limits.
    pub fn apply_to(&self, viewport: &mut Viewport) {
        viewport.pan_to(Point::new(self.x, self.y));
        viewport.set_zoom(self.zoom);
    }
}

// ─── Nodes & connections ────────────────────────────────────────────────

impl From<&Node> for NodeDoc {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            kind: node.kind,
            position_x: node.position.x,
            position_y: node.position.y,
            scene_id: node.scene_id,
            number: node.number.clone(),
            title: node.title.clone(),
            subtitle: node.subtitle.clone(),
            status: node.status,
            image_url: node.thumbnail.clone(),
        }
    }
}

impl From<NodeDoc> for Node {
    fn from(doc: NodeDoc) -> Self {
        Self {
            id: doc.id,
            kind: doc.kind,
            position: Point::new(doc.position_x, doc.position_y),
            scene_id: doc.scene_id,
            number: doc.number,
            title: doc.title,
            subtitle: doc.subtitle,
            status: doc.status,
            thumbnail: doc.image_url,
        }
    }
}

impl From<&Connection> for ConnectionDoc {
    fn from(c: &Connection) -> Self {
        Self {
            id: c.id,
            source: c.source,
            target: c.target,
            kind: c.kind.clone(),
        }
    }
}

impl From<ConnectionDoc> for Connection {
    fn from(doc: ConnectionDoc) -> Self {
        Connection::new(doc.id, doc.source, doc.target, doc.kind)
    }
}

// ─── Graph ⇄ document ────────────────────────────────────────────────────

/// Serialize the graph and viewport into a document, in insertion order.
pub fn to_document(graph: &CanvasGraph, viewport: &Viewport) -> CanvasDocument {
    CanvasDocument {
        viewport: ViewportDoc::from_viewport(viewport),
        nodes: graph.nodes().map(NodeDoc::from).collect(),
        connections: graph.connections().map(ConnectionDoc::from).collect(),
    }
}

/// Build a graph from a document and apply its viewport onto `viewport`.
///
/// The document's node order is preserved even when a child precedes its
/// scene-master. Records that break graph invariants (duplicate ids,
/// dangling endpoints) are dropped and logged.
pub fn from_document(doc: CanvasDocument, viewport: &mut Viewport) -> CanvasGraph {
    let mut graph = CanvasGraph::new();
    let masters: HashSet<NodeId> = doc
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::SceneMaster)
        .map(|n| n.id)
        .collect();

    // Scene links are attached after every node exists, since a child may
    // precede its scene-master in the document.
    let mut links = Vec::new();
    for node_doc in doc.nodes {
        let mut node = Node::from(node_doc);
        if let Some(scene) = node.scene_id.take() {
            if masters.contains(&scene) {
                links.push((node.id, scene));
            } else {
                log::warn!("from_document: {:?} has dangling scene {:?}", node.id, scene);
            }
        }
        if !graph.add_node(node) {
            log::warn!("from_document: duplicate node dropped");
        }
    }
    for (child, scene) in links {
        graph.update_node(
            child,
            NodePatch {
                scene_id: Some(Some(scene)),
                ..Default::default()
            },
        );
    }

    for conn_doc in doc.connections {
        let id = conn_doc.id;
        if !graph.insert_connection(conn_doc.into()) {
            log::warn!("from_document: connection {id:?} dropped");
        }
    }

    doc.viewport.apply_to(viewport);
    log::info!(
        "hydrated canvas: {} nodes, {} connections",
        graph.node_count(),
        graph.connection_count()
    );
    graph
}
