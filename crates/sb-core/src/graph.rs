//! The canvas graph: a flat node set plus directed connections.
//!
//! Backed by a `StableDiGraph` whose edges are the connections, so node
//! indices stay valid across removals. Insertion order is tracked separately
//! because stable-graph slots are recycled after deletion, and child grids
//! and saved documents both need a stable order.
//!
//! Invariant violations (duplicate ids, self loops, dangling endpoints,
//! duplicate ordered pairs) are silent no-ops: the caller gets `false` /
//! `None`, the graph is left untouched.

use crate::id::{ConnectionId, NodeId};
use crate::model::{Connection, Node, NodeKind, NodePatch};
use crate::geometry::Point;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Everything removed by a single `remove_node` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub node: Node,
    /// Connections that referenced the node, deleted in the same operation.
    pub connections: Vec<Connection>,
    /// Shots whose `scene_id` pointed at a removed scene-master.
    pub released: SmallVec<[NodeId; 4]>,
}

#[derive(Debug, Clone, Default)]
pub struct CanvasGraph {
    graph: StableDiGraph<Node, Connection>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<ConnectionId, EdgeIndex>,
    node_order: Vec<NodeId>,
    connection_order: Vec<ConnectionId>,
}

impl CanvasGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────

    /// Insert a node. Returns `false` if the id is already taken.
    ///
    /// A `scene_id` that does not name an existing scene-master is dropped
    /// so the hierarchy invariant always holds.
    pub fn add_node(&mut self, mut node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            log::debug!("add_node: duplicate id {:?} rejected", node.id);
            return false;
        }
        if let Some(scene) = node.scene_id
            && !self.accepts_scene_link(node.kind, scene)
        {
            log::warn!(
                "add_node: {:?} references invalid scene {:?}; link dropped",
                node.id,
                scene
            );
            node.scene_id = None;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(id);
        true
    }

    /// Apply a partial update. Returns `true` if any field changed.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        let Some(&idx) = self.node_index.get(&id) else {
            return false;
        };
        let kind = self.graph[idx].kind;
        let scene_link = match patch.scene_id {
            Some(Some(scene)) if !self.accepts_scene_link(kind, scene) || scene == id => {
                log::debug!("update_node: scene link {id:?} -> {scene:?} ignored");
                None
            }
            other => other,
        };

        let node = &mut self.graph[idx];
        let before = node.clone();
        if let Some(number) = patch.number {
            node.number = number;
        }
        if let Some(title) = patch.title {
            node.title = title;
        }
        if let Some(subtitle) = patch.subtitle {
            node.subtitle = subtitle;
        }
        if let Some(status) = patch.status {
            node.status = status;
        }
        if let Some(thumbnail) = patch.thumbnail {
            node.thumbnail = thumbnail;
        }
        if let Some(scene_id) = scene_link {
            node.scene_id = scene_id;
        }
        *node != before
    }

    /// Pure position update.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> bool {
        match self.node_index.get(&id) {
            Some(&idx) => {
                self.graph[idx].position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a node together with every connection that references it.
    ///
    /// The cascade set is computed before anything is mutated, so the graph
    /// never holds a connection to a missing node.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Removal> {
        let idx = *self.node_index.get(&id)?;

        let cascade: Vec<ConnectionId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        let released: SmallVec<[NodeId; 4]> = if self.graph[idx].is_scene_master() {
            self.children_of(id).into_iter().collect()
        } else {
            SmallVec::new()
        };

        let connections: Vec<Connection> = cascade
            .into_iter()
            .filter_map(|cid| self.remove_connection(cid))
            .collect();
        for child in &released {
            if let Some(&cidx) = self.node_index.get(child) {
                self.graph[cidx].scene_id = None;
            }
        }
        let node = self.graph.remove_node(idx)?;
        self.node_index.remove(&id);
        self.node_order.retain(|n| *n != id);

        log::debug!(
            "removed {:?} (+{} connections, {} children released)",
            id,
            connections.len(),
            released.len()
        );
        Some(Removal {
            node,
            connections,
            released,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().map(|id| &self.graph[self.node_index[id]])
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    /// Shots grouped under `scene_master_id`, in stable insertion order.
    pub fn children_of(&self, scene_master_id: NodeId) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.kind == NodeKind::Shot && n.scene_id == Some(scene_master_id))
            .map(|n| n.id)
            .collect()
    }

    fn accepts_scene_link(&self, kind: NodeKind, scene: NodeId) -> bool {
        kind == NodeKind::Shot && self.node(scene).is_some_and(Node::is_scene_master)
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Connect `source → target` with a freshly generated id.
    ///
    /// Returns `None` without touching the graph for self loops, missing
    /// endpoints, or an already-connected ordered pair.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: impl Into<String>,
    ) -> Option<ConnectionId> {
        if !self.can_connect(source, target) {
            return None;
        }
        let connection = Connection::new(ConnectionId::with_prefix("conn"), source, target, kind);
        let id = connection.id;
        self.insert_connection(connection).then_some(id)
    }

    /// Insert a connection with a caller-chosen id (hydration, undo).
    /// Same rules as `add_connection`, plus the id must be unused.
    pub fn insert_connection(&mut self, connection: Connection) -> bool {
        if self.edge_index.contains_key(&connection.id) {
            log::debug!("insert_connection: duplicate id {:?}", connection.id);
            return false;
        }
        if !self.can_connect(connection.source, connection.target) {
            return false;
        }
        let (Some(&s), Some(&t)) = (
            self.node_index.get(&connection.source),
            self.node_index.get(&connection.target),
        ) else {
            return false;
        };
        let id = connection.id;
        let eidx = self.graph.add_edge(s, t, connection);
        self.edge_index.insert(id, eidx);
        self.connection_order.push(id);
        true
    }

    fn can_connect(&self, source: NodeId, target: NodeId) -> bool {
        if source == target {
            log::debug!("connection {source:?} -> itself rejected");
            return false;
        }
        let (Some(&s), Some(&t)) = (self.node_index.get(&source), self.node_index.get(&target))
        else {
            log::debug!("connection {source:?} -> {target:?} has a missing endpoint");
            return false;
        };
        if self.graph.find_edge(s, t).is_some() {
            log::debug!("connection {source:?} -> {target:?} already exists");
            return false;
        }
        true
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let eidx = self.edge_index.remove(&id)?;
        self.connection_order.retain(|c| *c != id);
        self.graph.remove_edge(eidx)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.edge_index.get(&id).map(|e| &self.graph[*e])
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.connection_order
            .iter()
            .map(|id| &self.graph[self.edge_index[id]])
    }

    pub fn connection_count(&self) -> usize {
        self.connection_order.len()
    }

    pub fn find_connection(&self, source: NodeId, target: NodeId) -> Option<&Connection> {
        let s = *self.node_index.get(&source)?;
        let t = *self.node_index.get(&target)?;
        self.graph.find_edge(s, t).map(|e| &self.graph[e])
    }

    /// Ids of every connection touching `node`, in insertion order.
    pub fn connections_of(&self, node: NodeId) -> Vec<ConnectionId> {
        self.connections()
            .filter(|c| c.touches(node))
            .map(|c| c.id)
            .collect()
    }

    // ─── Mutation surface ────────────────────────────────────────────────

    /// Apply a mutation. Every change to the graph, whether from a gesture
    /// or an external edit, goes through here.
    pub fn apply(&mut self, mutation: CanvasMutation) -> MutationOutcome {
        match mutation {
            CanvasMutation::AddNode(node) => {
                let id = node.id;
                if self.add_node(*node) {
                    MutationOutcome::NodeAdded(id)
                } else {
                    MutationOutcome::Unchanged
                }
            }
            CanvasMutation::UpdateNode { id, patch } => {
                if self.update_node(id, patch) {
                    MutationOutcome::NodeUpdated(id)
                } else {
                    MutationOutcome::Unchanged
                }
            }
            CanvasMutation::RemoveNode { id } => match self.remove_node(id) {
                Some(removal) => MutationOutcome::NodeRemoved(Box::new(removal)),
                None => MutationOutcome::Unchanged,
            },
            CanvasMutation::MoveNode { id, position } => {
                if self.move_node(id, position) {
                    MutationOutcome::NodeMoved(id)
                } else {
                    MutationOutcome::Unchanged
                }
            }
            CanvasMutation::AddConnection {
                source,
                target,
                kind,
            } => match self.add_connection(source, target, kind) {
                Some(id) => MutationOutcome::ConnectionAdded(id),
                None => MutationOutcome::Unchanged,
            },
            CanvasMutation::RemoveConnection { id } => match self.remove_connection(id) {
                Some(connection) => MutationOutcome::ConnectionRemoved(connection),
                None => MutationOutcome::Unchanged,
            },
        }
    }
}

/// A mutation that can be applied to the canvas graph.
#[derive(Debug, Clone)]
pub enum CanvasMutation {
    AddNode(Box<Node>),
    UpdateNode { id: NodeId, patch: NodePatch },
    RemoveNode { id: NodeId },
    MoveNode { id: NodeId, position: Point },
    AddConnection {
        source: NodeId,
        target: NodeId,
        kind: String,
    },
    RemoveConnection { id: ConnectionId },
}

/// What a mutation actually did.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Unchanged,
    NodeAdded(NodeId),
    NodeUpdated(NodeId),
    NodeRemoved(Box<Removal>),
    NodeMoved(NodeId),
    ConnectionAdded(ConnectionId),
    ConnectionRemoved(Connection),
}

impl MutationOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, MutationOutcome::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShotStatus;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn three_shots() -> CanvasGraph {
        let mut g = CanvasGraph::new();
        for (n, x) in [("g_a", 0.0), ("g_b", 300.0), ("g_c", 600.0)] {
            assert!(g.add_node(Node::shot(id(n), Point::new(x, 0.0))));
        }
        g
    }

    fn assert_no_dangling(g: &CanvasGraph) {
        for c in g.connections() {
            assert!(g.contains_node(c.source), "dangling source in {c:?}");
            assert!(g.contains_node(c.target), "dangling target in {c:?}");
        }
    }

    #[test]
    fn duplicate_node_id_rejected() {
        let mut g = three_shots();
        assert!(!g.add_node(Node::shot(id("g_a"), Point::new(9.0, 9.0))));
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node(id("g_a")).unwrap().position, Point::ZERO);
    }

    #[test]
    fn connection_dedup_and_self_loop() {
        let mut g = three_shots();
        assert!(g.add_connection(id("g_a"), id("g_b"), "sequence").is_some());
        assert!(g.add_connection(id("g_a"), id("g_b"), "sequence").is_none());
        assert!(g.add_connection(id("g_a"), id("g_a"), "sequence").is_none());
        assert_eq!(g.connection_count(), 1);
        // Reverse direction is a distinct ordered pair.
        assert!(g.add_connection(id("g_b"), id("g_a"), "sequence").is_some());
        assert_eq!(g.connection_count(), 2);
    }

    #[test]
    fn connection_to_missing_node_is_noop() {
        let mut g = three_shots();
        assert!(g.add_connection(id("g_a"), id("g_missing"), "sequence").is_none());
        assert_eq!(g.connection_count(), 0);
    }

    #[test]
    fn cascade_on_delete_removes_exactly_incident_connections() {
        let mut g = three_shots();
        let ab = g.add_connection(id("g_a"), id("g_b"), "sequence").unwrap();
        let cb = g.add_connection(id("g_c"), id("g_b"), "sequence").unwrap();
        let ac = g.add_connection(id("g_a"), id("g_c"), "sequence").unwrap();

        let removal = g.remove_node(id("g_b")).unwrap();
        let mut removed: Vec<_> = removal.connections.iter().map(|c| c.id).collect();
        removed.sort_by_key(|c| c.as_str().to_string());
        let mut expected = vec![ab, cb];
        expected.sort_by_key(|c| c.as_str().to_string());
        assert_eq!(removed, expected);
        assert!(g.connection(ac).is_some());
        assert_eq!(g.connection_count(), 1);
        assert_no_dangling(&g);
    }

    #[test]
    fn no_dangling_after_mixed_mutations() {
        let mut g = three_shots();
        g.add_node(Node::shot(id("g_d"), Point::ZERO));
        let pairs = [("g_a", "g_b"), ("g_b", "g_c"), ("g_c", "g_d"), ("g_d", "g_a")];
        for (s, t) in pairs {
            g.add_connection(id(s), id(t), "sequence");
        }
        g.remove_node(id("g_c"));
        g.add_connection(id("g_c"), id("g_a"), "sequence");
        g.remove_node(id("g_a"));
        g.add_node(Node::shot(id("g_a"), Point::ZERO));
        g.add_connection(id("g_a"), id("g_b"), "sequence");
        assert_no_dangling(&g);
        assert_eq!(g.connection_count(), 1);
    }

    #[test]
    fn children_in_insertion_order() {
        let mut g = CanvasGraph::new();
        g.add_node(Node::scene_master(id("g_s"), Point::ZERO));
        for n in ["g_s3", "g_s1", "g_s2"] {
            g.add_node(Node::shot(id(n), Point::ZERO).in_scene(id("g_s")));
        }
        g.add_node(Node::shot(id("g_loose"), Point::ZERO));
        assert_eq!(g.children_of(id("g_s")), vec![id("g_s3"), id("g_s1"), id("g_s2")]);
    }

    #[test]
    fn invalid_scene_link_is_stripped() {
        let mut g = three_shots();
        // g_a is a shot, not a scene-master.
        g.add_node(Node::shot(id("g_orphan"), Point::ZERO).in_scene(id("g_a")));
        assert_eq!(g.node(id("g_orphan")).unwrap().scene_id, None);
        g.add_node(Node::shot(id("g_orphan2"), Point::ZERO).in_scene(id("g_nowhere")));
        assert_eq!(g.node(id("g_orphan2")).unwrap().scene_id, None);
    }

    #[test]
    fn removing_scene_master_releases_children() {
        let mut g = CanvasGraph::new();
        g.add_node(Node::scene_master(id("g_scene"), Point::ZERO));
        g.add_node(Node::shot(id("g_kid"), Point::ZERO).in_scene(id("g_scene")));
        let removal = g.remove_node(id("g_scene")).unwrap();
        assert_eq!(removal.released.as_slice(), &[id("g_kid")]);
        assert_eq!(g.node(id("g_kid")).unwrap().scene_id, None);
    }

    #[test]
    fn update_node_applies_patch() {
        let mut g = three_shots();
        assert!(g.update_node(id("g_a"), NodePatch::status(ShotStatus::Approved)));
        assert!(!g.update_node(id("g_a"), NodePatch::status(ShotStatus::Approved)));
        assert_eq!(g.node(id("g_a")).unwrap().status, ShotStatus::Approved);
        // Linking a shot to another shot is refused.
        let patch = NodePatch {
            scene_id: Some(Some(id("g_b"))),
            ..Default::default()
        };
        assert!(!g.update_node(id("g_a"), patch));
    }

    #[test]
    fn order_survives_slot_reuse() {
        let mut g = three_shots();
        g.remove_node(id("g_a"));
        g.add_node(Node::shot(id("g_z"), Point::ZERO));
        let ids: Vec<_> = g.nodes().map(|n| n.id).collect();
        assert_eq!(ids, vec![id("g_b"), id("g_c"), id("g_z")]);
    }

    #[test]
    fn apply_reports_outcomes() {
        let mut g = three_shots();
        let out = g.apply(CanvasMutation::MoveNode {
            id: id("g_a"),
            position: Point::new(5.0, 6.0),
        });
        assert_eq!(out, MutationOutcome::NodeMoved(id("g_a")));
        let out = g.apply(CanvasMutation::AddConnection {
            source: id("g_a"),
            target: id("g_a"),
            kind: "sequence".into(),
        });
        assert!(!out.changed());
    }
}
