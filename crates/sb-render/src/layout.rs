//! Node footprints and grid placement in world space.
//!
//! A node's box is derived from its kind, position and (for scene-masters)
//! the expanded flag. Contained shots have no free-standing box: they occupy
//! a slot of their scene-master's grid when it is expanded, and collapse onto
//! the scene-master's own box otherwise.

use sb_core::{Bounds, CanvasConfig, CanvasGraph, Node, NodeId, NodeKind, Viewport};
use std::collections::HashSet;

/// Read-only view of everything that determines where nodes sit.
#[derive(Clone, Copy)]
pub struct CanvasLayout<'a> {
    pub graph: &'a CanvasGraph,
    pub expanded: &'a HashSet<NodeId>,
    pub config: &'a CanvasConfig,
}

impl<'a> CanvasLayout<'a> {
    pub fn new(
        graph: &'a CanvasGraph,
        expanded: &'a HashSet<NodeId>,
        config: &'a CanvasConfig,
    ) -> Self {
        Self {
            graph,
            expanded,
            config,
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Footprint of a free-standing node at its own position.
    pub fn footprint(&self, node: &Node) -> Bounds {
        let (w, h) = match node.kind {
            NodeKind::Shot => (self.config.shot.width, self.config.shot.height),
            NodeKind::SceneMaster if self.is_expanded(node.id) => {
                self.config.scene.expanded_size()
            }
            NodeKind::SceneMaster => (
                self.config.scene.collapsed_width,
                self.config.scene.collapsed_height,
            ),
        };
        Bounds::from_origin(node.position, w, h)
    }

    /// World-space box of slot `index` inside an expanded scene-master box.
    pub fn slot_bounds(&self, scene: &Bounds, index: usize) -> Bounds {
        let g = &self.config.scene;
        let cols = g.grid_cols.max(1);
        let (col, row) = ((index % cols) as f64, (index / cols) as f64);
        Bounds::new(
            scene.x + g.padding + col * (g.slot_width + g.slot_gap),
            scene.y + g.header_height + g.padding + row * (g.slot_height + g.slot_gap),
            g.slot_width,
            g.slot_height,
        )
    }

    /// Nodes drawn on their own, in paint order (contained shots excluded).
    pub fn free_nodes(&self) -> impl Iterator<Item = &'a Node> + 'a {
        self.graph.nodes().filter(|n| !n.is_contained())
    }

    /// Where a node currently shows up, in world space.
    ///
    /// Contained shots resolve to their grid slot (owner expanded, slot in
    /// range) or to the owner's box.
    pub fn world_bounds(&self, id: NodeId) -> Option<Bounds> {
        let node = self.graph.node(id)?;
        let Some(scene_id) = node.scene_id.filter(|_| node.is_contained()) else {
            return Some(self.footprint(node));
        };
        let owner = self.graph.node(scene_id)?;
        let owner_box = self.footprint(owner);
        if self.is_expanded(scene_id) {
            let slot = self
                .graph
                .children_of(scene_id)
                .iter()
                .position(|c| *c == id)
                .filter(|i| *i < self.config.scene.slot_count());
            if let Some(slot) = slot {
                return Some(self.slot_bounds(&owner_box, slot));
            }
        }
        Some(owner_box)
    }

    pub fn screen_bounds(&self, id: NodeId, viewport: &Viewport) -> Option<Bounds> {
        self.world_bounds(id).map(|b| viewport.bounds_to_screen(&b))
    }

    /// Close control in the top-right corner of a node box (world space).
    pub fn close_control(&self, node_box: &Bounds) -> Bounds {
        let s = &self.config.shot;
        Bounds::new(
            node_box.x + node_box.width - s.control_inset - s.control_size,
            node_box.y + s.control_inset,
            s.control_size,
            s.control_size,
        )
    }

    /// Status strip along the bottom edge of a shot box (world space).
    pub fn footer_strip(&self, node_box: &Bounds) -> Bounds {
        let h = self.config.shot.footer_height.min(node_box.height);
        Bounds::new(node_box.x, node_box.y + node_box.height - h, node_box.width, h)
    }
}
