//! Node renderers: project shots and scene-masters into screen-space visuals.
//!
//! The output is a display list a host paints however it likes. Selection
//! is a flag on the visual (drawn as a border); it never changes a box size.

use crate::layout::CanvasLayout;
use peniko::Color;
use sb_core::{Bounds, Node, NodeId, NodeKind, ShotStatus, Viewport};

/// Footer strip colour for each production status.
pub fn status_color(status: ShotStatus) -> Color {
    match status {
        ShotStatus::Pending => Color::from_rgb8(0x9C, 0xA3, 0xAF),
        ShotStatus::Processing => Color::from_rgb8(0x3B, 0x82, 0xF6),
        ShotStatus::Completed => Color::from_rgb8(0x22, 0xC5, 0x5E),
        ShotStatus::Approved => Color::from_rgb8(0xA8, 0x55, 0xF7),
        ShotStatus::Revision => Color::from_rgb8(0xF9, 0x73, 0x16),
    }
}

#[derive(Debug, Clone)]
pub struct ShotVisual {
    pub id: NodeId,
    pub bounds: Bounds,
    pub number: String,
    pub title: String,
    pub subtitle: String,
    pub thumbnail: Option<String>,
    pub status: ShotStatus,
    pub footer: Bounds,
    pub footer_color: Color,
    pub close: Bounds,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub enum SlotVisual {
    Filled {
        child: NodeId,
        bounds: Bounds,
        number: String,
        title: String,
        thumbnail: Option<String>,
        status_color: Color,
        selected: bool,
    },
    Empty {
        bounds: Bounds,
    },
}

impl SlotVisual {
    pub fn child(&self) -> Option<NodeId> {
        match self {
            SlotVisual::Filled { child, .. } => Some(*child),
            SlotVisual::Empty { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneVisual {
    pub id: NodeId,
    pub bounds: Bounds,
    pub number: String,
    pub title: String,
    /// Every child, including any beyond the grid's capacity.
    pub child_count: usize,
    pub expanded: bool,
    pub close: Bounds,
    pub selected: bool,
    /// Exactly `grid_cols * grid_rows` entries when expanded, empty otherwise.
    pub slots: Vec<SlotVisual>,
}

#[derive(Debug, Clone)]
pub enum NodeVisual {
    Shot(ShotVisual),
    Scene(SceneVisual),
}

impl NodeVisual {
    pub fn id(&self) -> NodeId {
        match self {
            NodeVisual::Shot(s) => s.id,
            NodeVisual::Scene(s) => s.id,
        }
    }

    pub fn bounds(&self) -> Bounds {
        match self {
            NodeVisual::Shot(s) => s.bounds,
            NodeVisual::Scene(s) => s.bounds,
        }
    }
}

/// Visuals for every free-standing node, in paint order.
pub fn node_visuals(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    selected: &[NodeId],
) -> Vec<NodeVisual> {
    layout
        .free_nodes()
        .map(|node| match node.kind {
            NodeKind::Shot => NodeVisual::Shot(shot_visual(layout, viewport, node, selected)),
            NodeKind::SceneMaster => {
                NodeVisual::Scene(scene_visual(layout, viewport, node, selected))
            }
        })
        .collect()
}

fn shot_visual(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    node: &Node,
    selected: &[NodeId],
) -> ShotVisual {
    let world = layout.footprint(node);
    ShotVisual {
        id: node.id,
        bounds: viewport.bounds_to_screen(&world),
        number: node.number.clone(),
        title: node.title.clone(),
        subtitle: node.subtitle.clone(),
        thumbnail: node.thumbnail.clone(),
        status: node.status,
        footer: viewport.bounds_to_screen(&layout.footer_strip(&world)),
        footer_color: status_color(node.status),
        close: viewport.bounds_to_screen(&layout.close_control(&world)),
        selected: selected.contains(&node.id),
    }
}

fn scene_visual(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    node: &Node,
    selected: &[NodeId],
) -> SceneVisual {
    let world = layout.footprint(node);
    let children = layout.graph.children_of(node.id);
    let expanded = layout.is_expanded(node.id);

    let slots = if expanded {
        (0..layout.config.scene.slot_count())
            .map(|i| {
                let bounds = viewport.bounds_to_screen(&layout.slot_bounds(&world, i));
                match children.get(i).and_then(|c| layout.graph.node(*c)) {
                    Some(child) => SlotVisual::Filled {
                        child: child.id,
                        bounds,
                        number: child.number.clone(),
                        title: child.title.clone(),
                        thumbnail: child.thumbnail.clone(),
                        status_color: status_color(child.status),
                        selected: selected.contains(&child.id),
                    },
                    None => SlotVisual::Empty { bounds },
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    SceneVisual {
        id: node.id,
        bounds: viewport.bounds_to_screen(&world),
        number: node.number.clone(),
        title: node.title.clone(),
        child_count: children.len(),
        expanded,
        close: viewport.bounds_to_screen(&layout.close_control(&world)),
        selected: selected.contains(&node.id),
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::{CanvasConfig, CanvasGraph, Point};
    use std::collections::HashSet;

    fn scene_graph() -> CanvasGraph {
        let mut g = CanvasGraph::new();
        g.add_node(Node::scene_master(NodeId::intern("nv_scene"), Point::ZERO));
        for name in ["nv_a", "nv_b", "nv_c"] {
            g.add_node(
                Node::shot(NodeId::intern(name), Point::ZERO)
                    .titled(name)
                    .in_scene(NodeId::intern("nv_scene")),
            );
        }
        g.add_node(Node::shot(NodeId::intern("nv_free"), Point::new(500.0, 0.0)));
        g
    }

    fn scene_of(visuals: &[NodeVisual]) -> &SceneVisual {
        visuals
            .iter()
            .find_map(|v| match v {
                NodeVisual::Scene(s) => Some(s),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn contained_shots_are_not_free_standing() {
        let g = scene_graph();
        let cfg = CanvasConfig::default();
        let expanded = HashSet::new();
        let visuals = node_visuals(&CanvasLayout::new(&g, &expanded, &cfg), &Viewport::default(), &[]);
        let ids: Vec<_> = visuals.iter().map(NodeVisual::id).collect();
        assert_eq!(ids, vec![NodeId::intern("nv_scene"), NodeId::intern("nv_free")]);
    }

    #[test]
    fn expanded_scene_shows_filled_then_empty_slots() {
        let g = scene_graph();
        let cfg = CanvasConfig::default();
        let expanded: HashSet<_> = [NodeId::intern("nv_scene")].into_iter().collect();
        let visuals = node_visuals(
            &CanvasLayout::new(&g, &expanded, &cfg),
            &Viewport::default(),
            &[NodeId::intern("nv_b")],
        );
        let scene = scene_of(&visuals);
        assert_eq!(scene.slots.len(), 25);
        let filled: Vec<_> = scene.slots.iter().filter_map(SlotVisual::child).collect();
        assert_eq!(
            filled,
            vec![NodeId::intern("nv_a"), NodeId::intern("nv_b"), NodeId::intern("nv_c")]
        );
        assert!(matches!(scene.slots[1], SlotVisual::Filled { selected: true, .. }));
        assert!(!scene.selected);
    }

    #[test]
    fn collapsed_scene_reports_count_without_slots() {
        let g = scene_graph();
        let cfg = CanvasConfig::default();
        let expanded = HashSet::new();
        let visuals = node_visuals(&CanvasLayout::new(&g, &expanded, &cfg), &Viewport::default(), &[]);
        let scene = scene_of(&visuals);
        assert_eq!(scene.child_count, 3);
        assert!(scene.slots.is_empty());
        assert_eq!(scene.bounds.width, cfg.scene.collapsed_width);
    }

    #[test]
    fn selection_does_not_resize() {
        let g = scene_graph();
        let cfg = CanvasConfig::default();
        let expanded = HashSet::new();
        let layout = CanvasLayout::new(&g, &expanded, &cfg);
        let plain = node_visuals(&layout, &Viewport::default(), &[]);
        let picked = node_visuals(&layout, &Viewport::default(), &[NodeId::intern("nv_free")]);
        assert_eq!(plain[1].bounds(), picked[1].bounds());
        assert!(matches!(&picked[1], NodeVisual::Shot(s) if s.selected));
    }

    #[test]
    fn zoom_scales_screen_boxes() {
        let g = scene_graph();
        let cfg = CanvasConfig::default();
        let expanded = HashSet::new();
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        let visuals = node_visuals(&CanvasLayout::new(&g, &expanded, &cfg), &vp, &[]);
        let NodeVisual::Shot(shot) = &visuals[1] else {
            panic!("expected shot");
        };
        assert_eq!(shot.bounds.width, cfg.shot.width * 2.0);
        assert_eq!(shot.bounds.x, 1000.0);
        assert_eq!(shot.footer_color.components, status_color(ShotStatus::Pending).components);
    }
}
