//! Connection renderer: derived anchors, S-curves, hit testing, and the
//! live draft preview.
//!
//! Anchors are recomputed from current node boxes on every frame, so curves
//! follow dragged nodes without any bookkeeping. Everything here is in
//! screen space.

use crate::layout::CanvasLayout;
use kurbo::{BezPath, CubicBez, ParamCurveNearest};
use sb_core::{ConnectionId, NodeId, Point, Viewport};

/// Curve accuracy used for nearest-point queries, in pixels.
const NEAREST_ACCURACY: f64 = 0.1;

fn kp(p: Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

/// Horizontal S-curve from `start` to `end`.
///
/// The control offset is half the horizontal distance, capped at
/// `max_offset`, so very close nodes get a near-straight line and far nodes
/// don't get exaggerated loops.
pub fn s_curve(start: Point, end: Point, max_offset: f64) -> CubicBez {
    let offset = ((end.x - start.x).abs() * 0.5).min(max_offset.max(0.0));
    CubicBez::new(
        kp(start),
        kp(Point::new(start.x + offset, start.y)),
        kp(Point::new(end.x - offset, end.y)),
        kp(end),
    )
}

/// SVG path data (`M … C …`) for a curve.
pub fn svg_path(curve: &CubicBez) -> String {
    let mut path = BezPath::new();
    path.move_to(curve.p0);
    path.curve_to(curve.p1, curve.p2, curve.p3);
    path.to_svg()
}

/// Source anchor: right-center of the source node's screen box.
pub fn source_anchor(layout: &CanvasLayout<'_>, viewport: &Viewport, id: NodeId) -> Option<Point> {
    layout.screen_bounds(id, viewport).map(|b| b.right_center())
}

/// Target anchor: left-center of the target node's screen box.
pub fn target_anchor(layout: &CanvasLayout<'_>, viewport: &Viewport, id: NodeId) -> Option<Point> {
    layout.screen_bounds(id, viewport).map(|b| b.left_center())
}

#[derive(Debug, Clone)]
pub struct ConnectionVisual {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: String,
    pub curve: CubicBez,
    pub stroke_width: f64,
    /// Width of the invisible stroke painted beneath for hit testing.
    pub hit_width: f64,
}

impl ConnectionVisual {
    /// Whether `screen` falls within the widened hit stroke.
    pub fn hit(&self, screen: Point) -> bool {
        let half = self.hit_width / 2.0;
        self.curve.nearest(kp(screen), NEAREST_ACCURACY).distance_sq <= half * half
    }

    pub fn svg_path(&self) -> String {
        svg_path(&self.curve)
    }
}

/// Visuals for every connection, in insertion order.
pub fn connection_visuals(layout: &CanvasLayout<'_>, viewport: &Viewport) -> Vec<ConnectionVisual> {
    let geometry = &layout.config.connection;
    layout
        .graph
        .connections()
        .filter_map(|c| {
            let start = source_anchor(layout, viewport, c.source)?;
            let end = target_anchor(layout, viewport, c.target)?;
            Some(ConnectionVisual {
                id: c.id,
                source: c.source,
                target: c.target,
                kind: c.kind.clone(),
                curve: s_curve(start, end, geometry.max_control_offset),
                stroke_width: geometry.stroke_width,
                hit_width: geometry.hit_width,
            })
        })
        .collect()
}

/// Topmost connection whose hit stroke contains `screen`.
pub fn hit_test_connections(visuals: &[ConnectionVisual], screen: Point) -> Option<ConnectionId> {
    visuals.iter().rev().find(|v| v.hit(screen)).map(|v| v.id)
}

/// In-progress connection preview. Never persisted.
#[derive(Debug, Clone)]
pub struct DraftPreview {
    pub source: NodeId,
    pub curve: CubicBez,
    pub dash: [f64; 2],
    /// Pulsing indicator drawn at the source anchor.
    pub pulse_center: Point,
    pub pulse_radius: f64,
}

/// Dashed curve from the source anchor to the pointer (given in world space).
pub fn draft_preview(
    layout: &CanvasLayout<'_>,
    viewport: &Viewport,
    source: NodeId,
    pointer_world: Point,
) -> Option<DraftPreview> {
    let geometry = &layout.config.connection;
    let start = source_anchor(layout, viewport, source)?;
    let end = viewport.world_to_screen(pointer_world);
    Some(DraftPreview {
        source,
        curve: s_curve(start, end, geometry.max_control_offset),
        dash: geometry.draft_dash,
        pulse_center: start,
        pulse_radius: geometry.pulse_radius,
    })
}
