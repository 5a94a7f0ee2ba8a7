//! Canvas configuration: zoom range, node footprints, grid and connection
//! geometry.
//!
//! Every field has a default, so a host can deserialize a partial JSON object
//! and only override what it cares about.

use crate::geometry::{DEFAULT_ZOOM_MAX, DEFAULT_ZOOM_MIN, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Multiplicative zoom step per wheel tick. Default: **1.1**.
    pub wheel_zoom_factor: f64,
    pub shot: ShotGeometry,
    pub scene: SceneGeometry,
    pub connection: ConnectionGeometry,
    /// Maximum number of undo steps kept per canvas.
    pub undo_depth: usize,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            zoom_min: DEFAULT_ZOOM_MIN,
            zoom_max: DEFAULT_ZOOM_MAX,
            wheel_zoom_factor: 1.1,
            shot: ShotGeometry::default(),
            scene: SceneGeometry::default(),
            connection: ConnectionGeometry::default(),
            undo_depth: 100,
        }
    }
}

impl CanvasConfig {
    /// Parse a (possibly partial) JSON configuration object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Identity viewport honouring this config's zoom range.
    pub fn viewport(&self) -> Viewport {
        Viewport::with_limits(self.zoom_min, self.zoom_max)
    }
}

/// World-space footprint of a free-standing shot node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotGeometry {
    pub width: f64,
    pub height: f64,
    /// Height of the status-coloured strip along the bottom edge.
    pub footer_height: f64,
    /// Side of the square close control in the top-right corner.
    pub control_size: f64,
    pub control_inset: f64,
}

impl Default for ShotGeometry {
    fn default() -> Self {
        Self {
            width: 220.0,
            height: 160.0,
            footer_height: 24.0,
            control_size: 20.0,
            control_inset: 6.0,
        }
    }
}

/// Scene-master footprints and the fixed child grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneGeometry {
    pub collapsed_width: f64,
    pub collapsed_height: f64,
    pub grid_cols: usize,
    pub grid_rows: usize,
    pub slot_width: f64,
    pub slot_height: f64,
    pub slot_gap: f64,
    pub padding: f64,
    /// Title band above the grid when expanded.
    pub header_height: f64,
}

impl Default for SceneGeometry {
    fn default() -> Self {
        Self {
            collapsed_width: 160.0,
            collapsed_height: 120.0,
            grid_cols: 5,
            grid_rows: 5,
            slot_width: 120.0,
            slot_height: 90.0,
            slot_gap: 8.0,
            padding: 16.0,
            header_height: 40.0,
        }
    }
}

impl SceneGeometry {
    /// Number of child slots in the expanded grid.
    pub fn slot_count(&self) -> usize {
        self.grid_cols * self.grid_rows
    }

    /// Expanded footprint. Depends only on the grid, never on child count.
    pub fn expanded_size(&self) -> (f64, f64) {
        let cols = self.grid_cols as f64;
        let rows = self.grid_rows as f64;
        let w = self.padding * 2.0
            + cols * self.slot_width
            + (cols - 1.0).max(0.0) * self.slot_gap;
        let h = self.header_height
            + self.padding * 2.0
            + rows * self.slot_height
            + (rows - 1.0).max(0.0) * self.slot_gap;
        (w, h)
    }
}

/// Screen-space connection curve geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionGeometry {
    /// Cap on the horizontal control-point offset, in pixels.
    pub max_control_offset: f64,
    /// Width of the invisible stroke used for click hit testing.
    pub hit_width: f64,
    pub stroke_width: f64,
    /// Dash pattern of the in-progress draft curve.
    pub draft_dash: [f64; 2],
    pub pulse_radius: f64,
}

impl Default for ConnectionGeometry {
    fn default() -> Self {
        Self {
            max_control_offset: 100.0,
            hit_width: 20.0,
            stroke_width: 2.0,
            draft_dash: [6.0, 4.0],
            pulse_radius: 6.0,
        }
    }
}
