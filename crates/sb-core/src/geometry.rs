//! World/screen geometry and the pan/zoom viewport.
//!
//! Nodes live in an unbounded world space. The viewport maps world points to
//! screen pixels with `screen = world * zoom + offset`. Pan only touches
//! `offset`, zoom only touches `zoom`; the two meet only in the transform.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

pub const DEFAULT_ZOOM_MIN: f64 = 0.1;
pub const DEFAULT_ZOOM_MAX: f64 = 5.0;

/// A 2D point or vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, k: f64) -> Point {
        Point::new(self.x / k, self.y / k)
    }
}

/// Axis-aligned rectangle (top-left anchored).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin(origin: Point, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint of the right edge (outgoing connection anchor).
    pub fn right_center(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    /// Midpoint of the left edge (incoming connection anchor).
    pub fn left_center(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    /// AABB overlap test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

/// The view transform applied to the infinite world.
///
/// Pure view state: it is persisted alongside the document for convenience,
/// but never as part of any node's identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen-space translation.
    pub offset: Point,
    zoom: f64,
    zoom_min: f64,
    zoom_max: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::with_limits(DEFAULT_ZOOM_MIN, DEFAULT_ZOOM_MAX)
    }
}

impl Viewport {
    /// Identity viewport with a custom zoom range.
    pub fn with_limits(zoom_min: f64, zoom_max: f64) -> Self {
        let (zoom_min, zoom_max) = if zoom_min <= zoom_max {
            (zoom_min, zoom_max)
        } else {
            (zoom_max, zoom_min)
        };
        Self {
            offset: Point::ZERO,
            zoom: 1.0_f64.clamp(zoom_min, zoom_max),
            zoom_min,
            zoom_max,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn zoom_range(&self) -> (f64, f64) {
        (self.zoom_min, self.zoom_max)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world * self.zoom + self.offset
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        (screen - self.offset) / self.zoom
    }

    /// Project a world-space rectangle into screen space.
    pub fn bounds_to_screen(&self, world: &Bounds) -> Bounds {
        let origin = self.world_to_screen(world.origin());
        Bounds::from_origin(origin, world.width * self.zoom, world.height * self.zoom)
    }

    /// Set an absolute zoom, clamped to the configured range.
    /// Non-finite values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            log::debug!("ignoring non-finite zoom {zoom}");
            return;
        }
        self.zoom = zoom.clamp(self.zoom_min, self.zoom_max);
    }

    /// Apply a multiplicative zoom step (`zoom *= factor`).
    pub fn zoom_by(&mut self, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            log::debug!("ignoring zoom factor {factor}");
            return;
        }
        self.set_zoom(self.zoom * factor);
    }

    /// Move the pan offset. Never touches zoom.
    pub fn pan_to(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Back to identity: zoom 1, offset (0, 0).
    pub fn reset(&mut self) {
        self.offset = Point::ZERO;
        self.set_zoom(1.0);
    }
}
