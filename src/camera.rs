//! Camera and coordinate conversions.
//!
//! The camera names the world point shown at the center of the viewport and a
//! uniform zoom factor. Screen points are CSS pixels relative to the top-left
//! corner of the map container.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::surface::Surface;

/// A point in either screen or world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// The rectangle grown by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            left: self.left - margin,
            top: self.top - margin,
            right: self.right + margin,
            bottom: self.bottom + margin,
        }
    }
}

/// Container size in CSS pixels plus the device-pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 0.0, height: 0.0, dpr: 1.0 }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    /// Screen-space center of the viewport.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }

    /// Backing-store size in device pixels for a surface covering the viewport.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width * self.dpr).round().max(0.0);
        let h = (self.height * self.dpr).round().max(0.0);
        (w as u32, h as u32)
    }
}

/// Camera state: world point at the viewport center and uniform zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    /// Camera center as a point.
    #[must_use]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point, viewport: &Viewport) -> Point {
        let center = viewport.center();
        Point {
            x: (screen.x - center.x) / self.scale + self.x,
            y: (screen.y - center.y) / self.scale + self.y,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point, viewport: &Viewport) -> Point {
        let center = viewport.center();
        Point {
            x: (world.x - self.x) * self.scale + center.x,
            y: (world.y - self.y) * self.scale + center.y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// World rectangle covered by the viewport.
    #[must_use]
    pub fn visible_world_rect(&self, viewport: &Viewport) -> Rect {
        let top_left = self.screen_to_world(Point::new(0.0, 0.0), viewport);
        let bottom_right = self.screen_to_world(Point::new(viewport.width, viewport.height), viewport);
        Rect { left: top_left.x, top: top_left.y, right: bottom_right.x, bottom: bottom_right.y }
    }

    /// Camera after dragging the world by a screen-space delta.
    ///
    /// The camera moves opposite to the pointer so the map follows the hand.
    #[must_use]
    pub fn panned_by_screen_delta(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x - dx / self.scale,
            y: self.y - dy / self.scale,
            scale: self.scale,
        }
    }

    /// Camera after multiplying the scale by `factor` around `anchor_world`.
    ///
    /// The new scale is clamped to `[min_scale, max_scale]`, and the position is
    /// chosen so `anchor_world` stays at the same screen position.
    #[must_use]
    pub fn zoomed_at(&self, anchor_world: Point, factor: f64, min_scale: f64, max_scale: f64) -> Self {
        let new_scale = (self.scale * factor).clamp(min_scale, max_scale);
        let keep = self.scale / new_scale;
        Self {
            x: anchor_world.x - (anchor_world.x - self.x) * keep,
            y: anchor_world.y - (anchor_world.y - self.y) * keep,
            scale: new_scale,
        }
    }
}

/// Reset `surface`'s transform and map world coordinates onto it.
///
/// The base transform scales by the device-pixel ratio so all following
/// coordinates are CSS pixels; on top of that the viewport center becomes the
/// camera position and everything is scaled by the camera zoom.
///
/// # Errors
///
/// Returns `Err` if a transform call fails on the surface.
pub fn apply_camera_transform<S: Surface + ?Sized>(
    surface: &mut S,
    camera: &Camera,
    viewport: &Viewport,
) -> Result<(), SurfaceError> {
    let center = viewport.center();
    surface.set_transform(viewport.dpr, 0.0, 0.0, viewport.dpr, 0.0, 0.0)?;
    surface.translate(center.x, center.y)?;
    surface.scale(camera.scale, camera.scale)?;
    surface.translate(-camera.x, -camera.y)?;
    Ok(())
}
