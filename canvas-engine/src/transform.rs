//! Screen ↔ world coordinate conversion.
//!
//! ```text
//! world  = (screen - origin) / zoom - offset
//! screen = (world + offset) * zoom + origin
//! ```
//!
//! A [`CoordinateTransform`] can only be built with a positive, finite zoom.
//! Clamping zoom to a usable minimum is the caller's job (see
//! [`crate::config::ZoomLimits`]); this module never clamps on its own.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::viewport::Viewport;
use crate::{CanvasError, CanvasResult};

/// A validated screen/world mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateTransform {
    zoom: f64,
    offset: Point,
    origin: Point,
}

impl CoordinateTransform {
    /// Zoom 1, no pan, origin at the surface's top-left corner.
    pub const IDENTITY: Self = Self {
        zoom: 1.0,
        offset: Point::ZERO,
        origin: Point::ZERO,
    };

    /// Build a transform from raw parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidZoom`] if `zoom` is not a positive,
    /// finite number.
    pub fn new(zoom: f64, offset: Point, origin: Point) -> CanvasResult<Self> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(CanvasError::InvalidZoom(zoom));
        }
        Ok(Self {
            zoom,
            offset,
            origin,
        })
    }

    /// Build a transform from a viewport, with the canvas origin at (0, 0).
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidZoom`] if the viewport zoom is invalid.
    pub fn from_viewport(viewport: &Viewport) -> CanvasResult<Self> {
        Self::new(viewport.zoom, viewport.offset, Point::ZERO)
    }

    /// Same transform, relative to a different canvas origin on screen.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Pan offset in world units.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.offset
    }

    /// Canvas origin in screen pixels.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Convert a screen-space point (pixels) to world coordinates.
    #[must_use]
    pub fn world_from_screen(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin.x) / self.zoom - self.offset.x,
            y: (screen.y - self.origin.y) / self.zoom - self.offset.y,
        }
    }

    /// Convert a world-space point to screen coordinates (pixels).
    #[must_use]
    pub fn screen_from_world(&self, world: Point) -> Point {
        Point {
            x: (world.x + self.offset.x) * self.zoom + self.origin.x,
            y: (world.y + self.offset.y) * self.zoom + self.origin.y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Convert a world-space distance to screen pixels.
    #[must_use]
    pub fn world_dist_to_screen(&self, world_dist: f64) -> f64 {
        world_dist * self.zoom
    }

    /// Map a screen rectangle (e.g. a marquee) into world space.
    #[must_use]
    pub fn world_rect_from_screen(&self, screen: Bounds) -> Bounds {
        let top_left = self.world_from_screen(Point::new(screen.x, screen.y));
        Bounds::new(
            top_left.x,
            top_left.y,
            self.screen_dist_to_world(screen.width),
            self.screen_dist_to_world(screen.height),
        )
    }
}

impl Default for CoordinateTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Convert a screen point to world coordinates through `viewport`.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidZoom`] if the viewport zoom is invalid.
pub fn world_from_screen(screen: Point, viewport: &Viewport) -> CanvasResult<Point> {
    Ok(CoordinateTransform::from_viewport(viewport)?.world_from_screen(screen))
}

/// Convert a world point to screen coordinates through `viewport`.
///
/// # Errors
///
/// Returns [`CanvasError::InvalidZoom`] if the viewport zoom is invalid.
pub fn screen_from_world(world: Point, viewport: &Viewport) -> CanvasResult<Point> {
    Ok(CoordinateTransform::from_viewport(viewport)?.screen_from_world(world))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= 1e-9 * scale
    }

    fn point_approx_eq(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_zoom_two_scenario() {
        let viewport = Viewport {
            zoom: 2.0,
            ..Viewport::default()
        };
        let world = world_from_screen(Point::new(200.0, 100.0), &viewport).expect("valid zoom");
        assert!(point_approx_eq(world, Point::new(100.0, 50.0)));
    }

    #[test]
    fn test_offset_and_origin() {
        let t = CoordinateTransform::new(2.0, Point::new(10.0, -5.0), Point::new(40.0, 20.0))
            .expect("valid zoom");
        // (60 - 40) / 2 - 10 = 0, (30 - 20) / 2 + 5 = 10
        let world = t.world_from_screen(Point::new(60.0, 30.0));
        assert!(point_approx_eq(world, Point::new(0.0, 10.0)));
        assert!(point_approx_eq(t.screen_from_world(world), Point::new(60.0, 30.0)));
    }

    #[test]
    fn test_round_trip_many_zooms() {
        let zooms = [0.02, 0.1, 0.75, 1.0, 1.5, 3.3, 64.0];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(400.0, 300.0),
            Point::new(-1234.5, 987.25),
            Point::new(1.0e6, -2.5e5),
        ];
        for &zoom in &zooms {
            let t = CoordinateTransform::new(zoom, Point::new(13.7, -42.3), Point::new(8.0, 64.0))
                .expect("valid zoom");
            for &p in &points {
                let back = t.screen_from_world(t.world_from_screen(p));
                assert!(point_approx_eq(p, back), "zoom {zoom}: {p:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_rejects_non_positive_zoom() {
        for zoom in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = CoordinateTransform::new(zoom, Point::ZERO, Point::ZERO);
            assert!(matches!(result, Err(CanvasError::InvalidZoom(_))));
        }
        let viewport = Viewport {
            zoom: 0.0,
            ..Viewport::default()
        };
        assert!(world_from_screen(Point::ZERO, &viewport).is_err());
    }

    #[test]
    fn test_screen_dist_ignores_pan() {
        let t = CoordinateTransform::new(4.0, Point::new(999.0, -999.0), Point::ZERO)
            .expect("valid zoom");
        assert!(approx_eq(t.screen_dist_to_world(8.0), 2.0));
        assert!(approx_eq(t.world_dist_to_screen(2.0), 8.0));
    }

    #[test]
    fn test_world_rect_from_screen() {
        let t = CoordinateTransform::new(2.0, Point::ZERO, Point::ZERO).expect("valid zoom");
        let rect = t.world_rect_from_screen(Bounds::new(20.0, 40.0, 100.0, 50.0));
        assert_eq!(rect, Bounds::new(10.0, 20.0, 50.0, 25.0));
    }
}
