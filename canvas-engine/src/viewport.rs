//! Viewport state: zoom, pan, canvas size and snapping configuration.

use serde::{Deserialize, Serialize};

use crate::config::ZoomLimits;
use crate::geometry::{Bounds, Point, Size};
use crate::snapping::Guideline;
use crate::transform::CoordinateTransform;
use crate::CanvasResult;

/// Default nominal canvas width in world units.
pub const DEFAULT_CANVAS_WIDTH: f64 = 3000.0;

/// Default nominal canvas height in world units.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 2000.0;

/// Default snapping threshold in screen pixels.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;

/// Snapping configuration plus the guidelines currently on display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct SnappingConfig {
    /// Master switch.
    pub enabled: bool,
    /// Sensitivity in screen pixels.
    pub threshold: f64,
    /// Whether the renderer should draw guidelines.
    pub show_guidelines: bool,
    /// Snap to other elements' edges, centers and spacing.
    pub snap_to_elements: bool,
    /// Snap to the canvas center.
    pub snap_to_canvas: bool,
    /// Guidelines from the latest manipulation frame. Never persisted
    /// meaningfully; cleared when manipulation ends.
    pub guidelines: Vec<Guideline>,
}

impl Default for SnappingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_SNAP_THRESHOLD,
            show_guidelines: true,
            snap_to_elements: true,
            snap_to_canvas: true,
            guidelines: Vec::new(),
        }
    }
}

/// The visible window onto the infinite canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Zoom factor, `> 0` (1.0 = 100%).
    pub zoom: f64,
    /// Pan offset in world units.
    pub offset: Point,
    /// Nominal canvas size in world units.
    pub canvas_size: Size,
    /// Union of all element bounds; refreshed lazily by the store.
    pub content_bounds: Bounds,
    /// Snapping configuration.
    pub snapping: SnappingConfig,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Point::ZERO,
            canvas_size: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            content_bounds: Bounds::new(0.0, 0.0, DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            snapping: SnappingConfig::default(),
        }
    }
}

impl Viewport {
    /// The screen/world transform for this viewport.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::InvalidZoom`] if `zoom` is not positive.
    pub fn transform(&self) -> CanvasResult<CoordinateTransform> {
        CoordinateTransform::from_viewport(self)
    }

    /// Center of the nominal canvas in world units.
    #[must_use]
    pub fn canvas_center(&self) -> Point {
        Point::new(self.canvas_size.width / 2.0, self.canvas_size.height / 2.0)
    }

    /// Snap threshold converted to world units at the current zoom.
    ///
    /// Falls back to the raw pixel value when zoom is invalid.
    #[must_use]
    pub fn snap_threshold_world(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            self.snapping.threshold / self.zoom
        } else {
            self.snapping.threshold
        }
    }

    /// Zoom by `factor`, keeping the world point under `anchor` (screen
    /// pixels, relative to the canvas origin) fixed. The result is clamped to
    /// `limits`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, limits: ZoomLimits) {
        let old_zoom = limits.clamp(self.zoom);
        let world_x = anchor.x / old_zoom - self.offset.x;
        let world_y = anchor.y / old_zoom - self.offset.y;
        let new_zoom = limits.clamp(old_zoom * factor);
        self.zoom = new_zoom;
        self.offset = Point::new(anchor.x / new_zoom - world_x, anchor.y / new_zoom - world_y);
    }

    /// Pan so content follows a pointer that moved by `screen_delta` pixels.
    pub fn pan_by_screen(&mut self, screen_delta: Point, limits: ZoomLimits) {
        let zoom = limits.clamp(self.zoom);
        self.offset.x += screen_delta.x / zoom;
        self.offset.y += screen_delta.y / zoom;
    }

    /// Clamp the zoom factor into `limits` in place.
    pub fn clamp_zoom(&mut self, limits: ZoomLimits) {
        self.zoom = limits.clamp(self.zoom);
    }
}

/// Shallow partial update for [`Viewport`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportPatch {
    /// New zoom factor.
    pub zoom: Option<f64>,
    /// New pan offset.
    pub offset: Option<Point>,
    /// New nominal canvas size.
    pub canvas_size: Option<Size>,
    /// New content bounds.
    pub content_bounds: Option<Bounds>,
    /// Replacement snapping configuration (replaced as a whole).
    pub snapping: Option<SnappingConfig>,
}

impl ViewportPatch {
    /// Patch that only changes zoom.
    #[must_use]
    pub fn zoom(zoom: f64) -> Self {
        Self {
            zoom: Some(zoom),
            ..Self::default()
        }
    }

    /// Patch that only changes the pan offset.
    #[must_use]
    pub fn offset(offset: Point) -> Self {
        Self {
            offset: Some(offset),
            ..Self::default()
        }
    }

    /// Merge into `viewport`.
    pub fn apply(self, viewport: &mut Viewport) {
        if let Some(zoom) = self.zoom {
            viewport.zoom = zoom;
        }
        if let Some(offset) = self.offset {
            viewport.offset = offset;
        }
        if let Some(size) = self.canvas_size {
            viewport.canvas_size = size;
        }
        if let Some(bounds) = self.content_bounds {
            viewport.content_bounds = bounds;
        }
        if let Some(snapping) = self.snapping {
            viewport.snapping = snapping;
        }
    }
}
