//! Engine configuration.
//!
//! Every section has sensible defaults, so a config file only needs to list
//! the values it overrides:
//!
//! ```
//! use canvas_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "zoom": { "min": 0.1 } }"#).unwrap();
//! assert!((config.zoom.min - 0.1).abs() < f64::EPSILON);
//! assert!((config.zoom.max - 64.0).abs() < f64::EPSILON);
//! ```

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;
use crate::viewport::SnappingConfig;
use crate::{CanvasError, CanvasResult};

/// Allowed zoom range. Applied by callers before building transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    /// Smallest zoom factor.
    pub min: f64,
    /// Largest zoom factor.
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.02,
            max: 64.0,
        }
    }
}

impl ZoomLimits {
    /// Clamp `zoom` into range. Non-finite or non-positive input maps to `min`.
    #[must_use]
    pub fn clamp(&self, zoom: f64) -> f64 {
        if !zoom.is_finite() || zoom <= 0.0 {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }
}

/// Minimum size a drawn shape must reach to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinSizePolicy {
    /// Width must be strictly greater than this.
    pub min_width: f64,
    /// Height must be strictly greater than this.
    pub min_height: f64,
}

impl MinSizePolicy {
    /// Whether `bounds` is large enough to commit.
    #[must_use]
    pub fn accepts(&self, bounds: &Bounds) -> bool {
        bounds.width > self.min_width && bounds.height > self.min_height
    }
}

/// Scene store behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Reject adds/updates that would create a group cycle.
    pub strict_groups: bool,
    /// Maximum number of journaled mutations kept for a sync layer.
    pub journal_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            strict_groups: false,
            journal_capacity: 1000,
        }
    }
}

/// Snap engine tuning that is not part of the persisted viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapTuning {
    /// Candidate guides closer than this (world units) are merged.
    pub merge_epsilon: f64,
}

impl Default for SnapTuning {
    fn default() -> Self {
        Self { merge_epsilon: 0.5 }
    }
}

/// Wheel handling for the default tool layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Zoom factor per wheel pixel: `factor = exp(-delta_y * zoom_speed)`.
    pub zoom_speed: f64,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self { zoom_speed: 0.0015 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Zoom clamp applied by the engine's viewport operations.
    pub zoom: ZoomLimits,
    /// Initial snapping configuration for fresh viewports.
    pub snapping: SnappingConfig,
    /// Snap engine tuning.
    pub snap: SnapTuning,
    /// Commit policy for drawn shapes.
    pub min_size: MinSizePolicy,
    /// Store behaviour.
    pub store: StoreConfig,
    /// Wheel handling.
    pub wheel: WheelConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] for malformed JSON and
    /// [`CanvasError::InvalidConfig`] if validation fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> CanvasResult<()> {
        if !(self.zoom.min.is_finite() && self.zoom.min > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "zoom.min must be positive, got {}",
                self.zoom.min
            )));
        }
        if !(self.zoom.max.is_finite() && self.zoom.max >= self.zoom.min) {
            return Err(CanvasError::InvalidConfig(format!(
                "zoom.max ({}) must be >= zoom.min ({})",
                self.zoom.max, self.zoom.min
            )));
        }
        if self.snapping.threshold.is_nan() || self.snapping.threshold < 0.0 {
            return Err(CanvasError::InvalidConfig(
                "snapping.threshold must be non-negative".into(),
            ));
        }
        if self.snap.merge_epsilon.is_nan() || self.snap.merge_epsilon < 0.0 {
            return Err(CanvasError::InvalidConfig(
                "snap.merge_epsilon must be non-negative".into(),
            ));
        }
        if self.store.journal_capacity == 0 {
            return Err(CanvasError::InvalidConfig(
                "store.journal_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
