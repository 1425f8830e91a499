//! Error types for canvas engine operations.

use thiserror::Error;

/// Result type for canvas engine operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas engine operations.
///
/// Only configuration mistakes surface as errors. Referential inconsistencies
/// (updating a deleted element, dangling selection ids) are tolerated by the
/// store and never reach this type.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Zoom factor was zero, negative or not finite.
    #[error("Invalid zoom factor: {0}")]
    InvalidZoom(f64),

    /// No input surface was available to attach to.
    #[error("Input surface missing: {0}")]
    SurfaceMissing(String),

    /// The scene store was mutably borrowed when a read was needed.
    #[error("Scene store is busy")]
    StoreBusy,

    /// Engine configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A group would (transitively) contain itself.
    #[error("Group cycle through element: {0}")]
    GroupCycle(String),

    /// A group lists a child id that is not in the store.
    #[error("Group references missing child: {0}")]
    DanglingChild(String),

    /// Snapshot or config serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
