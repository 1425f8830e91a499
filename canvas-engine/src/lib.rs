//! # Canvas Engine
//!
//! Interaction and scene state engine for an infinite design canvas.
//! Rendering backends, sync layers and storage sit outside this crate and
//! talk to it through the store, the event bus and the mutation journal.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   CanvasEngine                   │
//! ├──────────────────────────────────────────────────┤
//! │  PointerSurface ──► InputBridge ──► EventBus     │
//! │  KeyboardSource ──┘  (screen→world)     │        │
//! │                                         ▼        │
//! │  SnapEngine ◄──── ToolMachine ──► SceneStore     │
//! │                                     │            │
//! │                          MutationLog / observers │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and owned by an explicitly constructed
//! [`CanvasEngine`]; there are no globals.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bridge;
pub mod bus;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod journal;
pub mod snapping;
pub mod store;
pub mod surface;
pub mod tool;
pub mod transform;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bridge::{InputBridge, ViewportSource};
pub use bus::{EventBus, SubscriptionId};
pub use config::{EngineConfig, MinSizePolicy, SnapTuning, StoreConfig, WheelConfig, ZoomLimits};
pub use element::{Element, ElementId, ElementKind, ElementPatch, Frame, Visibility};
pub use engine::CanvasEngine;
pub use error::{CanvasError, CanvasResult};
pub use event::{
    CanvasEvent, KeyPhase, KeyboardEvent, Modifiers, PointerEvent, RawKeyEvent, RawPointerEvent,
    SurfaceEventKind, Topic, WheelEvent,
};
pub use geometry::{Axis, Bounds, Point, Size};
pub use journal::{Mutation, MutationLog, MutationRecord};
pub use snapping::{Guideline, SnapEngine, SnapMode, SnapResult};
pub use store::{CanvasSnapshot, ElementUpdate, SceneStore, StatePatch};
pub use surface::{HostSurface, KeyboardSource, PointerSurface, SurfaceProvider};
pub use tool::{Tool, ToolMachine, ToolState};
pub use transform::CoordinateTransform;
pub use viewport::{SnappingConfig, Viewport, ViewportPatch};

/// Canvas engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
