//! # Mutation journal
//!
//! Every store mutation is recorded here in the order it was applied, so a
//! synchronization layer can intercept changes without the store knowing
//! about it.
//!
//! ```text
//! 1. The store applies a mutation
//! 2. The mutation is appended with a sequence number and timestamp
//! 3. A sync layer drains the log and ships the records
//! ```
//!
//! The log is bounded. When full, the oldest record is dropped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementPatch};
use crate::geometry::Point;
use crate::snapping::Guideline;
use crate::store::{ElementUpdate, StatePatch};
use crate::tool::Tool;
use crate::viewport::ViewportPatch;

/// One applied store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[allow(clippy::large_enum_variant)]
pub enum Mutation {
    /// An element was inserted or overwritten.
    AddElement {
        /// The stored element.
        element: Element,
    },
    /// A patch was merged into an element.
    UpdateElement {
        /// Target element.
        id: ElementId,
        /// The merged patch.
        patch: ElementPatch,
    },
    /// A batch of patches was merged as one step.
    UpdateElements {
        /// The applied updates.
        updates: Vec<ElementUpdate>,
    },
    /// An element was removed (and dropped from the selection).
    DeleteElement {
        /// Removed element.
        id: ElementId,
    },
    /// The selection was replaced.
    SetSelection {
        /// New selection.
        ids: Vec<ElementId>,
    },
    /// Viewport fields were merged.
    SetViewport {
        /// The merged fields.
        patch: ViewportPatch,
    },
    /// The active tool changed and any draw was abandoned.
    SetTool {
        /// New tool.
        tool: Tool,
    },
    /// Drawing flags or points changed.
    SetDrawingState {
        /// Drawing flag.
        drawing: bool,
        /// New start point, if provided.
        start_point: Option<Point>,
        /// New current point, if provided.
        current_point: Option<Point>,
    },
    /// The preview element was set or cleared.
    SetPreview {
        /// New preview.
        element: Option<Element>,
    },
    /// The creating flag changed.
    SetCreating {
        /// New flag value.
        creating: bool,
    },
    /// The active guidelines were replaced.
    SetGuidelines {
        /// New guidelines.
        guidelines: Vec<Guideline>,
    },
    /// State was bulk-loaded.
    LoadState {
        /// The loaded fields.
        patch: StatePatch,
    },
    /// Everything was reset to defaults.
    ClearCanvas,
}

impl Mutation {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AddElement { .. } => "add_element",
            Self::UpdateElement { .. } => "update_element",
            Self::UpdateElements { .. } => "update_elements",
            Self::DeleteElement { .. } => "delete_element",
            Self::SetSelection { .. } => "set_selection",
            Self::SetViewport { .. } => "set_viewport",
            Self::SetTool { .. } => "set_tool",
            Self::SetDrawingState { .. } => "set_drawing_state",
            Self::SetPreview { .. } => "set_preview",
            Self::SetCreating { .. } => "set_creating",
            Self::SetGuidelines { .. } => "set_guidelines",
            Self::LoadState { .. } => "load_state",
            Self::ClearCanvas => "clear_canvas",
        }
    }

    /// Whether the mutation touches shared document state (elements or
    /// selection) rather than local interaction state.
    #[must_use]
    pub const fn is_document_change(&self) -> bool {
        matches!(
            self,
            Self::AddElement { .. }
                | Self::UpdateElement { .. }
                | Self::UpdateElements { .. }
                | Self::DeleteElement { .. }
                | Self::SetSelection { .. }
                | Self::LoadState { .. }
                | Self::ClearCanvas
        )
    }
}

/// A journaled mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Monotonic sequence number, starting at 1 per store.
    pub sequence: u64,
    /// When the mutation was applied (ms since epoch).
    pub timestamp: u64,
    /// What happened.
    pub mutation: Mutation,
}

/// Bounded FIFO of mutation records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationLog {
    /// Records not yet drained.
    records: VecDeque<MutationRecord>,
    /// Maximum number of records kept.
    capacity: usize,
    /// Next sequence number to assign.
    next_sequence: u64,
    /// Records dropped because the log was full.
    dropped: u64,
}

impl MutationLog {
    /// A log keeping at most `capacity` records (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            next_sequence: 1,
            dropped: 0,
        }
    }

    /// Append a mutation and return the stored record.
    pub fn record(&mut self, mutation: Mutation, timestamp: u64) -> &MutationRecord {
        if self.records.len() >= self.capacity {
            self.records.pop_front();
            self.dropped += 1;
            tracing::trace!("mutation log full, dropped oldest record");
        }
        let record = MutationRecord {
            sequence: self.next_sequence,
            timestamp,
            mutation,
        };
        self.next_sequence += 1;
        self.records.push_back(record);
        // Just pushed, so the back exists.
        &self.records[self.records.len() - 1]
    }

    /// Remove and return every buffered record, oldest first.
    pub fn drain(&mut self) -> Vec<MutationRecord> {
        self.records.drain(..).collect()
    }

    /// Buffered records, oldest first.
    #[must_use]
    pub fn records(&self) -> &VecDeque<MutationRecord> {
        &self.records
    }

    /// Number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of buffered records.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records lost to the capacity bound since creation.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Sequence number the next record will get.
    #[must_use]
    pub const fn next_sequence(&self) -> u64 {
        self.next_sequence
    }
}

impl Default for MutationLog {
    fn default() -> Self {
        Self::with_capacity(1000)
    }
}
