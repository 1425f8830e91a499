//! Authoritative scene state: elements, selection, viewport and tool.
//!
//! The store is the only owner of this state. Every mutation goes through a
//! method taking `&mut self`, so readers never observe a half-applied batch.
//! Each mutation is appended to the [`MutationLog`] and handed to observers
//! after it has been applied.
//!
//! Referential slips are tolerated: updating or deleting an unknown id is a
//! no-op, and dangling selection or group-child ids are filtered when
//! materialized.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::element::{Element, ElementId, ElementPatch};
use crate::geometry::{Bounds, Point};
use crate::journal::{Mutation, MutationLog, MutationRecord};
use crate::snapping::Guideline;
use crate::tool::{Tool, ToolState};
use crate::viewport::{Viewport, ViewportPatch};
use crate::{CanvasError, CanvasResult};

/// Source of "now" in milliseconds since epoch.
pub type Clock = fn() -> u64;

/// Get the current Unix timestamp in milliseconds.
#[must_use]
pub fn current_timestamp_ms() -> u64 {
    #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
    {
        // Date.now() is a non-negative integral f64 well inside u64 range
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            js_sys::Date::now() as u64
        }
    }
    #[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
    {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
            // Timestamp will not exceed u64 max for millennia
            #[allow(clippy::cast_possible_truncation)]
            {
                d.as_millis() as u64
            }
        })
    }
}

/// A patch addressed to one element, used for batched updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    /// Target element.
    pub id: ElementId,
    /// Fields to merge.
    pub patch: ElementPatch,
}

impl ElementUpdate {
    /// Pair an id with a patch.
    #[must_use]
    pub const fn new(id: ElementId, patch: ElementPatch) -> Self {
        Self { id, patch }
    }
}

/// The full persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    /// Every element by id.
    pub elements: HashMap<ElementId, Element>,
    /// Selected ids.
    pub selected_element_ids: Vec<ElementId>,
    /// Viewport.
    pub viewport: Viewport,
    /// Tool state.
    pub tool: ToolState,
}

impl CanvasSnapshot {
    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON. No schema migration is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] for malformed input.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Partial state accepted by [`SceneStore::load_state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatePatch {
    /// Replacement element map.
    pub elements: Option<HashMap<ElementId, Element>>,
    /// Replacement selection.
    pub selected_element_ids: Option<Vec<ElementId>>,
    /// Replacement viewport.
    pub viewport: Option<Viewport>,
    /// Replacement tool state.
    pub tool: Option<ToolState>,
}

impl From<CanvasSnapshot> for StatePatch {
    fn from(snapshot: CanvasSnapshot) -> Self {
        Self {
            elements: Some(snapshot.elements),
            selected_element_ids: Some(snapshot.selected_element_ids),
            viewport: Some(snapshot.viewport),
            tool: Some(snapshot.tool),
        }
    }
}

/// A structural problem found by [`SceneStore::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// A group lists a child that does not exist.
    DanglingChild {
        /// The group.
        group: ElementId,
        /// The missing child.
        child: ElementId,
    },
    /// A group (transitively) contains itself.
    GroupCycle {
        /// A group on the cycle.
        group: ElementId,
    },
    /// The selection names an element that does not exist.
    DanglingSelection {
        /// The missing id.
        id: ElementId,
    },
}

/// Token for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&MutationRecord, &SceneStore)>;

/// Owner of the scene.
pub struct SceneStore {
    elements: HashMap<ElementId, Element>,
    /// Paint order; higher draws on top.
    stack: HashMap<ElementId, u64>,
    next_stack: u64,
    selection: Vec<ElementId>,
    viewport: Viewport,
    initial_viewport: Viewport,
    tool: ToolState,
    config: StoreConfig,
    clock: Clock,
    journal: MutationLog,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
    bounds_dirty: bool,
}

impl SceneStore {
    /// An empty store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// An empty store with `config`.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            elements: HashMap::new(),
            stack: HashMap::new(),
            next_stack: 0,
            selection: Vec::new(),
            viewport: Viewport::default(),
            initial_viewport: Viewport::default(),
            tool: ToolState::default(),
            config,
            clock: current_timestamp_ms,
            journal: MutationLog::with_capacity(config.journal_capacity),
            observers: Vec::new(),
            next_observer: 1,
            bounds_dirty: true,
        }
    }

    /// Use `viewport` both now and as the reset target of
    /// [`Self::clear_canvas`].
    #[must_use]
    pub fn with_initial_viewport(mut self, viewport: Viewport) -> Self {
        self.initial_viewport = viewport.clone();
        self.viewport = viewport;
        self
    }

    /// Replace the clock used for `updated_at` and journal timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Store configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Look up an element.
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Whether `id` exists.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the scene has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate elements in no particular order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Raw selection, possibly containing ids that no longer exist.
    #[must_use]
    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selection
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// The viewport.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The tool state.
    #[must_use]
    pub const fn tool(&self) -> &ToolState {
        &self.tool
    }

    /// The mutation journal.
    #[must_use]
    pub const fn journal(&self) -> &MutationLog {
        &self.journal
    }

    /// Selected elements, dangling ids skipped, in selection order.
    #[must_use]
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.selection
            .iter()
            .filter_map(|id| self.elements.get(id))
            .collect()
    }

    /// Every element, bottom of the paint order first.
    #[must_use]
    pub fn element_list(&self) -> Vec<&Element> {
        let mut list: Vec<&Element> = self.elements.values().collect();
        list.sort_by_key(|e| (self.stack.get(&e.id).copied().unwrap_or(0), e.id));
        list
    }

    /// Children of a group that still exist, in paint order. `None` when
    /// `id` is missing or not a group.
    #[must_use]
    pub fn group_children(&self, id: ElementId) -> Option<Vec<&Element>> {
        let children = self.elements.get(&id)?.children()?;
        Some(
            children
                .iter()
                .filter_map(|child| self.elements.get(child))
                .collect(),
        )
    }

    /// Every element reachable through group membership from `id`,
    /// excluding `id` itself unless it sits on a cycle. Dangling ids are
    /// skipped.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> HashSet<ElementId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<ElementId> = self
            .elements
            .get(&id)
            .and_then(Element::children)
            .map(<[ElementId]>::to_vec)
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            let Some(element) = self.elements.get(&next) else {
                continue;
            };
            if !seen.insert(next) {
                continue;
            }
            if let Some(children) = element.children() {
                stack.extend_from_slice(children);
            }
        }
        seen
    }

    /// Visible, non-group elements containing `point`, topmost first.
    #[must_use]
    pub fn elements_at(&self, point: Point) -> Vec<&Element> {
        let mut hits: Vec<&Element> = self
            .elements
            .values()
            .filter(|e| e.is_visible() && e.children().is_none() && e.contains_point(point))
            .collect();
        hits.sort_by_key(|e| {
            std::cmp::Reverse((self.stack.get(&e.id).copied().unwrap_or(0), e.id))
        });
        hits
    }

    /// Topmost hit at `point`.
    #[must_use]
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.elements_at(point).into_iter().next()
    }

    /// Union of every element's bounds, `None` for an empty scene.
    #[must_use]
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.elements
            .values()
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Recompute `viewport.content_bounds` if elements changed since the last
    /// refresh. An empty scene falls back to the nominal canvas rectangle.
    pub fn refresh_content_bounds(&mut self) -> Bounds {
        if self.bounds_dirty {
            let size = self.viewport.canvas_size;
            self.viewport.content_bounds = self
                .content_bounds()
                .unwrap_or_else(|| Bounds::new(0.0, 0.0, size.width, size.height));
            self.bounds_dirty = false;
        }
        self.viewport.content_bounds
    }

    /// Copy of the full state.
    #[must_use]
    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot {
            elements: self.elements.clone(),
            selected_element_ids: self.selection.clone(),
            viewport: self.viewport.clone(),
            tool: self.tool.clone(),
        }
    }

    /// Report dangling group children, group cycles and dangling selection.
    #[must_use]
    pub fn validate(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut groups: Vec<&Element> = self
            .elements
            .values()
            .filter(|e| e.children().is_some())
            .collect();
        groups.sort_by_key(|e| e.id);
        for group in groups {
            for child in group.children().unwrap_or_default() {
                if !self.elements.contains_key(child) {
                    issues.push(IntegrityIssue::DanglingChild {
                        group: group.id,
                        child: *child,
                    });
                }
            }
            if self.descendants(group.id).contains(&group.id) {
                issues.push(IntegrityIssue::GroupCycle { group: group.id });
            }
        }
        for id in &self.selection {
            if !self.elements.contains_key(id) {
                issues.push(IntegrityIssue::DanglingSelection { id: *id });
            }
        }
        issues
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Insert `element`, overwriting any element with the same id.
    ///
    /// # Errors
    ///
    /// With `strict_groups` enabled, returns [`CanvasError::DanglingChild`]
    /// or [`CanvasError::GroupCycle`] for a group that would break
    /// group integrity. Otherwise never fails.
    pub fn add_element(&mut self, element: Element) -> CanvasResult<ElementId> {
        let id = element.id;
        if self.config.strict_groups {
            if let Some(children) = element.children() {
                self.check_group(id, children)?;
            }
        }
        if !self.stack.contains_key(&id) {
            self.stack.insert(id, self.next_stack);
            self.next_stack += 1;
        }
        tracing::debug!("add {} element {id}", element.kind.name());
        self.elements.insert(id, element.clone());
        self.bounds_dirty = true;
        self.commit(Mutation::AddElement { element });
        Ok(id)
    }

    /// Merge `patch` into element `id`. Returns whether anything was applied.
    ///
    /// Unknown ids are ignored. With `strict_groups` enabled, a patch that
    /// would break group integrity is rejected and logged.
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        if !self.apply_patch(id, patch.clone()) {
            return false;
        }
        self.bounds_dirty = true;
        self.commit(Mutation::UpdateElement { id, patch });
        true
    }

    /// Apply several patches as one step. Returns how many were applied.
    ///
    /// Patches to distinct ids commute. Unknown ids are skipped.
    pub fn update_elements(&mut self, updates: Vec<ElementUpdate>) -> usize {
        let mut applied = Vec::with_capacity(updates.len());
        for update in updates {
            if self.apply_patch(update.id, update.patch.clone()) {
                applied.push(update);
            }
        }
        let count = applied.len();
        if count > 0 {
            self.bounds_dirty = true;
            self.commit(Mutation::UpdateElements { updates: applied });
        }
        count
    }

    /// Remove element `id` and drop it from the selection. Returns whether
    /// anything changed. Groups referencing `id` keep the dangling child.
    pub fn delete_element(&mut self, id: ElementId) -> bool {
        let removed = self.elements.remove(&id).is_some();
        self.stack.remove(&id);
        let before = self.selection.len();
        self.selection.retain(|selected| *selected != id);
        let deselected = self.selection.len() != before;
        if !removed && !deselected {
            tracing::trace!("delete of unknown element {id} ignored");
            return false;
        }
        self.bounds_dirty = true;
        self.commit(Mutation::DeleteElement { id });
        true
    }

    /// Replace the selection. Duplicates are collapsed; existence is not
    /// checked.
    pub fn set_selected_elements(&mut self, ids: Vec<ElementId>) {
        let mut seen = HashSet::with_capacity(ids.len());
        let ids: Vec<ElementId> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        self.selection.clone_from(&ids);
        self.commit(Mutation::SetSelection { ids });
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        if self.selection.is_empty() {
            return;
        }
        self.selection.clear();
        self.commit(Mutation::SetSelection { ids: Vec::new() });
    }

    /// Shallow-merge `patch` into the viewport.
    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        patch.clone().apply(&mut self.viewport);
        if patch.canvas_size.is_some() {
            self.bounds_dirty = true;
        }
        self.commit(Mutation::SetViewport { patch });
    }

    /// Switch tools. Any draw in progress is abandoned, never committed.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool.drawing {
            tracing::debug!("abandoning {:?} draw for {tool:?}", self.tool.active_tool);
        }
        self.tool = ToolState {
            active_tool: tool,
            ..ToolState::default()
        };
        self.commit(Mutation::SetTool { tool });
    }

    /// Set the drawing flag. Only the points provided overwrite.
    pub fn set_drawing_state(
        &mut self,
        drawing: bool,
        start_point: Option<Point>,
        current_point: Option<Point>,
    ) {
        self.tool.drawing = drawing;
        if let Some(start) = start_point {
            self.tool.start_point = Some(start);
        }
        if let Some(current) = current_point {
            self.tool.current_point = Some(current);
        }
        self.commit(Mutation::SetDrawingState {
            drawing,
            start_point,
            current_point,
        });
    }

    /// Set or clear the draw preview. The preview never enters the element
    /// map.
    pub fn set_preview(&mut self, preview: Option<Element>) {
        self.tool.preview.clone_from(&preview);
        self.commit(Mutation::SetPreview { element: preview });
    }

    /// Set the creating flag.
    pub fn set_creating(&mut self, creating: bool) {
        self.tool.is_creating = creating;
        self.commit(Mutation::SetCreating { creating });
    }

    /// Replace the active guidelines.
    pub fn set_guidelines(&mut self, guidelines: Vec<Guideline>) {
        self.viewport.snapping.guidelines.clone_from(&guidelines);
        self.commit(Mutation::SetGuidelines { guidelines });
    }

    /// Remove every active guideline.
    pub fn clear_guidelines(&mut self) {
        if self.viewport.snapping.guidelines.is_empty() {
            return;
        }
        self.set_guidelines(Vec::new());
    }

    /// Bulk-overwrite the provided fields. No invariant is checked; the
    /// caller supplies a consistent state.
    pub fn load_state(&mut self, patch: StatePatch) {
        if let Some(elements) = &patch.elements {
            self.elements.clone_from(elements);
            self.rebuild_stack();
            self.bounds_dirty = true;
        }
        if let Some(selection) = &patch.selected_element_ids {
            self.selection.clone_from(selection);
        }
        if let Some(viewport) = &patch.viewport {
            self.viewport = viewport.clone();
            self.bounds_dirty = true;
        }
        if let Some(tool) = &patch.tool {
            self.tool = tool.clone();
        }
        tracing::debug!("loaded state with {} elements", self.elements.len());
        self.commit(Mutation::LoadState { patch });
    }

    /// Reset elements, selection, viewport and tool to their initial values.
    pub fn clear_canvas(&mut self) {
        self.elements.clear();
        self.stack.clear();
        self.next_stack = 0;
        self.selection.clear();
        self.viewport = self.initial_viewport.clone();
        self.tool = ToolState::default();
        self.bounds_dirty = true;
        self.commit(Mutation::ClearCanvas);
    }

    // ------------------------------------------------------------------
    // Journal and observers
    // ------------------------------------------------------------------

    /// Call `observer` after every mutation with the journal record and the
    /// updated store.
    pub fn observe(
        &mut self,
        observer: impl FnMut(&MutationRecord, &SceneStore) + 'static,
    ) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns whether it was registered.
    pub fn unobserve(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Drain the journal, oldest first.
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.journal.drain()
    }

    fn commit(&mut self, mutation: Mutation) {
        let now = (self.clock)();
        tracing::trace!("store mutation {}", mutation.name());
        let record = self.journal.record(mutation, now);
        if self.observers.is_empty() {
            return;
        }
        let record = record.clone();
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in &mut observers {
            observer(&record, self);
        }
        self.observers = observers;
    }

    /// Merge without journaling. Returns whether the patch was applied.
    fn apply_patch(&mut self, id: ElementId, patch: ElementPatch) -> bool {
        if !self.elements.contains_key(&id) {
            tracing::trace!("update of unknown element {id} ignored");
            return false;
        }
        if self.config.strict_groups {
            if let Some(children) = patch.kind.as_ref().and_then(group_children_of) {
                if let Err(e) = self.check_group(id, children) {
                    tracing::warn!("rejected update to {id}: {e}");
                    return false;
                }
            }
        }
        let now = (self.clock)();
        if let Some(element) = self.elements.get_mut(&id) {
            patch.apply(element, now);
        }
        true
    }

    /// Whether group `id` with `children` keeps every child present and stays
    /// acyclic.
    fn check_group(&self, id: ElementId, children: &[ElementId]) -> CanvasResult<()> {
        for child in children {
            if *child == id {
                return Err(CanvasError::GroupCycle(id.to_string()));
            }
            if !self.elements.contains_key(child) {
                return Err(CanvasError::DanglingChild(child.to_string()));
            }
        }
        let mut seen = HashSet::new();
        let mut stack = children.to_vec();
        while let Some(next) = stack.pop() {
            if next == id {
                return Err(CanvasError::GroupCycle(id.to_string()));
            }
            if !seen.insert(next) {
                continue;
            }
            if let Some(grandchildren) = self.elements.get(&next).and_then(Element::children) {
                stack.extend_from_slice(grandchildren);
            }
        }
        Ok(())
    }

    /// Paint order for a bulk-loaded map: creation time, then id.
    fn rebuild_stack(&mut self) {
        let mut order: Vec<(u64, ElementId)> = self
            .elements
            .values()
            .map(|e| (e.created_at, e.id))
            .collect();
        order.sort_unstable();
        self.stack = order
            .into_iter()
            .zip(0_u64..)
            .map(|((_, id), z)| (id, z))
            .collect();
        self.next_stack = self.stack.len() as u64;
    }
}

fn group_children_of(kind: &crate::element::ElementKind) -> Option<&[ElementId]> {
    match kind {
        crate::element::ElementKind::Group { children } => Some(children),
        _ => None,
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("elements", &self.elements.len())
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("tool", &self.tool)
            .field("journal", &self.journal.len())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
