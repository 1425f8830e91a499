//! Active tool and the drawing lifecycle.
//!
//! [`ToolState`] is the persisted part and lives in the [`SceneStore`].
//! [`ToolMachine`] interprets canonical input against it:
//!
//! ```text
//! Idle --down(creation tool, primary)--> Drawing
//! Drawing --move--> Drawing (preview follows the pointer)
//! Drawing --up--> Idle (commit if large enough, else discard)
//! any --set_tool--> Idle (draw abandoned)
//! ```
//!
//! The select tool additionally hit-tests, toggles selection and drags the
//! selection with live snapping; the hand tool pans.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, MinSizePolicy, WheelConfig, ZoomLimits};
use crate::element::{
    Element, ElementId, ElementKind, ElementPatch, Frame, ImageContent, TextContent,
};
use crate::event::{KeyPhase, KeyboardEvent, PointerEvent, WheelEvent};
use crate::geometry::{Bounds, Point};
use crate::snapping::{SnapEngine, SnapMode};
use crate::store::{ElementUpdate, SceneStore};
use crate::viewport::ViewportPatch;

/// Interaction tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Click and drag selection.
    #[default]
    Select,
    /// Drag to pan.
    Hand,
    /// Draw rectangles.
    Rect,
    /// Draw ellipses.
    Circle,
    /// Draw triangles.
    Triangle,
    /// Draw text boxes.
    Text,
    /// Draw image placeholders.
    Image,
}

impl Tool {
    /// Every tool.
    pub const ALL: [Self; 7] = [
        Self::Select,
        Self::Hand,
        Self::Rect,
        Self::Circle,
        Self::Triangle,
        Self::Text,
        Self::Image,
    ];

    /// Whether pointer-down with this tool starts a draw.
    #[must_use]
    pub const fn is_creation_tool(self) -> bool {
        matches!(
            self,
            Self::Rect | Self::Circle | Self::Triangle | Self::Text | Self::Image
        )
    }

    /// Single-letter keyboard shortcut.
    #[must_use]
    pub const fn shortcut(self) -> char {
        match self {
            Self::Select => 'v',
            Self::Hand => 'h',
            Self::Rect => 'r',
            Self::Circle => 'o',
            Self::Triangle => 't',
            Self::Text => 'x',
            Self::Image => 'i',
        }
    }

    /// Tool bound to `key`, case-insensitive.
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        Self::ALL.into_iter().find(|tool| tool.shortcut() == c)
    }
}

/// Tool state held by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolState {
    /// Active tool.
    pub active_tool: Tool,
    /// A draw is in progress.
    pub drawing: bool,
    /// World point where the draw started.
    pub start_point: Option<Point>,
    /// Latest world point of the draw.
    pub current_point: Option<Point>,
    /// Element being drawn. Never part of the element map.
    pub preview: Option<Element>,
    /// A creation gesture is in progress.
    pub is_creating: bool,
}

/// Bounds spanned by a draw from `start` to `current`.
///
/// With `square`, the shorter side grows to the longer one, keeping the
/// direction of the drag.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn drawn_bounds(start: Point, current: Point, square: bool) -> Bounds {
    if !square {
        return Bounds::from_corners(start, current);
    }
    let dx = current.x - start.x;
    let dy = current.y - start.y;
    let side = dx.abs().max(dy.abs());
    let corner = Point::new(
        start.x + side.copysign(if dx == 0.0 { 1.0 } else { dx }),
        start.y + side.copysign(if dy == 0.0 { 1.0 } else { dy }),
    );
    Bounds::from_corners(start, corner)
}

/// Element a creation tool would produce over `bounds`. `None` for tools
/// that do not draw.
#[must_use]
pub fn preview_element(tool: Tool, bounds: Bounds) -> Option<Element> {
    let kind = match tool {
        Tool::Rect => ElementKind::Rect {
            corner_radius: None,
        },
        Tool::Circle => ElementKind::Circle,
        Tool::Triangle => ElementKind::Triangle,
        Tool::Text => ElementKind::Text(TextContent::plain("")),
        Tool::Image => ElementKind::Image(ImageContent::default()),
        Tool::Select | Tool::Hand => return None,
    };
    Some(Element::new(kind).with_frame(Frame::from_bounds(bounds)))
}

/// In-flight gesture that is not part of the stored tool state.
#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Panning {
        last_screen: Point,
    },
    Dragging {
        origin: Point,
        moving: Vec<ElementId>,
        start_bounds: Bounds,
        start_frames: Vec<(ElementId, Frame)>,
    },
}

/// Interprets canonical input against the store's tool state.
pub struct ToolMachine {
    min_size: MinSizePolicy,
    zoom: ZoomLimits,
    wheel: WheelConfig,
    snap: SnapEngine,
    gesture: Gesture,
}

impl ToolMachine {
    /// Machine configured from `config`.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            min_size: config.min_size,
            zoom: config.zoom,
            wheel: config.wheel,
            snap: SnapEngine::new(config.snap),
            gesture: Gesture::Idle,
        }
    }

    /// Whether the select tool is dragging elements.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Whether the hand tool is panning.
    #[must_use]
    pub const fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    /// Switch tools, abandoning any draw or drag in place.
    pub fn set_tool(&mut self, store: &mut SceneStore, tool: Tool) {
        self.finish_gesture(store);
        store.set_tool(tool);
    }

    /// Handle pointer-down.
    pub fn pointer_down(&mut self, store: &mut SceneStore, event: &PointerEvent) {
        if !event.is_primary() {
            return;
        }
        let tool = store.tool().active_tool;
        let world = event.world;
        match tool {
            Tool::Select => self.select_down(store, world, event.modifiers.shift),
            Tool::Hand => {
                self.gesture = Gesture::Panning {
                    last_screen: event.screen,
                };
            }
            _ => {
                store.set_drawing_state(true, Some(world), Some(world));
                store.set_creating(true);
                store.set_preview(preview_element(tool, Bounds::from_corners(world, world)));
                tracing::debug!("started {tool:?} draw at ({}, {})", world.x, world.y);
            }
        }
    }

    /// Handle pointer-move.
    pub fn pointer_move(&mut self, store: &mut SceneStore, event: &PointerEvent) {
        if store.tool().drawing {
            self.draw_move(store, event.world, event.modifiers.shift);
            return;
        }
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last_screen } => {
                let delta = event.screen.sub(*last_screen);
                *last_screen = event.screen;
                let mut viewport = store.viewport().clone();
                viewport.pan_by_screen(delta, self.zoom);
                store.set_viewport(ViewportPatch::offset(viewport.offset));
            }
            Gesture::Dragging {
                origin,
                moving,
                start_bounds,
                start_frames,
            } => {
                let delta = event.world.sub(*origin);
                let proposed = start_bounds.translate(delta);
                let snapped = self
                    .snap
                    .snap_in_store(store, moving, proposed, SnapMode::Move);
                let total = delta.add(snapped.delta);
                let updates = start_frames
                    .iter()
                    .map(|(id, frame)| {
                        ElementUpdate::new(
                            *id,
                            ElementPatch::position(frame.x + total.x, frame.y + total.y),
                        )
                    })
                    .collect();
                store.update_elements(updates);
                if store.viewport().snapping.show_guidelines {
                    store.set_guidelines(snapped.guidelines);
                } else {
                    store.clear_guidelines();
                }
            }
        }
    }

    /// Handle pointer-up or pointer-up-outside.
    pub fn pointer_up(&mut self, store: &mut SceneStore, event: &PointerEvent) {
        if store.tool().drawing {
            self.draw_move(store, event.world, event.modifiers.shift);
            self.commit_draw(store);
            return;
        }
        if self.is_dragging() {
            store.clear_guidelines();
        }
        self.gesture = Gesture::Idle;
    }

    /// Handle a wheel event: ctrl zooms around the cursor, otherwise pan.
    pub fn wheel(&mut self, store: &mut SceneStore, event: &WheelEvent) {
        let mut viewport = store.viewport().clone();
        if event.modifiers.ctrl {
            let zoom = self.zoom.clamp(viewport.zoom);
            let anchor = Point::new(
                (event.world.x + viewport.offset.x) * zoom,
                (event.world.y + viewport.offset.y) * zoom,
            );
            let factor = (-event.delta.y * self.wheel.zoom_speed).exp();
            viewport.zoom_at(anchor, factor, self.zoom);
            store.set_viewport(ViewportPatch {
                zoom: Some(viewport.zoom),
                offset: Some(viewport.offset),
                ..ViewportPatch::default()
            });
        } else {
            viewport.pan_by_screen(Point::new(-event.delta.x, -event.delta.y), self.zoom);
            store.set_viewport(ViewportPatch::offset(viewport.offset));
        }
    }

    /// Handle a key event. Returns whether the key was consumed.
    pub fn key(&mut self, store: &mut SceneStore, event: &KeyboardEvent) -> bool {
        if event.phase != KeyPhase::Down {
            return false;
        }
        match event.key.as_str() {
            "Escape" => self.cancel(store),
            "Delete" | "Backspace" => {
                if store.tool().drawing || self.is_dragging() {
                    return false;
                }
                let ids = store.selected_ids().to_vec();
                for id in &ids {
                    store.delete_element(*id);
                }
                !ids.is_empty()
            }
            key => {
                let m = event.modifiers;
                if m.ctrl || m.alt || m.meta {
                    return false;
                }
                let Some(tool) = Tool::from_shortcut(key) else {
                    return false;
                };
                self.set_tool(store, tool);
                true
            }
        }
    }

    /// Abandon a draw, or revert a drag to where it started. Returns whether
    /// anything was cancelled.
    pub fn cancel(&mut self, store: &mut SceneStore) -> bool {
        let gesture = std::mem::take(&mut self.gesture);
        if let Gesture::Dragging { start_frames, .. } = gesture {
            let updates = start_frames
                .into_iter()
                .map(|(id, frame)| ElementUpdate::new(id, ElementPatch::position(frame.x, frame.y)))
                .collect();
            store.update_elements(updates);
            store.clear_guidelines();
            return true;
        }
        if store.tool().drawing {
            store.set_tool(store.tool().active_tool);
            return true;
        }
        matches!(gesture, Gesture::Panning { .. })
    }

    fn finish_gesture(&mut self, store: &mut SceneStore) {
        if self.is_dragging() {
            store.clear_guidelines();
        }
        self.gesture = Gesture::Idle;
    }

    fn select_down(&mut self, store: &mut SceneStore, world: Point, shift: bool) {
        let hit = store.element_at(world).map(|e| e.id);
        let Some(hit) = hit else {
            if !shift {
                store.clear_selection();
            }
            return;
        };
        if shift {
            let mut ids = store.selected_ids().to_vec();
            if let Some(index) = ids.iter().position(|id| *id == hit) {
                ids.remove(index);
            } else {
                ids.push(hit);
            }
            store.set_selected_elements(ids);
            return;
        }
        if !store.is_selected(hit) {
            store.set_selected_elements(vec![hit]);
        }
        self.begin_drag(store, world);
    }

    fn begin_drag(&mut self, store: &SceneStore, origin: Point) {
        let selected: Vec<ElementId> = store.selected_elements().iter().map(|e| e.id).collect();
        let mut moving_set: HashSet<ElementId> = selected.iter().copied().collect();
        for id in &selected {
            moving_set.extend(store.descendants(*id));
        }
        let mut start_frames: Vec<(ElementId, Frame)> = moving_set
            .iter()
            .filter_map(|id| store.element(*id).map(|e| (*id, e.frame)))
            .collect();
        start_frames.sort_by_key(|(id, _)| *id);

        let leaf_bounds = start_frames
            .iter()
            .filter_map(|(id, _)| store.element(*id))
            .filter(|e| e.children().is_none())
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(&b));
        let Some(start_bounds) = leaf_bounds else {
            return;
        };
        tracing::debug!("dragging {} elements", start_frames.len());
        self.gesture = Gesture::Dragging {
            origin,
            moving: selected,
            start_bounds,
            start_frames,
        };
    }

    fn draw_move(&self, store: &mut SceneStore, world: Point, square: bool) {
        let Some(start) = store.tool().start_point else {
            return;
        };
        let bounds = drawn_bounds(start, world, square);
        store.set_drawing_state(true, None, Some(world));
        let preview = store
            .tool()
            .preview
            .clone()
            .map(|p| p.with_frame(Frame::from_bounds(bounds)));
        store.set_preview(preview);
    }

    fn commit_draw(&self, store: &mut SceneStore) {
        let tool = store.tool().active_tool;
        let preview = store.tool().preview.clone();
        // Back to idle with the same tool.
        store.set_tool(tool);
        let Some(element) = preview else {
            return;
        };
        let bounds = element.frame.rect();
        if !self.min_size.accepts(&bounds) {
            tracing::debug!(
                "discarded {tool:?} draw of {}x{}",
                bounds.width,
                bounds.height
            );
            return;
        }
        match store.add_element(element) {
            Ok(id) => {
                store.set_selected_elements(vec![id]);
                tracing::debug!("committed {tool:?} element {id}");
            }
            Err(e) => tracing::warn!("failed to commit {tool:?} draw: {e}"),
        }
    }
}

impl Default for ToolMachine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl fmt::Debug for ToolMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolMachine")
            .field("min_size", &self.min_size)
            .field("zoom", &self.zoom)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Modifiers, RawKeyEvent, RawPointerEvent, SurfaceEventKind};

    fn pointer(kind: SurfaceEventKind, x: f64, y: f64, shift: bool) -> PointerEvent {
        let raw = RawPointerEvent {
            shift_key: shift,
            ..RawPointerEvent::at(x, y, 1)
        };
        PointerEvent {
            kind,
            screen: Point::new(x, y),
            world: Point::new(x, y),
            buttons: 1,
            modifiers: Modifiers::from_flags(shift, false, false, false),
            source: raw,
        }
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        pointer(SurfaceEventKind::PointerDown, x, y, false)
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        pointer(SurfaceEventKind::PointerMove, x, y, false)
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        pointer(SurfaceEventKind::PointerUp, x, y, false)
    }

    fn key(k: &str) -> KeyboardEvent {
        KeyboardEvent {
            phase: KeyPhase::Down,
            key: k.to_string(),
            code: String::new(),
            modifiers: Modifiers::default(),
            source: RawKeyEvent::key(k, ""),
        }
    }

    fn machine_and_store() -> (ToolMachine, SceneStore) {
        (ToolMachine::default(), SceneStore::new())
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(Tool::from_shortcut("r"), Some(Tool::Rect));
        assert_eq!(Tool::from_shortcut("O"), Some(Tool::Circle));
        assert_eq!(Tool::from_shortcut("rr"), None);
        assert_eq!(Tool::from_shortcut(""), None);
        for tool in Tool::ALL {
            assert_eq!(Tool::from_shortcut(&tool.shortcut().to_string()), Some(tool));
        }
    }

    #[test]
    fn test_square_constraint_keeps_direction() {
        let b = drawn_bounds(Point::new(10.0, 10.0), Point::new(0.0, 40.0), true);
        assert_eq!(b, Bounds::new(-20.0, 10.0, 30.0, 30.0));
        let free = drawn_bounds(Point::new(10.0, 10.0), Point::new(0.0, 40.0), false);
        assert_eq!(free, Bounds::new(0.0, 10.0, 10.0, 30.0));
    }

    #[test]
    fn test_draw_commits_and_selects() {
        let (mut tools, mut store) = machine_and_store();
        tools.set_tool(&mut store, Tool::Rect);
        tools.pointer_down(&mut store, &down(10.0, 10.0));
        assert!(store.tool().drawing);
        assert!(store.tool().is_creating);
        assert!(store.is_empty());

        tools.pointer_move(&mut store, &mv(50.0, 30.0));
        let preview = store.tool().preview.clone().expect("preview");
        assert_eq!(preview.frame.rect(), Bounds::new(10.0, 10.0, 40.0, 20.0));
        assert!(store.element(preview.id).is_none());

        tools.pointer_up(&mut store, &up(60.0, 30.0));
        assert_eq!(store.len(), 1);
        let committed = store.selected_elements();
        assert_eq!(committed.len(), 1);
        assert_eq!(committed[0].frame.rect(), Bounds::new(10.0, 10.0, 50.0, 20.0));
        assert!(!store.tool().drawing);
        assert!(!store.tool().is_creating);
        assert!(store.tool().preview.is_none());
        assert_eq!(store.tool().active_tool, Tool::Rect);
    }

    #[test]
    fn test_zero_size_draw_is_discarded() {
        let (mut tools, mut store) = machine_and_store();
        tools.set_tool(&mut store, Tool::Circle);
        tools.pointer_down(&mut store, &down(10.0, 10.0));
        tools.pointer_up(&mut store, &up(10.0, 40.0));
        assert!(store.is_empty());
        assert!(!store.tool().drawing);
    }

    #[test]
    fn test_switching_tools_never_commits() {
        let (mut tools, mut store) = machine_and_store();
        tools.set_tool(&mut store, Tool::Triangle);
        tools.pointer_down(&mut store, &down(0.0, 0.0));
        tools.pointer_move(&mut store, &mv(100.0, 100.0));
        tools.set_tool(&mut store, Tool::Select);
        assert!(store.is_empty());
        assert!(!store.tool().drawing);
        assert!(store.tool().preview.is_none());
    }

    #[test]
    fn test_secondary_button_does_not_draw() {
        let (mut tools, mut store) = machine_and_store();
        tools.set_tool(&mut store, Tool::Rect);
        let mut event = down(0.0, 0.0);
        event.buttons = crate::event::BUTTON_SECONDARY;
        tools.pointer_down(&mut store, &event);
        assert!(!store.tool().drawing);
    }

    #[test]
    fn test_click_selection_and_shift_toggle() {
        let (mut tools, mut store) = machine_and_store();
        let a = store.add_element(Element::rect(0.0, 0.0, 10.0, 10.0)).expect("add");
        let b = store.add_element(Element::rect(100.0, 0.0, 10.0, 10.0)).expect("add");

        tools.pointer_down(&mut store, &down(5.0, 5.0));
        tools.pointer_up(&mut store, &up(5.0, 5.0));
        assert_eq!(store.selected_ids(), &[a]);

        tools.pointer_down(&mut store, &pointer(SurfaceEventKind::PointerDown, 105.0, 5.0, true));
        assert_eq!(store.selected_ids(), &[a, b]);
        tools.pointer_down(&mut store, &pointer(SurfaceEventKind::PointerDown, 5.0, 5.0, true));
        assert_eq!(store.selected_ids(), &[b]);

        tools.pointer_down(&mut store, &down(500.0, 500.0));
        assert!(store.selected_ids().is_empty());
    }

    #[test]
    fn test_drag_moves_selection_and_snaps() {
        let (mut tools, mut store) = machine_and_store();
        store.set_viewport(ViewportPatch {
            canvas_size: Some(crate::geometry::Size::new(10_000.0, 10_000.0)),
            ..ViewportPatch::default()
        });
        let anchor = store.add_element(Element::rect(200.0, 0.0, 50.0, 50.0)).expect("add");
        let moving = store.add_element(Element::rect(0.0, 300.0, 50.0, 50.0)).expect("add");

        tools.pointer_down(&mut store, &down(10.0, 310.0));
        assert!(tools.is_dragging());
        // Proposed left edge lands at 197, three units from the anchor's edge.
        tools.pointer_move(&mut store, &mv(207.0, 310.0));
        let frame = store.element(moving).expect("moving").frame;
        assert!((frame.x - 200.0).abs() < 1e-9);
        assert!((frame.y - 300.0).abs() < 1e-9);
        let guides = &store.viewport().snapping.guidelines;
        assert!(!guides.is_empty());
        assert!(guides.iter().all(|g| g.target_element_id == Some(anchor)));

        tools.pointer_up(&mut store, &up(207.0, 310.0));
        assert!(!tools.is_dragging());
        assert!(store.viewport().snapping.guidelines.is_empty());
    }

    #[test]
    fn test_escape_reverts_drag() {
        let (mut tools, mut store) = machine_and_store();
        let id = store.add_element(Element::rect(0.0, 0.0, 10.0, 10.0)).expect("add");
        tools.pointer_down(&mut store, &down(5.0, 5.0));
        tools.pointer_move(&mut store, &mv(400.0, 700.0));
        assert!(tools.key(&mut store, &key("Escape")));
        let frame = store.element(id).expect("present").frame;
        assert_eq!((frame.x, frame.y), (0.0, 0.0));
        assert!(!tools.is_dragging());
    }

    #[test]
    fn test_hand_tool_pans() {
        let (mut tools, mut store) = machine_and_store();
        store.set_viewport(ViewportPatch::zoom(2.0));
        tools.set_tool(&mut store, Tool::Hand);
        tools.pointer_down(&mut store, &down(100.0, 100.0));
        tools.pointer_move(&mut store, &mv(140.0, 80.0));
        tools.pointer_up(&mut store, &up(140.0, 80.0));
        assert_eq!(store.viewport().offset, Point::new(20.0, -10.0));
        assert!(!tools.is_panning());
    }

    #[test]
    fn test_ctrl_wheel_zooms_around_cursor() {
        let (mut tools, mut store) = machine_and_store();
        let raw = RawPointerEvent {
            ctrl_key: true,
            delta_y: -100.0,
            ..RawPointerEvent::at(200.0, 100.0, 0)
        };
        let event = WheelEvent {
            screen: Point::new(200.0, 100.0),
            world: Point::new(200.0, 100.0),
            buttons: 0,
            modifiers: Modifiers::from_flags(false, true, false, false),
            delta: Point::new(0.0, -100.0),
            source: raw,
        };
        tools.wheel(&mut store, &event);
        let viewport = store.viewport();
        assert!(viewport.zoom > 1.0);
        let transform = viewport.transform().expect("valid");
        let under = transform.world_from_screen(Point::new(200.0, 100.0));
        assert!((under.x - 200.0).abs() < 1e-9);
        assert!((under.y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_plain_wheel_pans() {
        let (mut tools, mut store) = machine_and_store();
        let event = WheelEvent {
            screen: Point::ZERO,
            world: Point::ZERO,
            buttons: 0,
            modifiers: Modifiers::default(),
            delta: Point::new(10.0, 30.0),
            source: RawPointerEvent::default(),
        };
        tools.wheel(&mut store, &event);
        assert_eq!(store.viewport().offset, Point::new(-10.0, -30.0));
    }

    #[test]
    fn test_keyboard_delete_and_tool_letters() {
        let (mut tools, mut store) = machine_and_store();
        let id = store.add_element(Element::rect(0.0, 0.0, 10.0, 10.0)).expect("add");
        store.set_selected_elements(vec![id]);
        assert!(tools.key(&mut store, &key("Delete")));
        assert!(store.is_empty());
        assert!(store.selected_ids().is_empty());

        assert!(tools.key(&mut store, &key("r")));
        assert_eq!(store.tool().active_tool, Tool::Rect);

        let mut with_ctrl = key("v");
        with_ctrl.modifiers = Modifiers::from_flags(false, true, false, false);
        assert!(!tools.key(&mut store, &with_ctrl));
        assert_eq!(store.tool().active_tool, Tool::Rect);
    }

    #[test]
    fn test_escape_abandons_draw() {
        let (mut tools, mut store) = machine_and_store();
        tools.set_tool(&mut store, Tool::Rect);
        tools.pointer_down(&mut store, &down(0.0, 0.0));
        tools.pointer_move(&mut store, &mv(30.0, 30.0));
        assert!(tools.key(&mut store, &key("Escape")));
        assert!(!store.tool().drawing);
        tools.pointer_up(&mut store, &up(30.0, 30.0));
        assert!(store.is_empty());
    }
}
