//! Canonical input events and the bus topics they are published under.
//!
//! Native surfaces hand the bridge [`RawPointerEvent`]s and [`RawKeyEvent`]s;
//! the bridge turns them into [`CanvasEvent`]s with world coordinates and a
//! normalized modifier record. Each canonical event keeps a copy of its raw
//! source as an escape hatch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bus::{EventBus, SubscriptionId};
use crate::geometry::Point;

/// Primary (usually left) button bit in a `buttons` mask.
pub const BUTTON_PRIMARY: u16 = 1;
/// Secondary (usually right) button bit.
pub const BUTTON_SECONDARY: u16 = 2;
/// Auxiliary (usually middle) button bit.
pub const BUTTON_AUXILIARY: u16 = 4;

/// Stable bus topic names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// `pointerdown`
    #[serde(rename = "pointerdown")]
    PointerDown,
    /// `pointermove`
    #[serde(rename = "pointermove")]
    PointerMove,
    /// `pointerup`
    #[serde(rename = "pointerup")]
    PointerUp,
    /// `pointerupoutside`
    #[serde(rename = "pointerupoutside")]
    PointerUpOutside,
    /// `wheel`
    #[serde(rename = "wheel")]
    Wheel,
    /// `keyboard:down`
    #[serde(rename = "keyboard:down")]
    KeyDown,
    /// `keyboard:up`
    #[serde(rename = "keyboard:up")]
    KeyUp,
}

impl Topic {
    /// Every topic, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerUpOutside,
        Self::Wheel,
        Self::KeyDown,
        Self::KeyUp,
    ];

    /// Wire name of the topic.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::PointerMove => "pointermove",
            Self::PointerUp => "pointerup",
            Self::PointerUpOutside => "pointerupoutside",
            Self::Wheel => "wheel",
            Self::KeyDown => "keyboard:down",
            Self::KeyUp => "keyboard:up",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {s}"))
    }
}

/// Pointer and wheel events a [`crate::surface::PointerSurface`] can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceEventKind {
    /// Button pressed.
    PointerDown,
    /// Pointer moved.
    PointerMove,
    /// Button released over the surface.
    PointerUp,
    /// Button released outside the surface.
    PointerUpOutside,
    /// Wheel or trackpad scroll.
    Wheel,
}

impl SurfaceEventKind {
    /// Every surface event kind.
    pub const ALL: [Self; 5] = [
        Self::PointerDown,
        Self::PointerMove,
        Self::PointerUp,
        Self::PointerUpOutside,
        Self::Wheel,
    ];

    /// Bus topic the translated event is published under.
    #[must_use]
    pub const fn topic(self) -> Topic {
        match self {
            Self::PointerDown => Topic::PointerDown,
            Self::PointerMove => Topic::PointerMove,
            Self::PointerUp => Topic::PointerUp,
            Self::PointerUpOutside => Topic::PointerUpOutside,
            Self::Wheel => Topic::Wheel,
        }
    }
}

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    /// Key pressed.
    Down,
    /// Key released.
    Up,
}

impl KeyPhase {
    /// Bus topic for this phase.
    #[must_use]
    pub const fn topic(self) -> Topic {
        match self {
            Self::Down => Topic::KeyDown,
            Self::Up => Topic::KeyUp,
        }
    }
}

/// Pointer or wheel event as delivered by the native surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RawPointerEvent {
    /// X in pixels, relative to the page/surface.
    pub screen_x: f64,
    /// Y in pixels, relative to the page/surface.
    pub screen_y: f64,
    /// Pressed-buttons bitmask.
    pub buttons: u16,
    /// Shift held.
    pub shift_key: bool,
    /// Control held.
    pub ctrl_key: bool,
    /// Alt/Option held.
    pub alt_key: bool,
    /// Meta/Command held.
    pub meta_key: bool,
    /// Horizontal wheel delta (wheel only).
    pub delta_x: f64,
    /// Vertical wheel delta (wheel only).
    pub delta_y: f64,
}

impl RawPointerEvent {
    /// A plain event at `(x, y)` with the given buttons.
    #[must_use]
    pub fn at(x: f64, y: f64, buttons: u16) -> Self {
        Self {
            screen_x: x,
            screen_y: y,
            buttons,
            ..Self::default()
        }
    }
}

/// Keyboard event as delivered by the native key source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RawKeyEvent {
    /// Logical key value (e.g. `"a"`, `"Escape"`).
    pub key: String,
    /// Physical key code (e.g. `"KeyA"`).
    pub code: String,
    /// Control held.
    pub ctrl_key: bool,
    /// Shift held.
    pub shift_key: bool,
    /// Alt/Option held.
    pub alt_key: bool,
    /// Meta/Command held.
    pub meta_key: bool,
}

impl RawKeyEvent {
    /// An unmodified key event.
    #[must_use]
    pub fn key(key: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            ..Self::default()
        }
    }
}

/// Keyboard modifiers.
///
/// `ctrl` is set when either Control or Meta is held, so shortcuts behave the
/// same on every platform. `meta` still reports the raw Meta key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control or Meta key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl Modifiers {
    /// Normalize raw key flags.
    #[must_use]
    pub const fn from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self {
            shift,
            ctrl: ctrl || meta,
            alt,
            meta,
        }
    }
}

/// A pointer event in canvas terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Which pointer phase.
    pub kind: SurfaceEventKind,
    /// Position as delivered by the surface, pixels.
    pub screen: Point,
    /// Position in world units.
    pub world: Point,
    /// Pressed-buttons bitmask.
    pub buttons: u16,
    /// Normalized modifiers.
    pub modifiers: Modifiers,
    /// The untouched native event.
    pub source: RawPointerEvent,
}

impl PointerEvent {
    /// Whether this event involves the primary button.
    ///
    /// A zero mask counts as primary: pen and touch surfaces often report no
    /// buttons on release.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.buttons == 0 || self.buttons & BUTTON_PRIMARY != 0
    }
}

/// A wheel event in canvas terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Cursor position as delivered by the surface, pixels.
    pub screen: Point,
    /// Cursor position in world units.
    pub world: Point,
    /// Pressed-buttons bitmask.
    pub buttons: u16,
    /// Normalized modifiers.
    pub modifiers: Modifiers,
    /// Scroll delta in pixels.
    pub delta: Point,
    /// The untouched native event.
    pub source: RawPointerEvent,
}

/// A keyboard event in canvas terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Press or release.
    pub phase: KeyPhase,
    /// Logical key value.
    pub key: String,
    /// Physical key code.
    pub code: String,
    /// Normalized modifiers.
    pub modifiers: Modifiers,
    /// The untouched native event.
    pub source: RawKeyEvent,
}

/// Every event the canvas publishes on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CanvasEvent {
    /// Pointer down/move/up/up-outside.
    Pointer(PointerEvent),
    /// Wheel scroll.
    Wheel(WheelEvent),
    /// Key down/up.
    Keyboard(KeyboardEvent),
}

impl CanvasEvent {
    /// Topic this event is published under.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Pointer(e) => e.kind.topic(),
            Self::Wheel(_) => Topic::Wheel,
            Self::Keyboard(e) => e.phase.topic(),
        }
    }

    /// Screen position for pointer and wheel events.
    #[must_use]
    pub const fn screen(&self) -> Option<Point> {
        match self {
            Self::Pointer(e) => Some(e.screen),
            Self::Wheel(e) => Some(e.screen),
            Self::Keyboard(_) => None,
        }
    }

    /// World position for pointer and wheel events.
    #[must_use]
    pub const fn world(&self) -> Option<Point> {
        match self {
            Self::Pointer(e) => Some(e.world),
            Self::Wheel(e) => Some(e.world),
            Self::Keyboard(_) => None,
        }
    }

    /// Modifier state.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        match self {
            Self::Pointer(e) => e.modifiers,
            Self::Wheel(e) => e.modifiers,
            Self::Keyboard(e) => e.modifiers,
        }
    }
}

impl EventBus<CanvasEvent> {
    /// Subscribe to a typed topic.
    pub fn on(&self, topic: Topic, handler: impl Fn(&CanvasEvent) + 'static) -> SubscriptionId {
        self.subscribe(topic.as_str(), handler)
    }

    /// Unsubscribe from a typed topic.
    pub fn off(&self, topic: Topic, id: SubscriptionId) -> bool {
        self.unsubscribe(topic.as_str(), id)
    }

    /// Publish under the event's own topic. Returns the number of handlers run.
    pub fn emit(&self, event: &CanvasEvent) -> usize {
        self.publish(event.topic().as_str(), event)
    }
}
