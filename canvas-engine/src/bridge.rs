//! Input bridge: native surface events in, canonical bus events out.
//!
//! The bridge is a pure translation layer. It resolves world coordinates
//! through the current viewport, normalizes modifiers and publishes on the
//! bus in delivery order. Drag, selection and tool decisions belong to bus
//! subscribers.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::bus::EventBus;
use crate::event::{
    CanvasEvent, KeyPhase, KeyboardEvent, Modifiers, PointerEvent, RawKeyEvent, RawPointerEvent,
    SurfaceEventKind, WheelEvent,
};
use crate::geometry::Point;
use crate::store::SceneStore;
use crate::surface::{KeyboardSource, ListenerId, PointerSurface, SurfaceProvider};
use crate::transform::CoordinateTransform;
use crate::viewport::Viewport;
use crate::{CanvasError, CanvasResult};

/// Read access to the transform the bridge should use for world points.
pub trait ViewportSource {
    /// Current screen/world transform, canvas origin at `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns an error when the viewport is unusable or cannot be read.
    fn transform(&self) -> CanvasResult<CoordinateTransform>;
}

impl ViewportSource for RefCell<SceneStore> {
    fn transform(&self) -> CanvasResult<CoordinateTransform> {
        let store = self.try_borrow().map_err(|_| CanvasError::StoreBusy)?;
        store.viewport().transform()
    }
}

impl ViewportSource for RefCell<Viewport> {
    fn transform(&self) -> CanvasResult<CoordinateTransform> {
        let viewport = self.try_borrow().map_err(|_| CanvasError::StoreBusy)?;
        viewport.transform()
    }
}

/// Translate a native pointer or wheel event.
#[must_use]
pub fn translate_pointer(
    kind: SurfaceEventKind,
    raw: &RawPointerEvent,
    transform: &CoordinateTransform,
) -> CanvasEvent {
    let screen = Point::new(raw.screen_x, raw.screen_y);
    let world = transform.world_from_screen(screen);
    let modifiers = Modifiers::from_flags(raw.shift_key, raw.ctrl_key, raw.alt_key, raw.meta_key);
    if kind == SurfaceEventKind::Wheel {
        return CanvasEvent::Wheel(WheelEvent {
            screen,
            world,
            buttons: raw.buttons,
            modifiers,
            delta: Point::new(raw.delta_x, raw.delta_y),
            source: *raw,
        });
    }
    CanvasEvent::Pointer(PointerEvent {
        kind,
        screen,
        world,
        buttons: raw.buttons,
        modifiers,
        source: *raw,
    })
}

/// Translate a native key event.
#[must_use]
pub fn translate_key(phase: KeyPhase, raw: &RawKeyEvent) -> CanvasEvent {
    CanvasEvent::Keyboard(KeyboardEvent {
        phase,
        key: raw.key.clone(),
        code: raw.code.clone(),
        modifiers: Modifiers::from_flags(raw.shift_key, raw.ctrl_key, raw.alt_key, raw.meta_key),
        source: raw.clone(),
    })
}

struct PointerBinding {
    surface: Rc<dyn PointerSurface>,
    listeners: Vec<(SurfaceEventKind, ListenerId)>,
}

struct KeyboardBinding {
    source: Rc<dyn KeyboardSource>,
    listeners: Vec<(KeyPhase, ListenerId)>,
}

/// Binds one pointer surface and one keyboard source to an event bus.
pub struct InputBridge {
    bus: Rc<EventBus<CanvasEvent>>,
    viewport: Rc<dyn ViewportSource>,
    pointer: Option<PointerBinding>,
    keyboard: Option<KeyboardBinding>,
}

impl InputBridge {
    /// A detached bridge publishing on `bus`.
    pub fn new(bus: Rc<EventBus<CanvasEvent>>, viewport: Rc<dyn ViewportSource>) -> Self {
        Self {
            bus,
            viewport,
            pointer: None,
            keyboard: None,
        }
    }

    /// Listen to `surface`.
    ///
    /// Attaching the surface that is already attached does nothing. Attaching
    /// a different one detaches the previous surface first. Returns whether
    /// new listeners were registered.
    pub fn attach(&mut self, surface: Rc<dyn PointerSurface>) -> bool {
        if let Some(binding) = &self.pointer {
            if std::ptr::addr_eq(Rc::as_ptr(&binding.surface), Rc::as_ptr(&surface)) {
                tracing::trace!("pointer surface already attached");
                return false;
            }
            self.detach_pointer();
        }

        let weak_surface: Weak<dyn PointerSurface> = Rc::downgrade(&surface);
        let mut listeners = Vec::with_capacity(SurfaceEventKind::ALL.len());
        for kind in SurfaceEventKind::ALL {
            let bus = Rc::clone(&self.bus);
            let viewport = Rc::clone(&self.viewport);
            let weak_surface = weak_surface.clone();
            let id = surface.on(
                kind,
                Rc::new(move |raw: &RawPointerEvent| {
                    let origin = weak_surface.upgrade().map_or(Point::ZERO, |s| s.origin());
                    let transform = resolve_transform(viewport.as_ref()).with_origin(origin);
                    bus.emit(&translate_pointer(kind, raw, &transform));
                }),
            );
            listeners.push((kind, id));
        }
        tracing::debug!("input bridge attached to pointer surface");
        self.pointer = Some(PointerBinding { surface, listeners });
        true
    }

    /// Listen to a keyboard source. Same identity rules as [`Self::attach`].
    pub fn attach_keyboard(&mut self, source: Rc<dyn KeyboardSource>) -> bool {
        if let Some(binding) = &self.keyboard {
            if std::ptr::addr_eq(Rc::as_ptr(&binding.source), Rc::as_ptr(&source)) {
                return false;
            }
            self.detach_keyboard();
        }

        let mut listeners = Vec::with_capacity(2);
        for phase in [KeyPhase::Down, KeyPhase::Up] {
            let bus = Rc::clone(&self.bus);
            let id = source.on(
                phase,
                Rc::new(move |raw: &RawKeyEvent| {
                    bus.emit(&translate_key(phase, raw));
                }),
            );
            listeners.push((phase, id));
        }
        tracing::debug!("input bridge attached to keyboard source");
        self.keyboard = Some(KeyboardBinding { source, listeners });
        true
    }

    /// Attach to whatever surface `provider` currently holds.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::SurfaceMissing`] if the provider is not ready.
    pub fn attach_from(&mut self, provider: &SurfaceProvider<dyn PointerSurface>) -> CanvasResult<()> {
        let surface = provider.get().ok_or_else(|| {
            CanvasError::SurfaceMissing("surface provider is not ready".to_string())
        })?;
        self.attach(surface);
        Ok(())
    }

    /// Remove every registered listener. Safe to call when detached.
    pub fn detach(&mut self) {
        self.detach_pointer();
        self.detach_keyboard();
    }

    fn detach_pointer(&mut self) {
        if let Some(binding) = self.pointer.take() {
            for (kind, id) in binding.listeners {
                binding.surface.off(kind, id);
            }
            tracing::debug!("input bridge detached from pointer surface");
        }
    }

    fn detach_keyboard(&mut self) {
        if let Some(binding) = self.keyboard.take() {
            for (phase, id) in binding.listeners {
                binding.source.off(phase, id);
            }
            tracing::debug!("input bridge detached from keyboard source");
        }
    }

    /// Whether a pointer surface is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.pointer.is_some()
    }

    /// Whether a keyboard source is attached.
    #[must_use]
    pub fn is_keyboard_attached(&self) -> bool {
        self.keyboard.is_some()
    }
}

impl Drop for InputBridge {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for InputBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputBridge")
            .field("attached", &self.is_attached())
            .field("keyboard_attached", &self.is_keyboard_attached())
            .finish_non_exhaustive()
    }
}

/// The viewport transform, or identity if it cannot be used right now.
fn resolve_transform(source: &dyn ViewportSource) -> CoordinateTransform {
    match source.transform() {
        Ok(transform) => transform,
        Err(e) => {
            tracing::error!("viewport unavailable, publishing with identity transform: {e}");
            CoordinateTransform::IDENTITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Topic, BUTTON_PRIMARY};
    use crate::surface::HostSurface;
    use std::cell::Cell;

    fn setup(zoom: f64) -> (Rc<EventBus<CanvasEvent>>, Rc<RefCell<Viewport>>, InputBridge) {
        let bus = Rc::new(EventBus::new());
        let viewport = Rc::new(RefCell::new(Viewport {
            zoom,
            ..Viewport::default()
        }));
        let bridge = InputBridge::new(Rc::clone(&bus), viewport.clone());
        (bus, viewport, bridge)
    }

    fn record(bus: &EventBus<CanvasEvent>, topic: Topic) -> Rc<RefCell<Vec<CanvasEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.on(topic, move |e| sink.borrow_mut().push(e.clone()));
        seen
    }

    #[test]
    fn test_pointer_down_world_point_at_zoom_two() {
        let (bus, _viewport, mut bridge) = setup(2.0);
        let surface = Rc::new(HostSurface::new());
        bridge.attach(surface.clone());
        let seen = record(&bus, Topic::PointerDown);

        surface.pointer(
            SurfaceEventKind::PointerDown,
            &RawPointerEvent::at(200.0, 100.0, BUTTON_PRIMARY),
        );

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].world(), Some(Point::new(100.0, 50.0)));
        assert_eq!(seen[0].screen(), Some(Point::new(200.0, 100.0)));
    }

    #[test]
    fn test_surface_origin_is_subtracted() {
        let (bus, _viewport, mut bridge) = setup(1.0);
        let surface = Rc::new(HostSurface::new());
        surface.set_origin(Point::new(50.0, 20.0));
        bridge.attach(surface.clone());
        let seen = record(&bus, Topic::PointerMove);
        surface.pointer(SurfaceEventKind::PointerMove, &RawPointerEvent::at(60.0, 30.0, 0));
        assert_eq!(seen.borrow()[0].world(), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_attach_same_surface_is_idempotent() {
        let (bus, _viewport, mut bridge) = setup(1.0);
        let surface = Rc::new(HostSurface::new());
        assert!(bridge.attach(surface.clone()));
        assert!(!bridge.attach(surface.clone()));
        assert_eq!(surface.pointer_listener_count(), SurfaceEventKind::ALL.len());

        let seen = record(&bus, Topic::PointerUp);
        surface.pointer(SurfaceEventKind::PointerUp, &RawPointerEvent::default());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_attach_other_surface_detaches_previous() {
        let (_bus, _viewport, mut bridge) = setup(1.0);
        let first = Rc::new(HostSurface::new());
        let second = Rc::new(HostSurface::new());
        bridge.attach(first.clone());
        bridge.attach(second.clone());
        assert_eq!(first.pointer_listener_count(), 0);
        assert_eq!(second.pointer_listener_count(), SurfaceEventKind::ALL.len());
    }

    #[test]
    fn test_detach_twice_is_noop() {
        let (_bus, _viewport, mut bridge) = setup(1.0);
        let surface = Rc::new(HostSurface::new());
        bridge.attach(surface.clone());
        bridge.attach_keyboard(surface.clone());
        bridge.detach();
        bridge.detach();
        assert!(!bridge.is_attached());
        assert_eq!(surface.pointer_listener_count(), 0);
        assert_eq!(surface.key_listener_count(), 0);
    }

    #[test]
    fn test_attach_from_unready_provider_fails() {
        let (_bus, _viewport, mut bridge) = setup(1.0);
        let provider: SurfaceProvider<dyn PointerSurface> = SurfaceProvider::new();
        assert!(matches!(
            bridge.attach_from(&provider),
            Err(CanvasError::SurfaceMissing(_))
        ));
        provider.set_ready(Rc::new(HostSurface::new()));
        assert!(bridge.attach_from(&provider).is_ok());
        assert!(bridge.is_attached());
    }

    #[test]
    fn test_invalid_viewport_still_publishes() {
        let (bus, viewport, mut bridge) = setup(1.0);
        viewport.borrow_mut().zoom = 0.0;
        let surface = Rc::new(HostSurface::new());
        bridge.attach(surface.clone());
        let seen = record(&bus, Topic::PointerDown);
        surface.pointer(SurfaceEventKind::PointerDown, &RawPointerEvent::at(7.0, 9.0, 1));
        assert_eq!(seen.borrow()[0].world(), Some(Point::new(7.0, 9.0)));
    }

    #[test]
    fn test_events_keep_delivery_order() {
        let (bus, _viewport, mut bridge) = setup(1.0);
        let surface = Rc::new(HostSurface::new());
        bridge.attach(surface.clone());
        let order = Rc::new(RefCell::new(Vec::new()));
        for topic in [Topic::PointerDown, Topic::PointerMove, Topic::PointerUp] {
            let order = Rc::clone(&order);
            bus.on(topic, move |e| order.borrow_mut().push(e.topic()));
        }
        surface.pointer(SurfaceEventKind::PointerDown, &RawPointerEvent::at(0.0, 0.0, 1));
        for i in 0..3 {
            surface.pointer(
                SurfaceEventKind::PointerMove,
                &RawPointerEvent::at(f64::from(i), 0.0, 1),
            );
        }
        surface.pointer(SurfaceEventKind::PointerUp, &RawPointerEvent::at(3.0, 0.0, 0));
        assert_eq!(
            *order.borrow(),
            vec![
                Topic::PointerDown,
                Topic::PointerMove,
                Topic::PointerMove,
                Topic::PointerMove,
                Topic::PointerUp
            ]
        );
    }

    #[test]
    fn test_wheel_carries_delta_and_modifiers() {
        let (bus, _viewport, mut bridge) = setup(1.0);
        let surface = Rc::new(HostSurface::new());
        bridge.attach(surface.clone());
        let seen = record(&bus, Topic::Wheel);
        let raw = RawPointerEvent {
            delta_y: -120.0,
            meta_key: true,
            ..RawPointerEvent::at(10.0, 10.0, 0)
        };
        surface.pointer(SurfaceEventKind::Wheel, &raw);
        let seen = seen.borrow();
        let CanvasEvent::Wheel(wheel) = &seen[0] else {
            panic!("expected wheel event");
        };
        assert_eq!(wheel.delta, Point::new(0.0, -120.0));
        assert!(wheel.modifiers.ctrl);
    }

    #[test]
    fn test_keyboard_events_published_under_phase_topic() {
        let (bus, _viewport, mut bridge) = setup(1.0);
        let source = Rc::new(HostSurface::new());
        bridge.attach_keyboard(source.clone());
        assert!(!bridge.attach_keyboard(source.clone()));
        let down = record(&bus, Topic::KeyDown);
        let up = record(&bus, Topic::KeyUp);
        let count = Rc::new(Cell::new(0));
        let raw = RawKeyEvent {
            ctrl_key: true,
            ..RawKeyEvent::key("z", "KeyZ")
        };
        count.set(source.key(KeyPhase::Down, &raw));
        source.key(KeyPhase::Up, &raw);
        assert_eq!(count.get(), 1);
        assert_eq!(down.borrow().len(), 1);
        assert_eq!(up.borrow().len(), 1);
        assert!(down.borrow()[0].modifiers().ctrl);
    }
}
