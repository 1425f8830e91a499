//! Native input surfaces and their late-binding provider.
//!
//! A [`PointerSurface`] delivers pointer and wheel events from whatever the
//! canvas is drawn into; a [`KeyboardSource`] delivers window-level key
//! events. The engine never talks to a platform directly. Hosts either
//! implement the traits over their own event loop or feed a [`HostSurface`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::event::{KeyPhase, RawKeyEvent, RawPointerEvent, SurfaceEventKind};
use crate::geometry::Point;

/// Token for one listener registered on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback registered for pointer and wheel events.
pub type PointerListener = Rc<dyn Fn(&RawPointerEvent)>;

/// Callback registered for key events.
pub type KeyListener = Rc<dyn Fn(&RawKeyEvent)>;

/// A pointer/wheel capable render surface.
pub trait PointerSurface {
    /// Register `listener` for `kind`.
    fn on(&self, kind: SurfaceEventKind, listener: PointerListener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn off(&self, kind: SurfaceEventKind, id: ListenerId);

    /// Canvas origin in the coordinate space of delivered events.
    fn origin(&self) -> Point {
        Point::ZERO
    }
}

/// A window-level keyboard event source.
pub trait KeyboardSource {
    /// Register `listener` for `phase`.
    fn on(&self, phase: KeyPhase, listener: KeyListener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn off(&self, phase: KeyPhase, id: ListenerId);
}

/// Listener table keyed by event kind.
struct Listeners<K, L> {
    by_kind: RefCell<HashMap<K, Vec<(ListenerId, L)>>>,
}

impl<K: Copy + Eq + Hash, L: Clone> Listeners<K, L> {
    fn new() -> Self {
        Self {
            by_kind: RefCell::new(HashMap::new()),
        }
    }

    fn add(&self, kind: K, id: ListenerId, listener: L) {
        self.by_kind
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push((id, listener));
    }

    fn remove(&self, kind: K, id: ListenerId) {
        let mut by_kind = self.by_kind.borrow_mut();
        if let Some(list) = by_kind.get_mut(&kind) {
            list.retain(|(existing, _)| *existing != id);
            if list.is_empty() {
                by_kind.remove(&kind);
            }
        }
    }

    /// Listeners for `kind` in registration order, detached from the table.
    fn snapshot(&self, kind: K) -> Vec<L> {
        self.by_kind
            .borrow()
            .get(&kind)
            .map(|list| list.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.by_kind.borrow().values().map(Vec::len).sum()
    }
}

/// A surface fed programmatically by its host.
///
/// Embedders that receive input through a foreign boundary (a JS glue layer,
/// a test harness, a replay file) push events in with [`HostSurface::pointer`]
/// and [`HostSurface::key`]; listeners run synchronously in registration
/// order.
pub struct HostSurface {
    origin: Cell<Point>,
    next_id: Cell<u64>,
    pointer: Listeners<SurfaceEventKind, PointerListener>,
    keys: Listeners<KeyPhase, KeyListener>,
}

impl HostSurface {
    /// A surface with its canvas origin at `(0, 0)`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Cell::new(Point::ZERO),
            next_id: Cell::new(1),
            pointer: Listeners::new(),
            keys: Listeners::new(),
        }
    }

    /// Move the canvas origin, e.g. after the host layout changed.
    pub fn set_origin(&self, origin: Point) {
        self.origin.set(origin);
    }

    /// Deliver a pointer or wheel event. Returns the number of listeners run.
    pub fn pointer(&self, kind: SurfaceEventKind, event: &RawPointerEvent) -> usize {
        let listeners = self.pointer.snapshot(kind);
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Deliver a key event. Returns the number of listeners run.
    pub fn key(&self, phase: KeyPhase, event: &RawKeyEvent) -> usize {
        let listeners = self.keys.snapshot(phase);
        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    /// Total registered pointer/wheel listeners.
    #[must_use]
    pub fn pointer_listener_count(&self) -> usize {
        self.pointer.len()
    }

    /// Total registered key listeners.
    #[must_use]
    pub fn key_listener_count(&self) -> usize {
        self.keys.len()
    }

    fn allocate(&self) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        id
    }
}

impl Default for HostSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HostSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSurface")
            .field("origin", &self.origin.get())
            .field("pointer_listeners", &self.pointer.len())
            .field("key_listeners", &self.keys.len())
            .finish()
    }
}

impl PointerSurface for HostSurface {
    fn on(&self, kind: SurfaceEventKind, listener: PointerListener) -> ListenerId {
        let id = self.allocate();
        self.pointer.add(kind, id, listener);
        id
    }

    fn off(&self, kind: SurfaceEventKind, id: ListenerId) {
        self.pointer.remove(kind, id);
    }

    fn origin(&self) -> Point {
        self.origin.get()
    }
}

impl KeyboardSource for HostSurface {
    fn on(&self, phase: KeyPhase, listener: KeyListener) -> ListenerId {
        let id = self.allocate();
        self.keys.add(phase, id, listener);
        id
    }

    fn off(&self, phase: KeyPhase, id: ListenerId) {
        self.keys.remove(phase, id);
    }
}

type Pending<S> = Vec<Box<dyn FnOnce(Rc<S>)>>;

enum ProviderState<S: ?Sized> {
    Uninitialized { pending: Pending<S> },
    Ready(Rc<S>),
}

/// Two-phase holder for a surface that becomes available after the engine
/// is built.
///
/// Continuations registered with [`SurfaceProvider::when_ready`] run once,
/// either immediately (already ready) or when [`SurfaceProvider::set_ready`]
/// is called.
pub struct SurfaceProvider<S: ?Sized> {
    state: RefCell<ProviderState<S>>,
}

impl<S: ?Sized> SurfaceProvider<S> {
    /// An uninitialized provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(ProviderState::Uninitialized {
                pending: Vec::new(),
            }),
        }
    }

    /// Whether a surface has been provided.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.borrow(), ProviderState::Ready(_))
    }

    /// The surface, if ready.
    #[must_use]
    pub fn get(&self) -> Option<Rc<S>> {
        match &*self.state.borrow() {
            ProviderState::Ready(handle) => Some(Rc::clone(handle)),
            ProviderState::Uninitialized { .. } => None,
        }
    }

    /// Number of continuations waiting for the surface.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        match &*self.state.borrow() {
            ProviderState::Uninitialized { pending } => pending.len(),
            ProviderState::Ready(_) => 0,
        }
    }

    /// Run `callback` with the surface now if ready, otherwise once it is.
    pub fn when_ready(&self, callback: impl FnOnce(Rc<S>) + 'static) {
        let handle = {
            let mut state = self.state.borrow_mut();
            match &mut *state {
                ProviderState::Ready(handle) => Rc::clone(handle),
                ProviderState::Uninitialized { pending } => {
                    pending.push(Box::new(callback));
                    return;
                }
            }
        };
        callback(handle);
    }

    /// Provide the surface and run every pending continuation.
    ///
    /// Calling this again replaces the handle; continuations already run are
    /// not repeated. Returns the number of continuations run.
    pub fn set_ready(&self, handle: Rc<S>) -> usize {
        let previous = self
            .state
            .replace(ProviderState::Ready(Rc::clone(&handle)));
        let pending = match previous {
            ProviderState::Uninitialized { pending } => pending,
            ProviderState::Ready(_) => {
                tracing::debug!("surface provider handle replaced");
                Vec::new()
            }
        };
        let count = pending.len();
        for callback in pending {
            callback(Rc::clone(&handle));
        }
        count
    }

    /// Drop the surface (and any pending continuations).
    pub fn reset(&self) {
        self.state.replace(ProviderState::Uninitialized {
            pending: Vec::new(),
        });
    }
}

impl<S: ?Sized> Default for SurfaceProvider<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> fmt::Debug for SurfaceProvider<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceProvider")
            .field("ready", &self.is_ready())
            .field("pending", &self.pending_count())
            .finish()
    }
}
