//! Composition root.
//!
//! [`CanvasEngine`] builds and owns one store, one bus, one bridge and one
//! tool machine, and subscribes the tool machine to the bus. Nothing here is
//! global: two engines in one process share no state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::bridge::{InputBridge, ViewportSource};
use crate::bus::{EventBus, SubscriptionId};
use crate::config::EngineConfig;
use crate::event::{CanvasEvent, SurfaceEventKind, Topic};
use crate::store::{CanvasSnapshot, SceneStore, StatePatch};
use crate::surface::{KeyboardSource, PointerSurface, SurfaceProvider};
use crate::tool::{Tool, ToolMachine};
use crate::viewport::Viewport;
use crate::CanvasResult;

/// The canvas interaction engine.
pub struct CanvasEngine {
    config: EngineConfig,
    store: Rc<RefCell<SceneStore>>,
    bus: Rc<EventBus<CanvasEvent>>,
    bridge: Rc<RefCell<InputBridge>>,
    tools: Rc<RefCell<ToolMachine>>,
    subscriptions: Vec<(Topic, SubscriptionId)>,
}

impl CanvasEngine {
    /// Build an engine from a validated `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::InvalidConfig`] if `config` fails
    /// validation.
    pub fn new(config: EngineConfig) -> CanvasResult<Self> {
        config.validate()?;

        let viewport = Viewport {
            snapping: config.snapping.clone(),
            ..Viewport::default()
        };
        let store = Rc::new(RefCell::new(
            SceneStore::with_config(config.store).with_initial_viewport(viewport),
        ));
        let bus = Rc::new(EventBus::new());
        let source: Rc<dyn ViewportSource> = store.clone();
        let bridge = Rc::new(RefCell::new(InputBridge::new(Rc::clone(&bus), source)));
        let tools = Rc::new(RefCell::new(ToolMachine::new(&config)));

        let mut engine = Self {
            config,
            store,
            bus,
            bridge,
            tools,
            subscriptions: Vec::new(),
        };
        engine.wire_tools();
        tracing::debug!("canvas engine created");
        Ok(engine)
    }

    fn wire_tools(&mut self) {
        for topic in Topic::ALL {
            let store = Rc::clone(&self.store);
            let tools = Rc::clone(&self.tools);
            let id = self.bus.on(topic, move |event| {
                dispatch(&store, &tools, event);
            });
            self.subscriptions.push((topic, id));
        }
    }

    /// Attach the bridge to a pointer surface.
    pub fn attach(&self, surface: Rc<dyn PointerSurface>) -> bool {
        self.bridge.borrow_mut().attach(surface)
    }

    /// Attach the bridge to a keyboard source.
    pub fn attach_keyboard(&self, source: Rc<dyn KeyboardSource>) -> bool {
        self.bridge.borrow_mut().attach_keyboard(source)
    }

    /// Attach as soon as `provider` has a surface.
    ///
    /// If the engine is dropped first, the pending attach does nothing.
    pub fn attach_when_ready(&self, provider: &SurfaceProvider<dyn PointerSurface>) {
        let bridge = Rc::downgrade(&self.bridge);
        provider.when_ready(move |surface| {
            if let Some(bridge) = bridge.upgrade() {
                bridge.borrow_mut().attach(surface);
            } else {
                tracing::debug!("surface became ready after engine teardown");
            }
        });
    }

    /// Detach every input listener.
    pub fn detach(&self) {
        self.bridge.borrow_mut().detach();
    }

    /// Whether a pointer surface is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.bridge.borrow().is_attached()
    }

    /// Shared handle to the store.
    #[must_use]
    pub fn store(&self) -> Rc<RefCell<SceneStore>> {
        Rc::clone(&self.store)
    }

    /// Shared handle to the bus, for additional consumers.
    #[must_use]
    pub fn bus(&self) -> Rc<EventBus<CanvasEvent>> {
        Rc::clone(&self.bus)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Switch tools, abandoning any gesture.
    pub fn set_tool(&self, tool: Tool) {
        let mut store = self.store.borrow_mut();
        self.tools.borrow_mut().set_tool(&mut store, tool);
    }

    /// Abandon any draw or drag.
    pub fn cancel(&self) -> bool {
        let mut store = self.store.borrow_mut();
        self.tools.borrow_mut().cancel(&mut store)
    }

    /// Copy of the full state.
    #[must_use]
    pub fn snapshot(&self) -> CanvasSnapshot {
        self.store.borrow().snapshot()
    }

    /// Replace the state with a JSON snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CanvasError::Serialization`] for malformed input; the
    /// state is left untouched in that case.
    pub fn load_snapshot_json(&self, json: &str) -> CanvasResult<()> {
        let snapshot = CanvasSnapshot::from_json(json)?;
        let mut store = self.store.borrow_mut();
        self.tools.borrow_mut().cancel(&mut store);
        store.load_state(StatePatch::from(snapshot));
        Ok(())
    }
}

/// Route one bus event to the tool machine.
///
/// Events published while the store or the tool machine is already
/// borrowed, for instance by a store observer reacting to a mutation, are
/// dropped with a warning and never replayed. Bus consumers run after this
/// handler returns, so events they publish are delivered normally.
fn dispatch(store: &RefCell<SceneStore>, tools: &RefCell<ToolMachine>, event: &CanvasEvent) {
    let (Ok(mut store), Ok(mut tools)) = (store.try_borrow_mut(), tools.try_borrow_mut()) else {
        tracing::warn!("dropping {} event: engine busy", event.topic());
        return;
    };
    match event {
        CanvasEvent::Pointer(e) => match e.kind {
            SurfaceEventKind::PointerDown => tools.pointer_down(&mut store, e),
            SurfaceEventKind::PointerMove => tools.pointer_move(&mut store, e),
            SurfaceEventKind::PointerUp | SurfaceEventKind::PointerUpOutside => {
                tools.pointer_up(&mut store, e);
            }
            SurfaceEventKind::Wheel => {}
        },
        CanvasEvent::Wheel(e) => tools.wheel(&mut store, e),
        CanvasEvent::Keyboard(e) => {
            tools.key(&mut store, e);
        }
    }
}

impl Drop for CanvasEngine {
    fn drop(&mut self) {
        for (topic, id) in self.subscriptions.drain(..) {
            self.bus.off(topic, id);
        }
        if let Ok(mut bridge) = self.bridge.try_borrow_mut() {
            bridge.detach();
        }
        tracing::debug!("canvas engine dropped");
    }
}

impl fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}
