//! Topic-keyed publish/subscribe registry.
//!
//! The bus knows nothing about payloads: it is generic over `P` and keyed by
//! topic name. Handlers for a topic form an unordered set, so callers must not
//! rely on dispatch order between handlers. Dispatch is synchronous and works
//! over a snapshot of the handler set taken when `publish` is called, which
//! lets handlers subscribe, unsubscribe or publish re-entrantly.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Token identifying one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Handler<P> = Rc<dyn Fn(&P)>;

/// A single-threaded event bus.
pub struct EventBus<P> {
    topics: RefCell<HashMap<String, HashMap<SubscriptionId, Handler<P>>>>,
    next_id: Cell<u64>,
}

impl<P> EventBus<P> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Register `handler` for `topic`.
    pub fn subscribe(&self, topic: &str, handler: impl Fn(&P) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.topics
            .borrow_mut()
            .entry(topic.to_string())
            .or_default()
            .insert(id, Rc::new(handler));
        tracing::trace!("subscribed {id:?} to {topic}");
        id
    }

    /// Remove a handler. Returns whether it was registered.
    ///
    /// Topics left without handlers are dropped.
    pub fn unsubscribe(&self, topic: &str, id: SubscriptionId) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(handlers) = topics.get_mut(topic) else {
            return false;
        };
        let removed = handlers.remove(&id).is_some();
        if handlers.is_empty() {
            topics.remove(topic);
        }
        removed
    }

    /// Invoke every handler registered for `topic` with `payload`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, topic: &str, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = match self.topics.borrow().get(topic) {
            Some(handlers) => handlers.values().cloned().collect(),
            None => return 0,
        };
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Remove every handler on every topic.
    pub fn clear(&self) {
        self.topics.borrow_mut().clear();
    }

    /// Number of handlers registered for `topic`.
    #[must_use]
    pub fn handler_count(&self, topic: &str) -> usize {
        self.topics.borrow().get(topic).map_or(0, HashMap::len)
    }

    /// Whether `topic` currently has any handler.
    #[must_use]
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.borrow().contains_key(topic)
    }

    /// Number of topics with at least one handler.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.borrow().len()
    }
}

impl<P> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.borrow();
        let mut map = f.debug_map();
        for (topic, handlers) in topics.iter() {
            map.entry(topic, &format!("<{} handlers>", handlers.len()));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_handlers() {
        let bus: EventBus<i32> = EventBus::new();
        let total = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let total = Rc::clone(&total);
            bus.subscribe("n", move |v| total.set(total.get() + *v));
        }
        assert_eq!(bus.publish("n", &2), 3);
        assert_eq!(total.get(), 6);
        assert_eq!(bus.publish("other", &2), 0);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let bus: EventBus<()> = EventBus::new();
        let id = bus.subscribe("a", |()| {});
        assert!(!bus.unsubscribe("b", id));
        assert!(bus.unsubscribe("a", id));
        assert!(!bus.unsubscribe("a", id));
    }

    #[test]
    fn test_empty_topics_are_dropped() {
        let bus: EventBus<()> = EventBus::new();
        let a = bus.subscribe("t", |()| {});
        let b = bus.subscribe("t", |()| {});
        assert_eq!(bus.handler_count("t"), 2);
        bus.unsubscribe("t", a);
        assert!(bus.has_topic("t"));
        bus.unsubscribe("t", b);
        assert!(!bus.has_topic("t"));
        assert_eq!(bus.topic_count(), 0);
    }

    #[test]
    fn test_clear_removes_everything() {
        let bus: EventBus<()> = EventBus::new();
        bus.subscribe("a", |()| {});
        bus.subscribe("b", |()| {});
        bus.clear();
        assert_eq!(bus.topic_count(), 0);
        assert_eq!(bus.publish("a", &()), 0);
    }

    #[test]
    fn test_handler_can_unsubscribe_itself_during_dispatch() {
        let bus: Rc<EventBus<()>> = Rc::new(EventBus::new());
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let id = {
            let bus_ref = Rc::downgrade(&bus);
            let calls = Rc::clone(&calls);
            let slot = Rc::clone(&slot);
            bus.subscribe("once", move |()| {
                calls.set(calls.get() + 1);
                if let (Some(bus), Some(id)) = (bus_ref.upgrade(), slot.get()) {
                    bus.unsubscribe("once", id);
                }
            })
        };
        slot.set(Some(id));
        bus.publish("once", &());
        bus.publish("once", &());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_handler_can_publish_reentrantly() {
        let bus: Rc<EventBus<u32>> = Rc::new(EventBus::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let weak = Rc::downgrade(&bus);
            bus.subscribe("chain", move |v| {
                if *v > 0 {
                    if let Some(bus) = weak.upgrade() {
                        bus.publish("chain", &(v - 1));
                    }
                }
            });
        }
        {
            let seen = Rc::clone(&seen);
            bus.subscribe("chain", move |v| seen.borrow_mut().push(*v));
        }
        bus.publish("chain", &2);
        let mut seen = seen.borrow().clone();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
