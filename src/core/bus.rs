//! In-process publish/subscribe bus.
//!
//! The bus is single-threaded and uses interior mutability via `RefCell`.
//! Handles are clone-cheap; every clone talks to the same registry.
//!
//! Emission is synchronous: every handler registered for the event's topic at
//! the moment of emission runs to completion, in registration order, before
//! `emit` returns. A handler that returns an error is logged and counted; the
//! remaining handlers still receive the event.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::error::HandlerError;
use super::events::{DashboardEvent, Topic};

type Handler = Rc<dyn Fn(&DashboardEvent) -> Result<(), HandlerError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Outcome of one emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<Topic, Vec<(SubscriptionId, Handler)>>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. The returned id is the key for
    /// [`EventBus::unsubscribe`].
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&DashboardEvent) -> Result<(), HandlerError> + 'static,
    {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry
            .topics
            .entry(topic)
            .or_default()
            .push((id, Rc::new(handler)));
        log::debug!("subscribed {:?} to {}", id, topic);
        id
    }

    /// Remove a handler. Returns false when it was not registered.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let Some(handlers) = registry.topics.get_mut(&topic) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            registry.topics.remove(&topic);
        }
        removed
    }

    pub fn emit(&self, event: DashboardEvent) -> EmitReport {
        let topic = event.topic();
        // Snapshot so handlers can subscribe, unsubscribe or emit while we iterate.
        let handlers: Vec<(SubscriptionId, Handler)> = match self.inner.borrow().topics.get(&topic) {
            Some(handlers) => handlers.clone(),
            None => return EmitReport::default(),
        };

        let mut report = EmitReport::default();
        for (id, handler) in handlers {
            match handler(&event) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::warn!("handler {:?} failed on {}: {}", id, topic, e);
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner
            .borrow()
            .topics
            .get(&topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}
