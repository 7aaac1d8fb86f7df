//! Event dispatch
//!
//! Fire-and-forget broadcast for consumers that live outside the observable
//! graph. Handlers cannot veto or reorder delivery.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle returned by [`EventBus::register`]
    pub struct HandlerId;
}

/// Event handler function type
pub type EventHandler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Dispatches events of type `E` to every registered handler
pub struct EventBus<E> {
    handlers: SlotMap<HandlerId, EventHandler<E>>,
    dispatched: u64,
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            handlers: SlotMap::with_key(),
            dispatched: 0,
        }
    }

    /// Register a handler
    pub fn register<F>(&mut self, handler: F) -> HandlerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.handlers.insert(Box::new(handler))
    }

    /// Remove a handler; returns false if it was already gone
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        self.handlers.remove(id).is_some()
    }

    /// Deliver an event to all handlers, returning how many received it
    pub fn dispatch(&mut self, event: &E) -> usize {
        self.dispatched += 1;
        for (_, handler) in self.handlers.iter() {
            handler(event);
        }
        tracing::trace!(handlers = self.handlers.len(), "event dispatched");
        self.handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Total number of events dispatched over the bus lifetime
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
