//! Feed event bus
//!
//! Listeners are called synchronously on the publishing thread, in subscription
//! order. Publishing takes a copy of the listener list, so a listener may
//! subscribe or unsubscribe from inside its own callback. A listener that
//! panics is logged and skipped; the others still receive the event.

use parking_lot::RwLock;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error};

use super::FeedEvent;
use crate::simulation::SimulationError;

/// Identifier of a registered listener
pub type ListenerId = u64;

type Listener = Arc<dyn Fn(&FeedEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: AtomicU64,
    entries: RwLock<Vec<(ListenerId, Listener)>>,
}

impl Listeners {
    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }
}

/// Publish/subscribe hub for feed events
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Listeners>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("listeners", &self.listener_count()).finish()
    }
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered until the returned handle is unsubscribed
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&FeedEvent) + Send + Sync + 'static,
    {
        let id = self.listeners.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.entries.write().push((id, Arc::new(listener)));
        debug!(listener = id, "Listener subscribed");

        Subscription { id, listeners: Arc::downgrade(&self.listeners) }
    }

    /// Deliver `event` to every listener registered at call time.
    ///
    /// Returns the number of listeners that panicked.
    pub fn publish(&self, event: &FeedEvent) -> u64 {
        let listeners: Vec<(ListenerId, Listener)> = self
            .listeners
            .entries
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut failures = 0;
        for (id, listener) in listeners {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                let failure = SimulationError::from_panic("listener", payload.as_ref());
                error!(code = failure.code(), listener = id, event = event.name(), "{}", failure);
                failures += 1;
            }
        }
        failures
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.entries.read().len()
    }

    /// Drop every listener
    pub fn clear(&self) {
        self.listeners.entries.write().clear();
    }
}

/// Handle to a registered listener
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Listener identifier
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let removed = match self.listeners.upgrade() {
            Some(listeners) => listeners.remove(self.id),
            None => false,
        };
        debug!(listener = self.id, removed, "Listener unsubscribed");
        removed
    }
}
