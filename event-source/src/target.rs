//! In-memory target-shape source
//!
//! Target-shape sources dispatch a single event object per occurrence and
//! have no failure-notification semantics.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::listener::{EventListener, EventTarget, ListenerId, ListenerOptions, Source};
use crate::value::Event;

struct Entry {
    id: ListenerId,
    listener: EventListener,
    options: ListenerOptions,
}

/// Event target dispatching [`Event`] objects by kind
#[derive(Default)]
pub struct LocalEventTarget {
    listeners: Mutex<HashMap<String, Vec<Entry>>>,
}

impl LocalEventTarget {
    /// Create a new target with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch `event` to every listener registered for its kind
    ///
    /// Returns `true` if at least one listener ran.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        let snapshot: Vec<EventListener> = {
            let mut listeners = self.listeners.lock();
            let Some(entries) = listeners.get_mut(&event.kind) else {
                return false;
            };

            let snapshot = entries
                .iter()
                .map(|entry| Arc::clone(&entry.listener))
                .collect();
            entries.retain(|entry| !entry.options.once);
            if entries.is_empty() {
                listeners.remove(&event.kind);
            }
            snapshot
        };

        trace!(kind = %event.kind, listeners = snapshot.len(), "Dispatching event");
        for listener in &snapshot {
            listener(event);
        }
        true
    }

    /// Number of listeners registered for `kind`
    pub fn listener_count(&self, kind: &str) -> usize {
        self.listeners.lock().get(kind).map_or(0, Vec::len)
    }
}

impl EventTarget for LocalEventTarget {
    fn add_event_listener(
        &self,
        kind: &str,
        listener: EventListener,
        options: ListenerOptions,
    ) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .lock()
            .entry(kind.to_string())
            .or_default()
            .push(Entry {
                id,
                listener,
                options,
            });
        id
    }

    fn remove_event_listener(&self, kind: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(kind) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(kind);
        }
        removed
    }
}

impl Source for LocalEventTarget {
    fn event_target(self: Arc<Self>) -> Option<Arc<dyn EventTarget>> {
        Some(self)
    }
}

impl std::fmt::Debug for LocalEventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEventTarget")
            .field("kinds", &self.listeners.lock().len())
            .finish()
    }
}
