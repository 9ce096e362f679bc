//! In-memory emitter-shape source
//!
//! Listeners are stored per event name in registration order. `emit` takes a
//! snapshot of the listeners and invokes them outside the registry lock, so a
//! listener may register or deregister listeners (including itself) while it
//! runs.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

use crate::listener::{Emitter, Listener, ListenerId, Source, FAILURE_EVENT};
use crate::value::Value;

struct Entry {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

/// Named-event emitter
///
/// # Example
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use event_source::{Emitter, EventEmitter, Value};
///
/// let emitter = EventEmitter::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// emitter.on("foo", Arc::new(move |args: &[Value]| {
///     sink.lock().unwrap().push(args.to_vec());
/// }));
///
/// assert!(emitter.emit("foo", &[Value::from(42)]));
/// assert!(!emitter.emit("bar", &[]));
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<String, Vec<Entry>>>,
}

impl EventEmitter {
    /// Create a new emitter with no listeners
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every listener registered for `event` with `args`
    ///
    /// Returns `true` if at least one listener ran.
    pub fn emit(&self, event: &str, args: &[Value]) -> bool {
        let snapshot: Vec<Listener> = {
            let mut listeners = self.listeners.lock();
            let Some(entries) = listeners.get_mut(event) else {
                if event == FAILURE_EVENT {
                    warn!(event, "Failure emitted with no listener attached");
                }
                return false;
            };

            let snapshot = entries
                .iter()
                .map(|entry| Arc::clone(&entry.listener))
                .collect();
            entries.retain(|entry| !entry.once);
            if entries.is_empty() {
                listeners.remove(event);
            }
            snapshot
        };

        trace!(event, listeners = snapshot.len(), "Emitting event");
        for listener in &snapshot {
            listener(args);
        }
        true
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.lock().get(event).map_or(0, Vec::len)
    }

    /// Names of all events with at least one listener
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every listener registered for `event`, returning how many were removed
    pub fn remove_all_listeners(&self, event: &str) -> usize {
        self.listeners.lock().remove(event).map_or(0, |entries| entries.len())
    }

    fn register(&self, event: &str, listener: Listener, once: bool) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Entry { id, listener, once });
        trace!(event, %id, once, "Listener registered");
        id
    }
}

impl Emitter for EventEmitter {
    fn on(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, false)
    }

    fn once(&self, event: &str, listener: Listener) -> ListenerId {
        self.register(event, listener, true)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let Some(entries) = listeners.get_mut(event) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        let removed = entries.len() != before;
        if entries.is_empty() {
            listeners.remove(event);
        }
        removed
    }
}

impl Source for EventEmitter {
    fn emitter(self: Arc<Self>) -> Option<Arc<dyn Emitter>> {
        Some(self)
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.event_names())
            .finish()
    }
}
