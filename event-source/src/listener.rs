//! Listener contracts for the two source capability shapes
//!
//! A source is either emitter shaped ([`Emitter`]: `on`/`once`/`remove_listener`,
//! listeners receive the full argument list) or target shaped
//! ([`EventTarget`]: `add_event_listener`/`remove_event_listener`, listeners
//! receive a single [`Event`]). [`Source`] exposes capability probes so the
//! adapter can pick a strategy once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::value::{Event, Value};

/// Name of the distinguished failure notification on emitter-shape sources
pub const FAILURE_EVENT: &str = "error";

/// Listener invoked with the full variadic argument list of an emission
pub type Listener = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Listener invoked with the single event object of a dispatch
pub type EventListener = Arc<dyn Fn(&Event) + Send + Sync>;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a listener registration
///
/// Closures have no identity, so registrations hand back an id that is
/// later used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create a ListenerId with the given value
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate a process-wide unique id
    pub fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Options applied when registering a listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Remove the listener after its first invocation
    pub once: bool,
}

impl ListenerOptions {
    /// Options for a listener that fires at most once
    pub fn once() -> Self {
        Self { once: true }
    }
}

/// Emitter-shape registration capability
pub trait Emitter: Send + Sync {
    /// Register a listener for every emission of `event`
    fn on(&self, event: &str, listener: Listener) -> ListenerId;

    /// Register a listener for the next emission of `event` only
    fn once(&self, event: &str, listener: Listener) -> ListenerId;

    /// Deregister a listener, returning whether it was registered
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}

/// Target-shape registration capability
pub trait EventTarget: Send + Sync {
    /// Register a listener for dispatches of `kind`
    fn add_event_listener(
        &self,
        kind: &str,
        listener: EventListener,
        options: ListenerOptions,
    ) -> ListenerId;

    /// Deregister a listener, returning whether it was registered
    fn remove_event_listener(&self, kind: &str, id: ListenerId) -> bool;
}

/// An object that may expose one of the registration capability shapes
///
/// Both probes default to absent; implementors override the one they support.
///
/// ```rust,ignore
/// struct Bus(EventEmitter);
///
/// impl Source for Bus {
///     fn emitter(self: Arc<Self>) -> Option<Arc<dyn Emitter>> {
///         Some(self)
///     }
/// }
/// ```
pub trait Source: Send + Sync + 'static {
    /// Emitter-shape capability, if any
    fn emitter(self: Arc<Self>) -> Option<Arc<dyn Emitter>> {
        None
    }

    /// Target-shape capability, if any
    fn event_target(self: Arc<Self>) -> Option<Arc<dyn EventTarget>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_ids_are_unique() {
        let first = ListenerId::next();
        let second = ListenerId::next();
        assert_ne!(first, second);
        assert!(second.as_u64() > first.as_u64());
    }

    #[test]
    fn test_listener_id_display() {
        assert_eq!(ListenerId::new(7).to_string(), "listener-7");
    }

    #[test]
    fn test_options() {
        assert!(!ListenerOptions::default().once);
        assert!(ListenerOptions::once().once);
    }
}
