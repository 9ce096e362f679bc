//! Source adapter normalizing the two registration capability shapes
//!
//! The adapter probes a [`Source`] once, emitter shape first, and keeps the
//! selected strategy for the lifetime of the subscription. Handlers are
//! always [`Listener`]s receiving an argument list; for target-shape sources
//! the dispatched event object becomes a one-element list.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::listener::{Emitter, EventTarget, Listener, ListenerId, ListenerOptions, Source};
use crate::value::{Event, Value};

/// Capability shape selected for a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    Emitter,
    Target,
}

/// A live listener registration returned by [`SourceAdapter::add_listener`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    event: String,
    id: ListenerId,
}

impl Registration {
    /// Event name the listener was registered for
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Id handed back by the source
    pub fn id(&self) -> ListenerId {
        self.id
    }
}

/// Registration strategy selected by capability probing
#[derive(Clone)]
pub enum SourceAdapter {
    Emitter(Arc<dyn Emitter>),
    Target(Arc<dyn EventTarget>),
}

impl SourceAdapter {
    /// Probe `source` for a supported capability shape
    ///
    /// Fails with [`ValidationError::UnsupportedSource`] when the source
    /// exposes neither shape.
    pub fn probe<S>(source: &Arc<S>) -> Result<Self>
    where
        S: Source + ?Sized,
    {
        if let Some(emitter) = Arc::clone(source).emitter() {
            return Ok(SourceAdapter::Emitter(emitter));
        }

        Arc::clone(source)
            .event_target()
            .map(SourceAdapter::Target)
            .ok_or(ValidationError::UnsupportedSource)
    }

    /// The selected capability shape
    pub fn shape(&self) -> SourceShape {
        match self {
            SourceAdapter::Emitter(_) => SourceShape::Emitter,
            SourceAdapter::Target(_) => SourceShape::Target,
        }
    }

    /// Whether the source carries failure-notification semantics
    ///
    /// Only emitter-shape sources do.
    pub fn supports_failure_notification(&self) -> bool {
        self.shape() == SourceShape::Emitter
    }

    /// Register `handler` for `event`
    pub fn add_listener(
        &self,
        event: &str,
        handler: Listener,
        options: ListenerOptions,
    ) -> Registration {
        let id = match self {
            SourceAdapter::Emitter(emitter) if options.once => emitter.once(event, handler),
            SourceAdapter::Emitter(emitter) => emitter.on(event, handler),
            SourceAdapter::Target(target) => target.add_event_listener(
                event,
                Arc::new(move |dispatched: &Event| {
                    handler(&[Value::Event(dispatched.clone())]);
                }),
                options,
            ),
        };

        debug!(event, %id, shape = ?self.shape(), once = options.once, "Listener added");
        Registration {
            event: event.to_string(),
            id,
        }
    }

    /// Deregister a listener, returning whether it was still registered
    ///
    /// Safe to call more than once for the same registration.
    pub fn remove_listener(&self, registration: &Registration) -> bool {
        let removed = match self {
            SourceAdapter::Emitter(emitter) => {
                emitter.remove_listener(&registration.event, registration.id)
            }
            SourceAdapter::Target(target) => {
                target.remove_event_listener(&registration.event, registration.id)
            }
        };

        debug!(event = %registration.event, id = %registration.id, removed, "Listener removed");
        removed
    }
}

impl std::fmt::Debug for SourceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SourceAdapter").field(&self.shape()).finish()
    }
}
