//! Pull-based stream over one named event of a push-based source
//!
//! Construction registers a listener for the watched event (and, for
//! emitter-shape sources, one for the failure notification) and returns an
//! [`EventStream`]. Listeners only hold a weak reference to the stream's
//! shared state, so a source never keeps a dropped stream alive.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use event_source::{
    ListenerOptions, Registration, Source, SourceAdapter, ValidationError, Value,
};
use futures::stream::{FusedStream, Stream};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::StreamConfig;
use crate::error::StreamError;
use crate::next::Next;
use crate::result::IterResult;
use crate::state::{StreamState, StreamStats};

/// Listener registrations owned by a live subscription
struct Registrations {
    event: Registration,
    failure: Option<Registration>,
}

/// State shared between the stream and its listeners
struct Shared {
    event: String,
    adapter: SourceAdapter,
    state: Mutex<StreamState>,
    /// `None` once torn down
    registrations: Mutex<Option<Registrations>>,
}

impl Shared {
    fn on_event(&self, args: &[Value]) {
        self.state.lock().push_event(args.to_vec());
    }

    /// Terminal failure: reject or store the error, resolve every other
    /// pending request as done, then deregister
    fn on_failure(&self, error: StreamError) {
        let accepted = {
            let mut state = self.state.lock();
            let accepted = state.fail(error);
            state.close();
            accepted
        };

        if accepted {
            debug!(event = %self.event, "Stream failed");
        } else {
            debug!(event = %self.event, "Failure after the stream finished, ignoring");
        }
        self.teardown();
    }

    fn close(&self) {
        self.teardown();
        self.state.lock().close();
    }

    /// Remove both listeners; later calls are no-ops
    fn teardown(&self) {
        let Some(registrations) = self.registrations.lock().take() else {
            return;
        };

        self.adapter.remove_listener(&registrations.event);
        if let Some(failure) = &registrations.failure {
            self.adapter.remove_listener(failure);
        }
        debug!(event = %self.event, "Stream listeners removed");
    }
}

/// Pull-based, single-consumer stream of one named event
///
/// Events that arrive before they are requested are buffered in arrival
/// order. Requests made before events arrive are queued and matched in call
/// order. A failure notification from the source finishes the stream and is
/// delivered to exactly one caller, after any events already buffered.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use event_source::{EventEmitter, Value};
///
/// # tokio_test::block_on(async {
/// let emitter = Arc::new(EventEmitter::new());
/// let stream = event_stream::on(&emitter, "foo").unwrap();
///
/// emitter.emit("foo", &[Value::from(42)]);
/// let step = stream.pull().await.unwrap();
/// assert_eq!(step.value, Some(vec![Value::from(42)]));
///
/// stream.close();
/// assert!(stream.pull().await.unwrap().done);
/// # });
/// ```
pub struct EventStream {
    shared: Arc<Shared>,
    /// Request driven by `Stream::poll_next`
    in_flight: Option<Next>,
}

impl EventStream {
    /// Subscribe to `event` on `source`
    pub(crate) fn subscribe<S>(
        source: &Arc<S>,
        event: &str,
        config: StreamConfig,
    ) -> Result<Self, ValidationError>
    where
        S: Source + ?Sized,
    {
        config.validate()?;
        let adapter = SourceAdapter::probe(source)?;

        let shared = Arc::new(Shared {
            event: event.to_string(),
            adapter,
            state: Mutex::new(StreamState::new()),
            registrations: Mutex::new(None),
        });

        // Held across registration so a failure racing construction
        // still finds both registrations at teardown.
        {
            let mut registrations = shared.registrations.lock();

            let weak = Arc::downgrade(&shared);
            let event_registration = shared.adapter.add_listener(
                event,
                Arc::new(move |args: &[Value]| {
                    if let Some(shared) = weak.upgrade() {
                        shared.on_event(args);
                    }
                }),
                ListenerOptions::default(),
            );

            let failure_registration = if shared.adapter.supports_failure_notification()
                && config.watches_failures_for(event)
            {
                Some(shared.adapter.add_listener(
                    &config.failure_event,
                    failure_listener(Arc::downgrade(&shared)),
                    ListenerOptions::default(),
                ))
            } else {
                None
            };

            *registrations = Some(Registrations {
                event: event_registration,
                failure: failure_registration,
            });
        }

        debug!(
            event,
            shape = ?shared.adapter.shape(),
            failure_event = %config.failure_event,
            "Stream subscribed"
        );

        Ok(Self {
            shared,
            in_flight: None,
        })
    }

    /// Request the next event
    ///
    /// Resolves immediately with a buffered event, the pending failure, or
    /// the terminal result; otherwise the returned future waits for the next
    /// arrival. Several calls may be outstanding at once.
    pub fn pull(&self) -> Next {
        self.shared.state.lock().next()
    }

    /// Take a buffered event or the pending failure without waiting
    ///
    /// Returns `Ok(None)` when nothing is immediately available.
    pub fn try_next(&self) -> Result<Option<Vec<Value>>, StreamError> {
        self.shared.state.lock().try_next()
    }

    /// Cancel the subscription
    ///
    /// Removes the listeners and resolves every pending request as done.
    /// Events already buffered remain available to `pull()`. Calling this
    /// more than once is harmless.
    pub fn close(&self) -> IterResult {
        self.shared.close();
        IterResult::done()
    }

    /// Inject a failure into the stream
    ///
    /// `error` must be a [`Value::Error`]; anything else is rejected without
    /// touching the stream. An accepted error finishes the stream exactly
    /// like a failure notification from the source: the oldest pending
    /// request is rejected with it (or it is kept for the next caller, after
    /// buffered events), other pending requests resolve as done, and the
    /// listeners are removed.
    pub fn throw(&self, error: Value) -> Result<(), ValidationError> {
        match error {
            Value::Error(error) => {
                self.shared.on_failure(StreamError::Aborted(error));
                Ok(())
            }
            other => Err(ValidationError::not_an_error(&other)),
        }
    }

    /// Name of the watched event
    pub fn event(&self) -> &str {
        &self.shared.event
    }

    /// Whether the stream has finished (events may still be buffered)
    pub fn is_finished(&self) -> bool {
        self.shared.state.lock().is_finished()
    }

    /// Number of events waiting to be consumed
    pub fn buffered_len(&self) -> usize {
        self.shared.state.lock().buffered_len()
    }

    /// Number of `pull()` calls still waiting for an arrival
    pub fn pending_requests(&self) -> usize {
        self.shared.state.lock().pending_requests()
    }

    /// Get stream statistics
    pub fn stats(&self) -> StreamStats {
        self.shared.state.lock().stats()
    }
}

fn failure_listener(weak: Weak<Shared>) -> event_source::Listener {
    Arc::new(move |args: &[Value]| {
        let Some(shared) = weak.upgrade() else {
            return;
        };

        let value = args.first().cloned().unwrap_or(Value::Null);
        if shared.state.lock().pending_requests() == 0 {
            warn!(event = %shared.event, error = %value, "Source failed with no consumer waiting");
        }
        shared.on_failure(StreamError::Source(value));
    })
}

impl Stream for EventStream {
    type Item = Result<Vec<Value>, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let shared = &this.shared;
        let next = this
            .in_flight
            .get_or_insert_with(|| shared.state.lock().next());

        match Pin::new(next).poll(cx) {
            Poll::Ready(outcome) => {
                this.in_flight = None;
                Poll::Ready(match outcome {
                    Ok(IterResult {
                        value: Some(args), ..
                    }) => Some(Ok(args)),
                    Ok(_) => None,
                    Err(error) => Some(Err(error)),
                })
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl FusedStream for EventStream {
    fn is_terminated(&self) -> bool {
        self.in_flight.is_none() && self.shared.state.lock().is_exhausted()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.shared.close();
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("EventStream")
            .field("event", &self.shared.event)
            .field("adapter", &self.shared.adapter)
            .field("finished", &state.is_finished())
            .field("buffered", &state.buffered_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_source::{Event, EventEmitter, LocalEventTarget};
    use futures::FutureExt;

    #[test]
    fn test_subscribe_registers_both_listeners() {
        let emitter = Arc::new(EventEmitter::new());
        let stream = EventStream::subscribe(&emitter, "foo", StreamConfig::default()).unwrap();

        assert_eq!(emitter.listener_count("foo"), 1);
        assert_eq!(emitter.listener_count("error"), 1);
        assert_eq!(stream.event(), "foo");

        drop(stream);
        assert_eq!(emitter.listener_count("foo"), 0);
        assert_eq!(emitter.listener_count("error"), 0);
    }

    #[test]
    fn test_subscribe_rejects_invalid_config() {
        let emitter = Arc::new(EventEmitter::new());
        let config = StreamConfig::new().with_failure_event("");
        let result = EventStream::subscribe(&emitter, "foo", config);
        assert!(matches!(result, Err(ValidationError::InvalidConfig(_))));
        assert_eq!(emitter.listener_count("foo"), 0);
    }

    #[test]
    fn test_custom_failure_event() {
        let emitter = Arc::new(EventEmitter::new());
        let config = StreamConfig::new().with_failure_event("fault");
        let stream = EventStream::subscribe(&emitter, "foo", config).unwrap();
        assert_eq!(emitter.listener_count("error"), 0);
        assert_eq!(emitter.listener_count("fault"), 1);

        emitter.emit("fault", &[Value::error("kaboom")]);
        assert_eq!(
            stream.pull().now_or_never().unwrap(),
            Err(StreamError::Source(Value::error("kaboom")))
        );
        assert_eq!(emitter.listener_count("foo"), 0);
        assert_eq!(emitter.listener_count("fault"), 0);
    }

    #[test]
    fn test_failure_without_arguments_is_null() {
        let emitter = Arc::new(EventEmitter::new());
        let stream = EventStream::subscribe(&emitter, "foo", StreamConfig::default()).unwrap();

        emitter.emit("error", &[]);
        assert_eq!(stream.try_next(), Err(StreamError::Source(Value::Null)));
        assert_eq!(stream.try_next(), Ok(None));
        assert!(stream.is_finished());
    }

    #[test]
    fn test_target_source_yields_event_objects() {
        let target = Arc::new(LocalEventTarget::new());
        let stream = EventStream::subscribe(&target, "tick", StreamConfig::default()).unwrap();
        assert_eq!(target.listener_count("tick"), 1);

        target.dispatch_event(&Event::new("tick"));
        let args = stream.try_next().unwrap().unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].as_event().unwrap().kind, "tick");

        stream.close();
        assert_eq!(target.listener_count("tick"), 0);
    }

    #[test]
    fn test_stream_dropped_while_request_pending() {
        let emitter = Arc::new(EventEmitter::new());
        let stream = EventStream::subscribe(&emitter, "foo", StreamConfig::default()).unwrap();
        let pending = stream.pull();
        assert!(!pending.is_ready());

        drop(stream);
        assert_eq!(pending.now_or_never().unwrap(), Ok(IterResult::done()));
        assert!(!emitter.emit("foo", &[Value::from(1)]));
    }

    #[test]
    fn test_debug_output() {
        let emitter = Arc::new(EventEmitter::new());
        let stream = EventStream::subscribe(&emitter, "foo", StreamConfig::default()).unwrap();
        let debug = format!("{:?}", stream);
        assert!(debug.contains("EventStream"));
        assert!(debug.contains("foo"));
    }
}
