//! # event-stream
//!
//! Turns a push-based event source into a pull-based, single-consumer async
//! stream of one named event.
//!
//! ## Overview
//!
//! Sources push events whenever they like; consumers pull them with
//! [`EventStream::pull`] or the [`futures::Stream`] impl. [`EventStream`]
//! sits in between: events that arrive early are buffered, requests that
//! arrive early are queued, and both are matched in FIFO order. The
//! source's failure notification (`"error"` by default) is absorbed as a
//! terminal error delivered to exactly one caller.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use event_source::{EventEmitter, Value};
//! use futures::StreamExt;
//!
//! # tokio_test::block_on(async {
//! let emitter = Arc::new(EventEmitter::new());
//! let mut stream = event_stream::on(&emitter, "foo").unwrap();
//!
//! emitter.emit("foo", &[Value::from("bar")]);
//! emitter.emit("bar", &[Value::from(24)]);
//! emitter.emit("foo", &[Value::from(42)]);
//! emitter.emit("error", &[Value::error("kaboom")]);
//!
//! assert_eq!(stream.next().await, Some(Ok(vec![Value::from("bar")])));
//! assert_eq!(stream.next().await, Some(Ok(vec![Value::from(42)])));
//! assert!(matches!(stream.next().await, Some(Err(_))));
//! assert_eq!(stream.next().await, None);
//! # });
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Subscribe**: `on` probes the source and registers the listeners
//! 2. **Consume**: `pull()` or the `Stream` impl takes events
//! 3. **Finish**: `close()`, dropping the stream, a failure notification or
//!    `throw()` removes the listeners; buffered events still drain first

pub mod config;
pub mod error;
pub mod next;
pub mod result;
mod state;
pub mod stream;

use std::sync::Arc;

use event_source::{Source, ValidationError, Value};

// Re-export main types for convenience
pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use next::Next;
pub use result::IterResult;
pub use state::StreamStats;
pub use stream::EventStream;

// Re-export commonly used types from dependencies
pub use event_source::{ErrorValue, Event, EventEmitter, LocalEventTarget};

/// Stream every future occurrence of `event` on `source`
///
/// Fails if the source exposes neither registration shape.
pub fn on<S>(source: &Arc<S>, event: &str) -> std::result::Result<EventStream, ValidationError>
where
    S: Source + ?Sized,
{
    EventStream::subscribe(source, event, StreamConfig::default())
}

/// Stream every future occurrence of `event` on `source` with `config`
pub fn on_with_config<S>(
    source: &Arc<S>,
    event: &str,
    config: StreamConfig,
) -> std::result::Result<EventStream, ValidationError>
where
    S: Source + ?Sized,
{
    EventStream::subscribe(source, event, config)
}

/// Wait for the next occurrence of `event` on `source`
///
/// Resolves with the event's arguments, or with the source's failure if that
/// arrives first. The listeners are removed either way.
pub async fn once<S>(source: &Arc<S>, event: &str) -> Result<Vec<Value>>
where
    S: Source + ?Sized,
{
    let stream = on(source, event)?;
    let step = stream.pull().await?;
    stream.close();
    step.into_value().ok_or(StreamError::Closed)
}
