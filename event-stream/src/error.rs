//! Error types for the event-stream crate.

use event_source::{ErrorValue, ValidationError, Value};

/// Terminal failures observed by a stream consumer
///
/// A stream delivers at most one of these to exactly one `next()` caller;
/// every later call observes the terminal `done` result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    /// The source emitted its failure notification
    #[error("Source failure: {0}")]
    Source(Value),

    /// The consumer injected an error with `throw`
    #[error("Stream aborted: {0}")]
    Aborted(ErrorValue),

    /// The stream finished before the awaited event occurred
    #[error("Stream closed before the event occurred")]
    Closed,

    /// The source or configuration was rejected
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl StreamError {
    /// The failure value carried by this error, if any
    pub fn value(&self) -> Option<Value> {
        match self {
            StreamError::Source(value) => Some(value.clone()),
            StreamError::Aborted(error) => Some(Value::Error(error.clone())),
            StreamError::Closed | StreamError::Invalid(_) => None,
        }
    }
}

/// Convenience type alias for Results using StreamError.
pub type Result<T> = std::result::Result<T, StreamError>;
