//! Error types for the event-source crate.

use crate::value::Value;

/// Errors raised when a source, an injected error or a configuration is malformed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The source exposes neither emitter nor event-target registration
    #[error("The \"emitter\" argument must be an instance of EventEmitter or EventTarget")]
    UnsupportedSource,

    /// A value other than a proper failure value was injected
    #[error("The \"EventEmitter.AsyncIterator\" property must be an instance of Error. Received {received}")]
    NotAnError {
        /// Type description of the rejected value
        received: String,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ValidationError {
    /// Build a `NotAnError` describing the rejected value
    pub fn not_an_error(value: &Value) -> Self {
        ValidationError::NotAnError {
            received: value.type_name().to_string(),
        }
    }
}

/// Convenience type alias for Results using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;
