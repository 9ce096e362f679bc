//! Configuration types for the event-stream crate
//!
//! Controls which notification name is treated as the source's failure
//! notification and whether it is captured at all.

use std::borrow::Cow;

use event_source::{ValidationError, FAILURE_EVENT};

/// Configuration for an [`EventStream`](crate::EventStream)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Name of the failure notification on emitter-shape sources
    /// Default: "error"
    pub failure_event: Cow<'static, str>,

    /// Attach a listener for the failure notification
    /// Default: true
    pub capture_failures: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            failure_event: Cow::Borrowed(FAILURE_EVENT),
            capture_failures: true,
        }
    }
}

impl StreamConfig {
    /// Create a StreamConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a StreamConfig that never listens for failure notifications
    pub fn ignore_failures() -> Self {
        Self {
            capture_failures: false,
            ..Default::default()
        }
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.capture_failures && self.failure_event.is_empty() {
            return Err(ValidationError::InvalidConfig(
                "Failure event name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a failure listener is needed when watching `event`
    ///
    /// Watching the failure notification itself never adds a second listener.
    pub(crate) fn watches_failures_for(&self, event: &str) -> bool {
        self.capture_failures && event != self.failure_event
    }

    pub fn with_failure_event(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.failure_event = name.into();
        self
    }

    pub fn with_capture_failures(mut self, enabled: bool) -> Self {
        self.capture_failures = enabled;
        self
    }
}
