//! Iteration results
//!
//! Every `next()` outcome is shaped as a `(value, done)` pair: either an
//! event's argument list with `done == false`, or no value with
//! `done == true` once the stream is finished and drained.

use event_source::Value;

/// A single iteration step
#[derive(Debug, Clone, PartialEq)]
pub struct IterResult {
    /// Argument list of the delivered event, `None` when done
    pub value: Option<Vec<Value>>,

    /// Whether the stream has finished
    pub done: bool,
}

impl IterResult {
    /// A step carrying an event's arguments
    pub fn value(args: Vec<Value>) -> Self {
        Self {
            value: Some(args),
            done: false,
        }
    }

    /// The terminal step
    pub fn done() -> Self {
        Self {
            value: None,
            done: true,
        }
    }

    /// Take the argument list, `None` for the terminal step
    pub fn into_value(self) -> Option<Vec<Value>> {
        self.value
    }
}
