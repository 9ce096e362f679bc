//! Dynamically typed event payloads
//!
//! Sources emit events with a variadic argument list. Each argument is a
//! [`Value`]; an emission carries `&[Value]` and a stream yields the owned
//! `Vec<Value>` back to the consumer.

use serde::{Deserialize, Serialize};

/// A single event argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Structured payload
    Json(serde_json::Value),
    /// A proper failure value
    Error(ErrorValue),
    /// An event object delivered by a target-shape source
    Event(Event),
}

impl Value {
    /// Create an error value with the default `Error` name
    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(ErrorValue::new(message))
    }

    /// Check if this value is a proper failure value
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Borrow the failure value, if this is one
    pub fn as_error(&self) -> Option<&ErrorValue> {
        match self {
            Value::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Borrow the event object, if this is one
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Value::Event(event) => Some(event),
            _ => None,
        }
    }

    /// Short type description used in validation messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "type boolean",
            Value::Number(_) => "type number",
            Value::String(_) => "type string",
            Value::Json(_) => "type object",
            Value::Error(_) => "an instance of Error",
            Value::Event(_) => "an instance of Event",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Number(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Json(value) => write!(f, "{}", value),
            Value::Error(error) => write!(f, "{}", error),
            Value::Event(event) => write!(f, "Event({})", event.kind),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value.into())
    }
}

/// Largest integer magnitude an `f64` represents exactly
const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Integers beyond `±(2^53 - 1)` are kept exactly as [`Value::Json`]
/// numbers instead of being rounded to the nearest `f64`.
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
            Value::Number(value as f64)
        } else {
            Value::Json(value.into())
        }
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl From<ErrorValue> for Value {
    fn from(value: ErrorValue) -> Self {
        Value::Error(value)
    }
}

impl From<Event> for Value {
    fn from(value: Event) -> Self {
        Value::Event(value)
    }
}

/// A failure value carried by a failure notification or injected by a consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    /// Error class name, `Error` unless overridden
    pub name: String,
    /// Human readable message
    pub message: String,
}

impl ErrorValue {
    /// Create a new error value named `Error`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: "Error".to_string(),
            message: message.into(),
        }
    }

    /// Override the error name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for ErrorValue {}

/// An event object dispatched by a target-shape source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, matched against the listener's event name
    #[serde(rename = "type")]
    pub kind: String,

    /// Optional payload
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl Event {
    /// Create an event with no detail
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: serde_json::Value::Null,
        }
    }

    /// Attach a detail payload
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = detail;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from("bar"), Value::String("bar".to_string()));
        assert_eq!(Value::from(42), Value::Number(42.0));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(json!({"a": 1})), Value::Json(json!({"a": 1})));
    }

    #[test]
    fn test_large_integers_keep_precision() {
        assert_eq!(Value::from(-42i64), Value::Number(-42.0));
        assert_eq!(Value::from(MAX_SAFE_INTEGER), Value::Number(9_007_199_254_740_991.0));

        let large = i64::MAX;
        assert_eq!(Value::from(large), Value::Json(json!(large)));
        assert_eq!(Value::from(large).to_string(), large.to_string());
        assert_ne!(Value::from(MAX_SAFE_INTEGER + 1), Value::from(MAX_SAFE_INTEGER + 2));
    }

    #[test]
    fn test_error_helpers() {
        let value = Value::error("kaboom");
        assert!(value.is_error());
        assert_eq!(value.as_error().unwrap().message, "kaboom");
        assert_eq!(value.to_string(), "Error: kaboom");

        let typed = ErrorValue::new("bad input").with_name("TypeError");
        assert_eq!(typed.to_string(), "TypeError: bad input");
        assert!(!Value::from(42).is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(Event::new("tick")).to_string(), "Event(tick)");
    }

    #[test]
    fn test_serde_shape() {
        let value = Value::from(Event::new("tick").with_detail(json!(3)));
        let encoded = serde_json::to_value(&value).unwrap();
        assert_eq!(
            encoded,
            json!({"type": "event", "value": {"type": "tick", "detail": 3}})
        );

        let decoded: Value = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
