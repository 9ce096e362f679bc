//! Event Source Contracts
//!
//! Listener contracts for push-based notification sources, two in-memory
//! sources, and an adapter that normalizes both registration shapes.
//!
//! # Features
//!
//! - **Two Capability Shapes**: emitter shape (`on`/`once`/`remove_listener`)
//!   and target shape (`add_event_listener`/`remove_event_listener`)
//! - **Probe Once**: [`SourceAdapter`] selects a strategy at construction
//! - **Dynamic Payloads**: events carry an argument list of [`Value`]s
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use event_source::{EventEmitter, ListenerOptions, SourceAdapter, SourceShape, Value};
//!
//! let emitter = Arc::new(EventEmitter::new());
//! let adapter = SourceAdapter::probe(&emitter).unwrap();
//! assert_eq!(adapter.shape(), SourceShape::Emitter);
//!
//! let registration = adapter.add_listener(
//!     "foo",
//!     Arc::new(|args: &[Value]| println!("foo: {:?}", args)),
//!     ListenerOptions::default(),
//! );
//! emitter.emit("foo", &[Value::from(42)]);
//!
//! adapter.remove_listener(&registration);
//! assert_eq!(emitter.listener_count("foo"), 0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Source ── probe ──► SourceAdapter
//!                        ├── Emitter(Arc<dyn Emitter>)      ── handler(&[Value])
//!                        └── Target(Arc<dyn EventTarget>)   ── handler(&[Value::Event])
//! ```

// Modules
pub mod adapter;
pub mod emitter;
pub mod error;
pub mod listener;
pub mod target;
pub mod value;

// Re-exports - Public API
pub use adapter::{Registration, SourceAdapter, SourceShape};
pub use emitter::EventEmitter;
pub use error::{Result, ValidationError};
pub use listener::{
    Emitter, EventListener, EventTarget, Listener, ListenerId, ListenerOptions, Source,
    FAILURE_EVENT,
};
pub use target::LocalEventTarget;
pub use value::{ErrorValue, Event, Value};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::adapter::SourceAdapter;
    pub use crate::emitter::EventEmitter;
    pub use crate::listener::{Emitter, EventTarget, Source};
    pub use crate::target::LocalEventTarget;
    pub use crate::value::{ErrorValue, Event, Value};
}
