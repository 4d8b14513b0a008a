//! Analytics event pipeline.
//!
//! Inbound requests are validated into [`Event`]s, buffered in a bounded
//! [`EventQueue`], and drained by a fixed [`WorkerPool`] that writes one
//! `event_users` row per event through an [`EventSink`].
//!
//! Delivery is at-most-once: once an event is accepted, failures are logged
//! and the event is dropped.

pub mod error;
pub mod migrate;
pub mod queue;
pub mod store;
pub mod types;
pub mod validate;
pub mod worker;

pub use error::{QueueError, ValidationError};
pub use migrate::{ensure_schema, SchemaOutcome};
pub use queue::EventQueue;
pub use store::{EventSink, EventStore};
pub use types::{Event, EventMetadata, PersistedEventRecord};
pub use validate::{validate_headers, AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, USER_AGENT_HEADER};
pub use worker::{process_event, WorkerPool};
