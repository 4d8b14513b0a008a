//! Core types for the ingest pipeline.

use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tantum_common::IngestError;

/// A validated analytics event waiting to be persisted.
///
/// Only the validator builds these, after all three metadata headers were
/// found. Fields are private so an event cannot change once accepted.
#[derive(Clone)]
pub struct Event {
    metadata: EventMetadata,
    body: Bytes,
}

impl Event {
    pub(crate) fn new(metadata: EventMetadata, body: Bytes) -> Self {
        Self { metadata, body }
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Canonical JSON of the metadata, stored in the `user_id` column.
    pub fn metadata_json(&self) -> Result<String, IngestError> {
        serde_json::to_string(&self.metadata).map_err(|e| IngestError::Serialization(e.to_string()))
    }

    /// Body as stored in the `data` column. Invalid UTF-8 is replaced, not rejected.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("user_agent", &self.metadata.user_agent)
            .field("authorization", &"<redacted>")
            .field("content_type", &self.metadata.content_type)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// The three request headers carried with every event.
/// Field order is the key order of the serialized JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub user_agent: String,
    pub authorization: String,
    pub content_type: String,
}

/// A row of `event_users` as read back from Postgres.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PersistedEventRecord {
    pub id: i32,
    pub time: Option<NaiveDateTime>,
    pub user_id: String,
    pub data: String,
}

impl PersistedEventRecord {
    pub fn metadata(&self) -> Result<EventMetadata, IngestError> {
        serde_json::from_str(&self.user_id).map_err(|e| IngestError::Serialization(e.to_string()))
    }
}
