//! Fan-out Event Payloads
//!
//! Wire shapes of the content events, camelCase on the wire. Required fields
//! are modeled as options so the consumer can reject malformed messages
//! itself instead of bubbling a deserialization error.

use serde::{Deserialize, Serialize};

// == Creation Event ==
/// `content.created` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCreated {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_ms: Option<i64>,
}

impl ContentCreated {
    pub fn new(id: u64, author_id: u64, parent_id: Option<u64>, created_at_ms: i64) -> Self {
        Self {
            id: Some(id),
            author_id: Some(author_id),
            parent_id,
            created_at_ms: Some(created_at_ms),
        }
    }

    /// Returns `(id, author_id)` when both required fields are present.
    pub fn required_fields(&self) -> Option<(u64, u64)> {
        Some((self.id?, self.author_id?))
    }
}

// == Deletion Event ==
/// `content.deleted` payload. Only `id` is required; without an author the
/// consumer can still clear the global timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDeleted {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

impl ContentDeleted {
    pub fn new(id: u64, author_id: Option<u64>, parent_id: Option<u64>) -> Self {
        Self {
            id: Some(id),
            author_id,
            parent_id,
        }
    }
}
