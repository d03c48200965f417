//! Completed-operation reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post-hoc report of how an operation on a backend went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Backend that handled the content
    pub backend_id: String,
    /// Whether the operation succeeded
    pub success: bool,
    /// MIME type of the content that was handled
    #[serde(default)]
    pub content_type: String,
    /// Content size in bytes
    #[serde(default)]
    pub content_size: u64,
    /// Opaque content identifier, kept for audit only
    #[serde(default)]
    pub content_hash: String,
    /// Wall time of the operation in milliseconds
    pub duration_ms: u64,
    /// When the operation completed (caller clock); receipt time if omitted
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Outcome {
    /// Build an outcome stamped with the current time.
    pub fn new(
        backend_id: impl Into<String>,
        success: bool,
        content_type: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self {
            backend_id: backend_id.into(),
            success,
            content_type: content_type.into(),
            content_size: 0,
            content_hash: String::new(),
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn with_size(mut self, content_size: u64) -> Self {
        self.content_size = content_size;
        self
    }

    pub fn with_hash(mut self, content_hash: impl Into<String>) -> Self {
        self.content_hash = content_hash.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
