//! Content descriptors supplied with each selection request

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::RoutingError;

/// Immutable description of the content to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    /// MIME-like type, e.g. `video/mp4`
    pub content_type: String,
    /// Size in bytes; signed so malformed negative sizes can be rejected
    pub content_size: i64,
    /// Opaque identifier used for audit and idempotency only
    #[serde(default)]
    pub content_hash: String,
    /// Free-form attributes
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ContentDescriptor {
    /// Describe content of the given type and size with no hash or metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use switchyard::routing::ContentDescriptor;
    ///
    /// let content = ContentDescriptor::new("video/mp4", 1024);
    /// assert!(content.validate().is_ok());
    /// ```
    pub fn new(content_type: impl Into<String>, content_size: i64) -> Self {
        Self {
            content_type: content_type.into(),
            content_size,
            content_hash: String::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_hash(mut self, content_hash: impl Into<String>) -> Self {
        self.content_hash = content_hash.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Reject malformed descriptors before any evaluation happens.
    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.content_type.trim().is_empty() {
            return Err(RoutingError::InvalidInput {
                field: "content_type".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.content_size < 0 {
            return Err(RoutingError::InvalidInput {
                field: "content_size".to_string(),
                message: format!("must be >= 0, got {}", self.content_size),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_descriptor_passes() {
        let content = ContentDescriptor::new("image/png", 0)
            .with_hash("sha256:abc")
            .with_metadata("origin", "upload");
        assert!(content.validate().is_ok());
        assert_eq!(content.metadata.get("origin").map(String::as_str), Some("upload"));
    }

    #[test]
    fn empty_content_type_rejected() {
        let err = ContentDescriptor::new("  ", 10).validate().unwrap_err();
        assert!(matches!(err, RoutingError::InvalidInput { ref field, .. } if field == "content_type"));
    }

    #[test]
    fn negative_size_rejected() {
        let err = ContentDescriptor::new("video/mp4", -1).validate().unwrap_err();
        assert!(matches!(err, RoutingError::InvalidInput { ref field, .. } if field == "content_size"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let content: ContentDescriptor =
            serde_json::from_str(r#"{"content_type":"video/mp4","content_size":5}"#).unwrap();
        assert!(content.content_hash.is_empty());
        assert!(content.metadata.is_empty());
    }
}
