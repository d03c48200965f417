//! Error types for routing failures

use thiserror::Error;

/// Errors that can occur during backend selection
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoutingError {
    /// The content descriptor failed validation
    #[error("Invalid content descriptor: {field} {message}")]
    InvalidInput { field: String, message: String },

    /// The requested strategy name is not one of the known strategies
    #[error("Unknown routing strategy '{name}'")]
    UnknownStrategy { name: String },

    /// No registered, enabled backend accepts this content type
    #[error("No eligible backend for content type '{content_type}'")]
    NoEligibleBackend { content_type: String },

    /// The deadline passed before evaluation finished
    #[error("Selection deadline exceeded after evaluating {evaluated} of {candidates} backends")]
    Timeout { evaluated: usize, candidates: usize },
}
