/// Errors that can occur during registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("backend already exists: {0}")]
    DuplicateBackend(String),

    #[error("backend not found: {0}")]
    BackendNotFound(String),

    #[error("invalid content type pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("backend '{0}' advertises no content types")]
    NoContentTypes(String),
}
