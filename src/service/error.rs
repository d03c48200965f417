//! Service-level error taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::registry::RegistryError;
use crate::routing::RoutingError;

/// Failure categories surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    UnknownStrategy,
    NoEligibleBackend,
    UnknownBackend,
    Timeout,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UnknownStrategy => "unknown_strategy",
            ErrorKind::NoEligibleBackend => "no_eligible_backend",
            ErrorKind::UnknownBackend => "unknown_backend",
            ErrorKind::Timeout => "timeout",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unary operations that accept a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    RecordOutcome,
    Insights,
}

impl Operation {
    /// Read-only operations can be retried blindly after a timeout.
    pub fn is_read_only(self) -> bool {
        !matches!(self, Operation::RecordOutcome)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Select => write!(f, "select_backend"),
            Operation::RecordOutcome => write!(f, "record_outcome"),
            Operation::Insights => write!(f, "get_insights"),
        }
    }
}

/// Errors returned by [`RoutingService`](super::RoutingService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("deadline exceeded during {operation}")]
    Timeout { operation: Operation },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Routing(e) => match e {
                RoutingError::InvalidInput { .. } => ErrorKind::InvalidInput,
                RoutingError::UnknownStrategy { .. } => ErrorKind::UnknownStrategy,
                RoutingError::NoEligibleBackend { .. } => ErrorKind::NoEligibleBackend,
                RoutingError::Timeout { .. } => ErrorKind::Timeout,
            },
            ServiceError::Registry(RegistryError::BackendNotFound(_)) => ErrorKind::UnknownBackend,
            ServiceError::Registry(_) | ServiceError::Config(_) => ErrorKind::InvalidInput,
            ServiceError::Timeout { .. } => ErrorKind::Timeout,
            ServiceError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only timeouts of read-only operations qualify; an outcome report that
    /// timed out must be de-duplicated by the caller before resending.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Routing(RoutingError::Timeout { .. }) => true,
            ServiceError::Timeout { operation } => operation.is_read_only(),
            _ => false,
        }
    }
}
