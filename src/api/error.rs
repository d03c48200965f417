//! API error envelope

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::service::{ErrorKind, ServiceError};

/// API error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    /// Error kind, e.g. `no_eligible_backend`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Create an error for the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let r#type = match kind {
            ErrorKind::InvalidInput | ErrorKind::UnknownStrategy | ErrorKind::UnknownBackend => {
                "invalid_request_error"
            }
            ErrorKind::NoEligibleBackend | ErrorKind::Timeout | ErrorKind::InternalError => {
                "server_error"
            }
        };
        Self {
            error: ApiErrorBody {
                message: message.into(),
                r#type: r#type.to_string(),
                param: None,
                code: Some(kind.as_str().to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.error.param = Some(param.into());
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_input") | Some("unknown_strategy") => StatusCode::BAD_REQUEST,
            Some("unknown_backend") => StatusCode::NOT_FOUND,
            Some("no_eligible_backend") => StatusCode::SERVICE_UNAVAILABLE,
            Some("timeout") => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let api = ApiError::new(err.kind(), err.to_string());
        match err {
            ServiceError::Routing(crate::routing::RoutingError::InvalidInput { field, .. }) => {
                api.with_param(field)
            }
            _ => api,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
