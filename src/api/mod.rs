//! # HTTP API
//!
//! Thin axum adapter over [`RoutingService`](crate::service::RoutingService).
//!
//! ## Endpoints
//!
//! - `POST /v1/select` - Select a backend for a content descriptor
//! - `POST /v1/outcomes` - Report how an operation on a backend went
//! - `GET /v1/insights?time_window_hours=N` - Factor weights and top backends
//! - `GET /v1/metrics/stream?update_interval_seconds=N&include_backends=bool` -
//!   Server-Sent Events of health updates
//! - `GET /v1/backends` - Registry snapshot
//! - `GET /health` - Current health classification
//! - `GET /metrics` - Prometheus text format
//!
//! ## Example
//!
//! ```no_run
//! use switchyard::api::{create_router, AppState};
//! use switchyard::config::SwitchyardConfig;
//! use switchyard::service::RoutingService;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(RoutingService::from_config(&SwitchyardConfig::default())?);
//! let app = create_router(Arc::new(AppState::new(service)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8700").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures carry the error kind as `code`:
//! ```json
//! {
//!   "error": {
//!     "message": "Unknown routing strategy 'fastest'",
//!     "type": "invalid_request_error",
//!     "code": "unknown_strategy"
//!   }
//! }
//! ```

mod backends;
mod error;
mod health;
mod insights;
mod outcomes;
mod select;
mod stream;

pub use backends::BackendsResponse;
pub use error::{ApiError, ApiErrorBody};
pub use health::HealthResponse;

use crate::service::RoutingService;
use axum::{
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (1 MiB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Per-request deadline override, in milliseconds.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub service: Arc<RoutingService>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(service: Arc<RoutingService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

/// Deadline requested through the timeout header, if present and valid.
pub(crate) fn request_timeout(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(REQUEST_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/select", post(select::handle))
        .route("/v1/outcomes", post(outcomes::handle))
        .route("/v1/insights", get(insights::handle))
        .route("/v1/metrics/stream", get(stream::handle))
        .route("/v1/backends", get(backends::handle))
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn timeout_header_parsed_as_millis() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_timeout(&headers), None);

        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("250"));
        assert_eq!(request_timeout(&headers), Some(Duration::from_millis(250)));

        headers.insert(REQUEST_TIMEOUT_HEADER, HeaderValue::from_static("soon"));
        assert_eq!(request_timeout(&headers), None);
    }
}
