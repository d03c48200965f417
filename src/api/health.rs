//! Health check endpoint handler.

use crate::api::AppState;
use crate::metrics::{AggregateMetrics, HealthStatus};
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub uptime_seconds: u64,
    pub aggregate: AggregateMetrics,
}

/// GET /health - Current classification of the backend fleet.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let update = state.service.health(false);
    Json(HealthResponse {
        status: update.status,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        aggregate: update.aggregate,
    })
}
