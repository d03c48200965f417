//! Insights endpoint handler.

use crate::api::{request_timeout, ApiError, AppState};
use crate::insights::InsightsSnapshot;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct InsightsParams {
    /// Window in hours; 0 or absent means the retention window
    #[serde(default)]
    pub time_window_hours: u32,
}

/// GET /v1/insights - Factor weights and top backends over a window.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<InsightsParams>, QueryRejection>,
) -> Result<Json<InsightsSnapshot>, ApiError> {
    let Query(params) = params?;
    let snapshot = state
        .service
        .get_insights(params.time_window_hours, request_timeout(&headers))?;
    Ok(Json(snapshot))
}
