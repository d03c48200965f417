//! Backend selection endpoint handler.

use crate::api::{request_timeout, ApiError, AppState};
use crate::routing::RoutingDecision;
use crate::service::SelectRequest;
use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// POST /v1/select - Choose a backend for the described content.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Result<Json<SelectRequest>, JsonRejection>,
) -> Result<Json<RoutingDecision>, ApiError> {
    let Json(request) = request?;
    let decision = state
        .service
        .select_backend(&request, request_timeout(&headers))?;
    Ok(Json(decision))
}
