//! Outcome reporting endpoint handler.

use crate::api::{request_timeout, ApiError, AppState};
use crate::learning::{Outcome, OutcomeAck};
use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// POST /v1/outcomes - Record the result of an operation on a backend.
///
/// Reports for unknown backends still return 200 with `accepted: false`.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    outcome: Result<Json<Outcome>, JsonRejection>,
) -> Result<Json<OutcomeAck>, ApiError> {
    let Json(outcome) = outcome?;
    let ack = state
        .service
        .record_outcome(outcome, request_timeout(&headers))?;
    Ok(Json(ack))
}
