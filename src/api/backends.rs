//! Backend listing endpoint handler.

use crate::api::AppState;
use crate::registry::BackendSnapshot;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct BackendsResponse {
    pub backends: Vec<BackendSnapshot>,
}

/// GET /v1/backends - Every registered backend with its statistics.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<BackendsResponse> {
    Json(BackendsResponse {
        backends: state.service.backends(),
    })
}
