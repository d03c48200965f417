//! Metrics stream endpoint handler.

use crate::api::{ApiError, AppState};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StreamParams {
    /// Tick period; 0 or absent uses the configured default
    #[serde(default)]
    pub update_interval_seconds: u64,
    #[serde(default)]
    pub include_backends: bool,
}

/// GET /v1/metrics/stream - Server-Sent Events of health updates.
///
/// Each event is named `metrics` and carries one `MetricsUpdate` as JSON. The
/// subscription is dropped, and its ticker stopped, when the client goes away.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StreamParams>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Query(params) = params?;
    let mut subscription = state
        .service
        .stream_metrics(params.update_interval_seconds, params.include_backends);

    tracing::info!(
        update_interval_seconds = params.update_interval_seconds,
        include_backends = params.include_backends,
        "Metrics stream opened"
    );

    let stream = async_stream::stream! {
        while let Some(update) = subscription.next().await {
            match Event::default().event("metrics").json_data(&update) {
                Ok(event) => yield Ok(event),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize metrics update");
                    break;
                }
            }
        }
        tracing::debug!("Metrics stream closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
