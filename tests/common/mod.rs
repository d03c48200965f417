//! Shared test utilities for Switchyard integration tests.
//!
//! Builders for configs, services and routers so that each test file only
//! spells out what it is actually checking.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use std::sync::Arc;
use switchyard::api::{create_router, AppState};
use switchyard::config::{BackendConfig, SwitchyardConfig};
use switchyard::learning::Outcome;
use switchyard::service::RoutingService;

// =============================================================================
// Well-Known Test Constants
// =============================================================================

/// UUID v4 string length: "xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
pub const UUID_V4_STRING_LEN: usize = 36;

// =============================================================================
// Config and Service Builders
// =============================================================================

/// Config with the given `(id, content_types, cost_tier)` backends.
pub fn config_with(backends: &[(&str, &[&str], u32)]) -> SwitchyardConfig {
    let mut config = SwitchyardConfig::default();
    for (id, types, tier) in backends {
        config.backends.push(BackendConfig::new(*id, types, *tier));
    }
    config
}

/// The two-backend fleet used throughout: a cheap video edge and a pricey
/// catch-all store.
pub fn video_fleet() -> SwitchyardConfig {
    config_with(&[("A", &["video/*"], 1), ("B", &["*/*"], 3)])
}

pub fn make_service(config: &SwitchyardConfig) -> Arc<RoutingService> {
    Arc::new(RoutingService::from_config(config).unwrap())
}

/// Report `successes` successes and `failures` failures for `backend_id`.
pub fn report(
    service: &RoutingService,
    backend_id: &str,
    content_type: &str,
    successes: u32,
    failures: u32,
    duration_ms: u64,
) {
    for _ in 0..successes {
        let ack = service
            .record_outcome(Outcome::new(backend_id, true, content_type, duration_ms), None)
            .unwrap();
        assert!(ack.accepted);
    }
    for _ in 0..failures {
        let ack = service
            .record_outcome(Outcome::new(backend_id, false, content_type, duration_ms), None)
            .unwrap();
        assert!(ack.accepted);
    }
}

// =============================================================================
// HTTP Helpers
// =============================================================================

pub fn make_app(service: Arc<RoutingService>) -> axum::Router {
    create_router(Arc::new(AppState::new(service)))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
