//! # Metrics Module
//!
//! Health classification, the metrics stream, and Prometheus export.
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `switchyard_selections_total{strategy, backend}` - Successful selections
//! - `switchyard_selection_errors_total{kind}` - Failed selections by error kind
//! - `switchyard_outcomes_total{backend, result}` - Accepted outcome reports
//!
//! **Histograms:**
//! - `switchyard_outcome_duration_seconds{backend}` - Reported operation duration
//!
//! **Gauges:**
//! - `switchyard_backends_total` - Registered backends
//! - `switchyard_backends_enabled` - Backends not disabled
//! - `switchyard_backend_success_rate{backend}` - Lifetime success rate

pub mod handler;
pub mod stream;
pub mod types;

pub use stream::{MetricsStreamer, MetricsSubscription};
pub use types::*;

use crate::registry::Registry;
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;

/// Records counters and refreshes gauges from the registry.
pub struct MetricsCollector {
    /// Reference to backend registry for computing gauges
    registry: Arc<Registry>,
    /// Service startup time for uptime calculation
    start_time: Instant,
    /// Thread-safe cache for sanitized Prometheus labels
    label_cache: DashMap<String, String>,
    /// Handle of the installed recorder, if any
    prometheus_handle: Option<PrometheusHandle>,
}

impl MetricsCollector {
    pub fn new(registry: Arc<Registry>, start_time: Instant) -> Self {
        Self {
            registry,
            start_time,
            label_cache: DashMap::new(),
            prometheus_handle: None,
        }
    }

    /// Attach the handle used to render `/metrics`.
    pub fn with_handle(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus_handle = Some(handle);
        self
    }

    /// Get sanitized Prometheus label (cached).
    ///
    /// Label values are restricted to `[a-zA-Z_][a-zA-Z0-9_]*`; anything else
    /// becomes an underscore.
    pub fn sanitize_label(&self, label: &str) -> String {
        if let Some(cached) = self.label_cache.get(label) {
            return cached.clone();
        }

        let mut sanitized: String = label
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if sanitized.is_empty() || sanitized.starts_with(|c: char| c.is_ascii_digit()) {
            sanitized.insert(0, '_');
        }

        self.label_cache.insert(label.to_string(), sanitized.clone());
        sanitized
    }

    pub fn record_selection(&self, strategy: &str, backend_id: &str) {
        metrics::counter!(
            "switchyard_selections_total",
            "strategy" => self.sanitize_label(strategy),
            "backend" => self.sanitize_label(backend_id),
        )
        .increment(1);
    }

    pub fn record_selection_error(&self, kind: &str) {
        metrics::counter!(
            "switchyard_selection_errors_total",
            "kind" => self.sanitize_label(kind),
        )
        .increment(1);
    }

    pub fn record_outcome(&self, backend_id: &str, success: bool, duration_ms: u64) {
        let backend = self.sanitize_label(backend_id);
        let result = if success { "success" } else { "failure" };
        metrics::counter!(
            "switchyard_outcomes_total",
            "backend" => backend.clone(),
            "result" => result,
        )
        .increment(1);
        metrics::histogram!("switchyard_outcome_duration_seconds", "backend" => backend)
            .record(duration_ms as f64 / 1000.0);
    }

    /// Refresh fleet gauges from the registry.
    pub fn update_fleet_gauges(&self) {
        let backends = self.registry.list();

        metrics::gauge!("switchyard_backends_total").set(backends.len() as f64);
        metrics::gauge!("switchyard_backends_enabled")
            .set(backends.iter().filter(|b| !b.disabled).count() as f64);

        for backend in &backends {
            if let Some(rate) = backend.stats.success_rate() {
                metrics::gauge!(
                    "switchyard_backend_success_rate",
                    "backend" => self.sanitize_label(&backend.id),
                )
                .set(rate);
            }
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Render Prometheus metrics in text format; empty without a recorder.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle
            .as_ref()
            .map(PrometheusHandle::render)
            .unwrap_or_default()
    }
}

/// Install the global Prometheus recorder.
///
/// Outcome durations use buckets from 10ms to 5 minutes.
pub fn setup_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let duration_buckets = &[
        0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0,
    ];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("switchyard_outcome_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()?;

    Ok(handle)
}
