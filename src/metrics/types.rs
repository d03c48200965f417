//! # Metrics Types
//!
//! Data structures pushed on the metrics stream and the health classification
//! applied to each snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::registry::BackendSnapshot;

/// Coarse health of the backend fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Normal => write!(f, "NORMAL"),
            HealthStatus::Warning => write!(f, "WARNING"),
            HealthStatus::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Success-rate thresholds used for classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthThresholds {
    /// Below this, a backend with traffic makes the fleet CRITICAL
    pub low: f64,
    /// Aggregate rate below this (and at or above `low`) is a WARNING
    pub high: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            low: 0.5,
            high: 0.9,
        }
    }
}

impl HealthThresholds {
    /// Classify a registry snapshot.
    ///
    /// CRITICAL when nothing is enabled or an enabled backend with traffic is
    /// under `low`; WARNING when the aggregate rate is in `[low, high)`;
    /// NORMAL otherwise, including when there is no traffic yet.
    pub fn classify(&self, backends: &[BackendSnapshot]) -> HealthStatus {
        let mut enabled = backends.iter().filter(|b| !b.disabled).peekable();
        if enabled.peek().is_none() {
            return HealthStatus::Critical;
        }
        if enabled.any(|b| b.stats.success_rate().is_some_and(|rate| rate < self.low)) {
            return HealthStatus::Critical;
        }

        match AggregateMetrics::from_backends(backends).success_rate {
            Some(rate) if rate < self.high => HealthStatus::Warning,
            _ => HealthStatus::Normal,
        }
    }
}

/// Per-backend summary carried in a metrics update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendMetrics {
    pub success_count: u64,
    pub failure_count: u64,
    pub success_rate: Option<f64>,
    pub avg_latency_ms: Option<f64>,
    pub p95_latency_ms: Option<u64>,
    pub cost_tier: u32,
    pub disabled: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl From<&BackendSnapshot> for BackendMetrics {
    fn from(backend: &BackendSnapshot) -> Self {
        Self {
            success_count: backend.stats.success_count,
            failure_count: backend.stats.failure_count,
            success_rate: backend.stats.success_rate(),
            avg_latency_ms: backend.stats.avg_latency_ms,
            p95_latency_ms: backend.stats.p95_latency_ms,
            cost_tier: backend.capabilities.cost_tier,
            disabled: backend.disabled,
            last_updated: backend.stats.last_updated,
        }
    }
}

/// Fleet-wide figures, always present in an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_outcomes: u64,
    /// Successes over all outcomes; absent without traffic
    pub success_rate: Option<f64>,
    /// Mean success latency weighted by sample count
    pub avg_latency_ms: Option<f64>,
    pub backends_total: usize,
    pub backends_enabled: usize,
}

impl AggregateMetrics {
    pub fn from_backends(backends: &[BackendSnapshot]) -> Self {
        let mut successes = 0u64;
        let mut total = 0u64;
        let mut latency_sum = 0.0;
        let mut latency_samples = 0usize;

        for backend in backends {
            successes += backend.stats.success_count;
            total += backend.stats.total();
            if let Some(avg) = backend.stats.avg_latency_ms {
                latency_sum += avg * backend.stats.latency_samples as f64;
                latency_samples += backend.stats.latency_samples;
            }
        }

        Self {
            total_outcomes: total,
            success_rate: (total > 0).then(|| successes as f64 / total as f64),
            avg_latency_ms: (latency_samples > 0).then(|| latency_sum / latency_samples as f64),
            backends_total: backends.len(),
            backends_enabled: backends.iter().filter(|b| !b.disabled).count(),
        }
    }
}

/// One tick of the metrics stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsUpdate {
    pub status: HealthStatus,
    /// Keyed by backend id; empty unless backends were requested
    pub metrics: BTreeMap<String, BackendMetrics>,
    pub aggregate: AggregateMetrics,
    pub timestamp: DateTime<Utc>,
}

impl MetricsUpdate {
    /// Build an update from one registry snapshot.
    pub fn from_backends(
        backends: &[BackendSnapshot],
        thresholds: &HealthThresholds,
        include_backends: bool,
    ) -> Self {
        let metrics = if include_backends {
            backends
                .iter()
                .map(|b| (b.id.clone(), BackendMetrics::from(b)))
                .collect()
        } else {
            BTreeMap::new()
        };

        Self {
            status: thresholds.classify(backends),
            metrics,
            aggregate: AggregateMetrics::from_backends(backends),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::Outcome;
    use crate::registry::{Backend, Capabilities, Registry};

    fn registry(ids: &[&str]) -> Registry {
        let registry = Registry::new();
        for id in ids {
            let caps = Capabilities::new(vec!["*/*".to_string()], 1).unwrap();
            registry.add_backend(Backend::new(*id, caps)).unwrap();
        }
        registry
    }

    fn record(registry: &Registry, id: &str, successes: u32, failures: u32) {
        for _ in 0..successes {
            registry
                .record_outcome(id, &Outcome::new(id, true, "x/y", 100))
                .unwrap();
        }
        for _ in 0..failures {
            registry
                .record_outcome(id, &Outcome::new(id, false, "x/y", 100))
                .unwrap();
        }
    }

    fn classify(registry: &Registry) -> HealthStatus {
        HealthThresholds::default().classify(&registry.list())
    }

    #[test]
    fn empty_registry_is_critical() {
        assert_eq!(classify(&registry(&[])), HealthStatus::Critical);
    }

    #[test]
    fn all_disabled_is_critical() {
        let registry = registry(&["a", "b"]);
        registry.set_disabled("a", true).unwrap();
        registry.set_disabled("b", true).unwrap();
        assert_eq!(classify(&registry), HealthStatus::Critical);
    }

    #[test]
    fn no_traffic_is_normal() {
        assert_eq!(classify(&registry(&["a"])), HealthStatus::Normal);
    }

    #[test]
    fn single_bad_backend_is_critical() {
        let registry = registry(&["a", "b"]);
        record(&registry, "a", 100, 0);
        record(&registry, "b", 4, 6);
        assert_eq!(classify(&registry), HealthStatus::Critical);
    }

    #[test]
    fn disabled_bad_backend_is_ignored_for_critical() {
        let registry = registry(&["a", "b"]);
        record(&registry, "a", 100, 0);
        record(&registry, "b", 0, 1);
        registry.set_disabled("b", true).unwrap();
        assert_eq!(classify(&registry), HealthStatus::Normal);
    }

    #[test]
    fn middling_aggregate_is_warning() {
        let registry = registry(&["a"]);
        record(&registry, "a", 7, 3);
        assert_eq!(classify(&registry), HealthStatus::Warning);
    }

    #[test]
    fn threshold_boundaries() {
        let registry = registry(&["a"]);
        record(&registry, "a", 9, 1);
        // 0.9 is not below high
        assert_eq!(classify(&registry), HealthStatus::Normal);

        let registry = registry_with_rate(5, 5);
        // 0.5 is not below low
        assert_eq!(classify(&registry), HealthStatus::Warning);
    }

    fn registry_with_rate(successes: u32, failures: u32) -> Registry {
        let registry = registry(&["a"]);
        record(&registry, "a", successes, failures);
        registry
    }

    #[test]
    fn aggregate_weights_latency_by_samples() {
        let registry = registry(&["a", "b"]);
        registry
            .record_outcome("a", &Outcome::new("a", true, "x/y", 100))
            .unwrap();
        for _ in 0..3 {
            registry
                .record_outcome("b", &Outcome::new("b", true, "x/y", 300))
                .unwrap();
        }
        let aggregate = AggregateMetrics::from_backends(&registry.list());
        assert_eq!(aggregate.total_outcomes, 4);
        assert_eq!(aggregate.avg_latency_ms, Some(250.0));
        assert_eq!(aggregate.success_rate, Some(1.0));
        assert_eq!(aggregate.backends_enabled, 2);
    }

    #[test]
    fn update_includes_backends_on_request() {
        let registry = registry(&["b", "a"]);
        let thresholds = HealthThresholds::default();

        let bare = MetricsUpdate::from_backends(&registry.list(), &thresholds, false);
        assert!(bare.metrics.is_empty());
        assert_eq!(bare.aggregate.backends_total, 2);

        let full = MetricsUpdate::from_backends(&registry.list(), &thresholds, true);
        let ids: Vec<_> = full.metrics.keys().cloned().collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn status_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Critical).unwrap(),
            "\"CRITICAL\""
        );
        assert_eq!(HealthStatus::Warning.to_string(), "WARNING");
    }
}
