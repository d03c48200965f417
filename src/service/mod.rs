//! Routing service facade
//!
//! Wires the registry, router, learner, insights engine and metrics streamer
//! together and exposes the remote operations with per-call deadlines. The
//! facade knows nothing about transports; the HTTP adapter in [`crate::api`]
//! is a thin layer over it.

mod error;

pub use error::{ErrorKind, Operation, ServiceError};

use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{BackendConfig, SwitchyardConfig};
use crate::insights::{InsightsEngine, InsightsSnapshot};
use crate::learning::{Outcome, OutcomeAck, OutcomeHistory, OutcomeLearner};
use crate::metrics::{MetricsCollector, MetricsStreamer, MetricsSubscription, MetricsUpdate};
use crate::registry::{BackendSnapshot, Registry, RegistryError};
use crate::routing::{ContentDescriptor, Router, RoutingDecision};

/// A `SelectBackend` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectRequest {
    #[serde(flatten)]
    pub content: ContentDescriptor,
    /// Strategy name; blank or absent selects the configured default
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    /// Caller clock, recorded for audit only
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SelectRequest {
    pub fn new(content: ContentDescriptor) -> Self {
        Self {
            content,
            strategy: None,
            request_id: None,
            timestamp: None,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// A registry failure while recording an outcome is not the caller's fault.
fn outcome_failure(backend_id: &str, err: RegistryError) -> ServiceError {
    ServiceError::Internal(format!(
        "failed to record outcome for backend '{}': {}",
        backend_id, err
    ))
}

/// The content-routing service.
pub struct RoutingService {
    registry: Arc<Registry>,
    router: Router,
    learner: OutcomeLearner,
    insights: InsightsEngine,
    streamer: MetricsStreamer,
    metrics: MetricsCollector,
    default_timeout: Duration,
    latency_window: usize,
}

impl RoutingService {
    /// Build a service from validated configuration and register its backends.
    pub fn from_config(config: &SwitchyardConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let registry = Arc::new(Registry::new());
        let history = Arc::new(OutcomeHistory::new(
            config.insights.retention_hours,
            config.insights.max_outcomes,
        ));

        let service = Self {
            router: Router::from_config(Arc::clone(&registry), &config.routing),
            learner: OutcomeLearner::new(Arc::clone(&registry), Arc::clone(&history)),
            insights: InsightsEngine::new(
                Arc::clone(&registry),
                history,
                config.routing.latency_reference_ms,
            )
            .with_top_backends(config.insights.top_backends),
            streamer: MetricsStreamer::new(Arc::clone(&registry), config.streaming.thresholds())
                .with_default_interval(config.streaming.update_interval())
                .with_channel_capacity(config.streaming.channel_capacity),
            metrics: MetricsCollector::new(Arc::clone(&registry), Instant::now()),
            registry,
            default_timeout: config.request_timeout(),
            latency_window: config.routing.latency_window,
        };

        for backend in &config.backends {
            service.register_backend(backend)?;
        }

        tracing::info!(
            backends = service.registry.backend_count(),
            default_strategy = %service.router.default_strategy(),
            "Routing service initialised"
        );
        Ok(service)
    }

    /// Render `/metrics` through an installed Prometheus recorder.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = self.metrics.with_handle(handle);
        self
    }

    fn deadline(&self, timeout: Option<Duration>) -> Option<Instant> {
        Instant::now().checked_add(timeout.unwrap_or(self.default_timeout))
    }

    fn expired(deadline: Option<Instant>) -> bool {
        deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// `SelectBackend`: rank compatible backends and pick the best.
    pub fn select_backend(
        &self,
        request: &SelectRequest,
        timeout: Option<Duration>,
    ) -> Result<RoutingDecision, ServiceError> {
        let deadline = self.deadline(timeout);

        let result = self
            .router
            .resolve_strategy(request.strategy.as_deref())
            .and_then(|strategy| {
                self.router.select_before(
                    &request.content,
                    strategy,
                    request.request_id.as_deref(),
                    deadline,
                )
            });

        match result {
            Ok(decision) => {
                self.metrics
                    .record_selection(decision.strategy.as_str(), &decision.backend_id);
                Ok(decision)
            }
            Err(e) => {
                let err = ServiceError::from(e);
                tracing::warn!(
                    request_id = request.request_id.as_deref().unwrap_or_default(),
                    content_type = %request.content.content_type,
                    kind = %err.kind(),
                    error = %err,
                    "Selection failed"
                );
                self.metrics.record_selection_error(err.kind().as_str());
                Err(err)
            }
        }
    }

    /// `RecordOutcome`: fold a completed operation into backend statistics.
    ///
    /// An expired deadline fails before anything is written; unknown backends
    /// are acknowledged with `accepted = false`.
    pub fn record_outcome(
        &self,
        outcome: Outcome,
        timeout: Option<Duration>,
    ) -> Result<OutcomeAck, ServiceError> {
        if Self::expired(self.deadline(timeout)) {
            return Err(ServiceError::Timeout {
                operation: Operation::RecordOutcome,
            });
        }

        let backend_id = outcome.backend_id.clone();
        let (success, duration_ms) = (outcome.success, outcome.duration_ms);
        let ack = self
            .learner
            .record(outcome)
            .map_err(|e| outcome_failure(&backend_id, e))?;
        if ack.accepted {
            self.metrics.record_outcome(&backend_id, success, duration_ms);
        }
        Ok(ack)
    }

    /// `GetInsights` over the last `window_hours` (0 = retention window).
    pub fn get_insights(
        &self,
        window_hours: u32,
        timeout: Option<Duration>,
    ) -> Result<InsightsSnapshot, ServiceError> {
        let deadline = self.deadline(timeout);
        let timed_out = || ServiceError::Timeout {
            operation: Operation::Insights,
        };

        if Self::expired(deadline) {
            return Err(timed_out());
        }
        let snapshot = self.insights.summarize(window_hours);
        if Self::expired(deadline) {
            return Err(timed_out());
        }
        Ok(snapshot)
    }

    /// `StreamMetrics`: subscribe to periodic health updates.
    ///
    /// `update_interval_seconds == 0` uses the configured default. Must be
    /// called from within a tokio runtime.
    pub fn stream_metrics(
        &self,
        update_interval_seconds: u64,
        include_backends: bool,
    ) -> MetricsSubscription {
        self.streamer
            .subscribe(Duration::from_secs(update_interval_seconds), include_backends)
    }

    /// Single health snapshot.
    pub fn health(&self, include_backends: bool) -> MetricsUpdate {
        self.streamer.snapshot(include_backends)
    }

    /// Register a backend at runtime.
    pub fn register_backend(&self, config: &BackendConfig) -> Result<(), ServiceError> {
        let backend = config.build(self.latency_window)?;
        self.registry.add_backend(backend)?;
        tracing::info!(
            backend_id = %config.id,
            content_types = ?config.content_types,
            cost_tier = config.cost_tier,
            disabled = config.disabled,
            "Backend registered"
        );
        Ok(())
    }

    /// Enable or disable a backend. Returns the previous disabled state.
    pub fn set_backend_disabled(&self, id: &str, disabled: bool) -> Result<bool, ServiceError> {
        Ok(self.registry.set_disabled(id, disabled)?)
    }

    /// Snapshot of every backend, ordered by id.
    pub fn backends(&self) -> Vec<BackendSnapshot> {
        self.registry.list()
    }

    /// End every metrics stream.
    pub fn shutdown(&self) {
        self.streamer.shutdown();
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn streamer(&self) -> &MetricsStreamer {
        &self.streamer
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}
