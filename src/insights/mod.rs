//! Insights Engine
//!
//! Explains recent routing behaviour by attributing successful outcomes to the
//! scoring dimensions that favour the backends which produced them. Results
//! are recomputed from the outcome history on every call and never cached.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::learning::OutcomeHistory;
use crate::registry::Registry;
use crate::routing::{DimensionScores, ScoringContext};

/// Default number of backends listed in `top_backends`.
pub const DEFAULT_TOP_BACKENDS: usize = 5;

/// Relative influence of each scoring dimension; the three values sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorWeights {
    pub content_type: f64,
    pub cost: f64,
    pub performance: f64,
}

impl FactorWeights {
    /// Equal attribution, used when there is nothing to learn from.
    pub fn equal() -> Self {
        Self {
            content_type: 1.0 / 3.0,
            cost: 1.0 / 3.0,
            performance: 1.0 / 3.0,
        }
    }

    fn normalized(sum: &DimensionScores) -> Self {
        let total = sum.content_type + sum.cost + sum.performance;
        if total <= 0.0 || !total.is_finite() {
            return Self::equal();
        }
        Self {
            content_type: sum.content_type / total,
            cost: sum.cost / total,
            performance: sum.performance / total,
        }
    }
}

/// Per-backend view over the insights window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendInsight {
    pub backend_id: String,
    pub outcomes: u64,
    pub successes: u64,
    pub success_rate: f64,
    /// Mean duration of successful outcomes in the window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_latency_ms: Option<f64>,
}

/// Result of one `summarize` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsSnapshot {
    pub factor_weights: FactorWeights,
    /// Effective window after defaulting and capping
    pub window_hours: u32,
    pub insufficient_data: bool,
    pub total_outcomes: u64,
    pub successful_outcomes: u64,
    pub top_backends: Vec<BackendInsight>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tally {
    outcomes: u64,
    successes: u64,
    success_latency_ms: u128,
}

/// Computes [`InsightsSnapshot`]s from the shared outcome history.
pub struct InsightsEngine {
    registry: Arc<Registry>,
    history: Arc<OutcomeHistory>,
    latency_reference_ms: f64,
    top_backends: usize,
}

impl InsightsEngine {
    pub fn new(
        registry: Arc<Registry>,
        history: Arc<OutcomeHistory>,
        latency_reference_ms: f64,
    ) -> Self {
        Self {
            registry,
            history,
            latency_reference_ms,
            top_backends: DEFAULT_TOP_BACKENDS,
        }
    }

    pub fn with_top_backends(mut self, top_backends: usize) -> Self {
        self.top_backends = top_backends;
        self
    }

    /// Retention window of the underlying history, in whole hours.
    pub fn retention_hours(&self) -> u32 {
        u32::try_from(self.history.retention().num_hours()).unwrap_or(u32::MAX)
    }

    /// Summarize the last `window_hours` hours.
    ///
    /// `0` selects the whole retention window; larger values are capped to it.
    pub fn summarize(&self, window_hours: u32) -> InsightsSnapshot {
        let retention = self.retention_hours();
        let window_hours = if window_hours == 0 {
            retention
        } else {
            window_hours.min(retention)
        };

        let now = Utc::now();
        let outcomes = self.history.since(now - Duration::hours(i64::from(window_hours)));

        let snapshot = self.registry.list();
        let ctx = ScoringContext::from_backends(&snapshot, self.latency_reference_ms);
        let backends: HashMap<&str, _> = snapshot.iter().map(|b| (b.id.as_str(), b)).collect();

        let mut sum = DimensionScores {
            content_type: 0.0,
            cost: 0.0,
            performance: 0.0,
        };
        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        let mut successful = 0u64;

        for outcome in &outcomes {
            let Some(backend) = backends.get(outcome.backend_id.as_str()) else {
                continue;
            };
            let tally = tallies.entry(backend.id.as_str()).or_default();
            tally.outcomes += 1;
            if !outcome.success {
                continue;
            }
            tally.successes += 1;
            tally.success_latency_ms += u128::from(outcome.duration_ms);
            successful += 1;

            let dims = DimensionScores::compute(backend, &outcome.content_type, &ctx);
            sum.content_type += dims.content_type;
            sum.cost += dims.cost;
            sum.performance += dims.performance;
        }

        let insufficient_data = successful == 0;
        let factor_weights = if insufficient_data {
            FactorWeights::equal()
        } else {
            FactorWeights::normalized(&sum)
        };

        let mut top_backends: Vec<BackendInsight> = tallies
            .into_iter()
            .map(|(id, tally)| BackendInsight {
                backend_id: id.to_string(),
                outcomes: tally.outcomes,
                successes: tally.successes,
                success_rate: tally.successes as f64 / tally.outcomes as f64,
                mean_latency_ms: (tally.successes > 0)
                    .then(|| tally.success_latency_ms as f64 / tally.successes as f64),
            })
            .collect();
        top_backends.sort_by(|a, b| {
            b.success_rate
                .total_cmp(&a.success_rate)
                .then_with(|| b.outcomes.cmp(&a.outcomes))
                .then_with(|| a.backend_id.cmp(&b.backend_id))
        });
        top_backends.truncate(self.top_backends);

        tracing::debug!(
            window_hours,
            outcomes = outcomes.len(),
            successful,
            insufficient_data,
            "Insights computed"
        );

        InsightsSnapshot {
            factor_weights,
            window_hours,
            insufficient_data,
            total_outcomes: outcomes.len() as u64,
            successful_outcomes: successful,
            top_backends,
            generated_at: now,
        }
    }
}
