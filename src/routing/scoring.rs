//! Strategy evaluators
//!
//! Every evaluator is a pure function of a backend snapshot, the requested
//! content type and a [`ScoringContext`] derived from the same registry
//! snapshot. Scores are in `[0, 1]`, higher is better.

use serde::{Deserialize, Serialize};

use super::RoutingStrategy;
use crate::registry::{BackendSnapshot, MatchKind, StatsSnapshot};

/// Success rate assumed for a backend with no observations.
pub const NEUTRAL_SUCCESS_RATE: f64 = 0.5;

/// Lowest content-type score, so a poor fit is still selectable as last resort.
pub const CONTENT_TYPE_FLOOR: f64 = 0.1;

/// Weights for the hybrid strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight for content-type fit
    pub content_type: f64,

    /// Weight for cost tier
    pub cost: f64,

    /// Weight for observed performance
    pub performance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            content_type: 0.3,
            cost: 0.2,
            performance: 0.5,
        }
    }
}

impl ScoringWeights {
    /// Validate that weights are non-negative and sum to 1.0
    pub fn validate(&self) -> Result<(), String> {
        let weights = [self.content_type, self.cost, self.performance];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(format!(
                "Scoring weights must be finite and non-negative, got {:?}",
                weights
            ));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            Err(format!("Scoring weights must sum to 1.0, got {}", sum))
        } else {
            Ok(())
        }
    }
}

/// Registry-wide values evaluators normalise against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringContext {
    /// Highest cost tier among all known backends
    pub max_cost_tier: u32,

    /// Latency at which the latency factor drops to 0.5
    pub latency_reference_ms: f64,
}

impl ScoringContext {
    /// Derive the context from a registry snapshot (disabled backends included).
    pub fn from_backends(backends: &[BackendSnapshot], latency_reference_ms: f64) -> Self {
        Self {
            max_cost_tier: backends
                .iter()
                .map(|b| b.capabilities.cost_tier)
                .max()
                .unwrap_or(0),
            latency_reference_ms,
        }
    }
}

/// `content_type` evaluator: 1.0 exact, 0.7 wildcard, 0.4 catch-all,
/// 0.25 same top-level type, otherwise the floor.
pub fn content_type_score(kind: MatchKind) -> f64 {
    match kind {
        MatchKind::Exact => 1.0,
        MatchKind::Partial => 0.7,
        MatchKind::Universal => 0.4,
        MatchKind::SameFamily => 0.25,
        MatchKind::None => CONTENT_TYPE_FLOOR,
    }
}

/// `cost` evaluator: `1 - tier / max_tier`.
pub fn cost_score(cost_tier: u32, ctx: &ScoringContext) -> f64 {
    if ctx.max_cost_tier == 0 {
        return 1.0;
    }
    (1.0 - f64::from(cost_tier) / f64::from(ctx.max_cost_tier)).clamp(0.0, 1.0)
}

/// `performance` evaluator: success rate times `1 / (1 + latency / reference)`.
pub fn performance_score(stats: &StatsSnapshot, ctx: &ScoringContext) -> f64 {
    let success_rate = stats.success_rate().unwrap_or(NEUTRAL_SUCCESS_RATE);
    let latency_factor = match stats.avg_latency_ms {
        Some(avg) if ctx.latency_reference_ms > 0.0 => {
            1.0 / (1.0 + avg.max(0.0) / ctx.latency_reference_ms)
        }
        _ => 1.0,
    };
    (success_rate * latency_factor).clamp(0.0, 1.0)
}

/// Per-dimension scores of one backend for one content type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DimensionScores {
    pub content_type: f64,
    pub cost: f64,
    pub performance: f64,
}

impl DimensionScores {
    pub fn compute(backend: &BackendSnapshot, content_type: &str, ctx: &ScoringContext) -> Self {
        Self {
            content_type: content_type_score(backend.capabilities.match_kind(content_type)),
            cost: cost_score(backend.capabilities.cost_tier, ctx),
            performance: performance_score(&backend.stats, ctx),
        }
    }

    /// Hybrid blend of the three dimensions.
    pub fn weighted(&self, weights: &ScoringWeights) -> f64 {
        (self.content_type * weights.content_type
            + self.cost * weights.cost
            + self.performance * weights.performance)
            .clamp(0.0, 1.0)
    }
}

/// Score a backend with the given strategy.
pub fn score_backend(
    strategy: RoutingStrategy,
    backend: &BackendSnapshot,
    content_type: &str,
    ctx: &ScoringContext,
    weights: &ScoringWeights,
) -> f64 {
    match strategy {
        RoutingStrategy::ContentType => {
            content_type_score(backend.capabilities.match_kind(content_type))
        }
        RoutingStrategy::Cost => cost_score(backend.capabilities.cost_tier, ctx),
        RoutingStrategy::Performance => performance_score(&backend.stats, ctx),
        RoutingStrategy::Hybrid => {
            DimensionScores::compute(backend, content_type, ctx).weighted(weights)
        }
    }
}
