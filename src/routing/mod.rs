//! Routing system for selecting the best backend for a piece of content
//!
//! A request moves through `Received → Evaluating → Decided | Failed`:
//! the descriptor is validated, every enabled and compatible backend in a
//! registry snapshot is scored with the requested strategy, and the ranked
//! result becomes a [`RoutingDecision`]. The router never retries; scoring is
//! deterministic, so a retry without new information would return the same
//! answer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

pub mod descriptor;
pub mod error;
pub mod scoring;
pub mod strategies;

pub use descriptor::ContentDescriptor;
pub use error::RoutingError;
pub use scoring::{score_backend, DimensionScores, ScoringContext, ScoringWeights};
pub use strategies::RoutingStrategy;

use crate::config::RoutingConfig;
use crate::registry::Registry;

/// Default number of ranked alternatives returned with a decision.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 5;

/// Default latency at which the performance latency factor halves.
pub const DEFAULT_LATENCY_REFERENCE_MS: f64 = 1000.0;

/// A backend and the score it received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredBackend {
    pub backend_id: String,
    pub score: f64,
}

/// Result of a successful selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    /// Chosen backend
    pub backend_id: String,
    /// Score of the chosen backend
    pub score: f64,
    /// Runners-up, descending by score, ties by ascending id
    pub alternatives: Vec<ScoredBackend>,
    /// Caller-supplied or generated correlation id
    pub request_id: String,
    /// Strategy that produced the ranking
    pub strategy: RoutingStrategy,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
}

/// Router selects the best backend for each request
pub struct Router {
    /// Reference to backend registry
    registry: Arc<Registry>,

    /// Strategy used when the request names none
    default_strategy: RoutingStrategy,

    /// Weights for the hybrid strategy
    weights: ScoringWeights,

    /// Upper bound on returned alternatives
    max_alternatives: usize,

    /// Latency normalisation for the performance strategy
    latency_reference_ms: f64,
}

impl Router {
    /// Create a new router with the given default strategy and hybrid weights
    pub fn new(
        registry: Arc<Registry>,
        default_strategy: RoutingStrategy,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            registry,
            default_strategy,
            weights,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            latency_reference_ms: DEFAULT_LATENCY_REFERENCE_MS,
        }
    }

    /// Create a router from the `[routing]` configuration section
    pub fn from_config(registry: Arc<Registry>, config: &RoutingConfig) -> Self {
        Self::new(registry, config.default_strategy, config.weights)
            .with_max_alternatives(config.max_alternatives)
            .with_latency_reference(config.latency_reference_ms)
    }

    pub fn with_max_alternatives(mut self, max_alternatives: usize) -> Self {
        self.max_alternatives = max_alternatives;
        self
    }

    pub fn with_latency_reference(mut self, latency_reference_ms: f64) -> Self {
        self.latency_reference_ms = latency_reference_ms;
        self
    }

    pub fn default_strategy(&self) -> RoutingStrategy {
        self.default_strategy
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn max_alternatives(&self) -> usize {
        self.max_alternatives
    }

    pub fn latency_reference_ms(&self) -> f64 {
        self.latency_reference_ms
    }

    /// Resolve a strategy name; blank or missing means the default strategy
    pub fn resolve_strategy(&self, name: Option<&str>) -> Result<RoutingStrategy, RoutingError> {
        match name.map(str::trim) {
            None | Some("") => Ok(self.default_strategy),
            Some(name) => name.parse(),
        }
    }

    /// Select the best backend for the given content
    pub fn select(
        &self,
        content: &ContentDescriptor,
        strategy: RoutingStrategy,
        request_id: Option<&str>,
    ) -> Result<RoutingDecision, RoutingError> {
        self.select_before(content, strategy, request_id, None)
    }

    /// Select the best backend, giving up once `deadline` has passed
    pub fn select_before(
        &self,
        content: &ContentDescriptor,
        strategy: RoutingStrategy,
        request_id: Option<&str>,
        deadline: Option<Instant>,
    ) -> Result<RoutingDecision, RoutingError> {
        content.validate()?;

        let mut ranked = self.rank_before(content, strategy, deadline)?;
        let top = ranked.remove(0);
        ranked.truncate(self.max_alternatives);

        let request_id = crate::logging::resolve_request_id(request_id);

        tracing::info!(
            request_id = %request_id,
            strategy = %strategy,
            content_type = %content.content_type,
            backend_id = %top.backend_id,
            score = top.score,
            alternatives = ranked.len(),
            "Backend selected"
        );

        Ok(RoutingDecision {
            backend_id: top.backend_id,
            score: top.score,
            alternatives: ranked,
            request_id,
            strategy,
            timestamp: Utc::now(),
        })
    }

    /// Score every eligible backend and return them best first
    pub fn rank(
        &self,
        content: &ContentDescriptor,
        strategy: RoutingStrategy,
    ) -> Result<Vec<ScoredBackend>, RoutingError> {
        content.validate()?;
        self.rank_before(content, strategy, None)
    }

    fn rank_before(
        &self,
        content: &ContentDescriptor,
        strategy: RoutingStrategy,
        deadline: Option<Instant>,
    ) -> Result<Vec<ScoredBackend>, RoutingError> {
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        let snapshot = self.registry.list();
        let ctx = ScoringContext::from_backends(&snapshot, self.latency_reference_ms);
        let candidates: Vec<_> = snapshot
            .iter()
            .filter(|backend| backend.is_eligible_for(&content.content_type))
            .collect();

        if candidates.is_empty() {
            tracing::debug!(
                content_type = %content.content_type,
                known_backends = snapshot.len(),
                "No eligible backend"
            );
            return Err(RoutingError::NoEligibleBackend {
                content_type: content.content_type.clone(),
            });
        }

        let mut ranked = Vec::with_capacity(candidates.len());
        for (evaluated, backend) in candidates.iter().enumerate() {
            if expired() {
                return Err(RoutingError::Timeout {
                    evaluated,
                    candidates: candidates.len(),
                });
            }
            ranked.push(ScoredBackend {
                backend_id: backend.id.clone(),
                score: score_backend(
                    strategy,
                    backend,
                    &content.content_type,
                    &ctx,
                    &self.weights,
                ),
            });
        }

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.backend_id.cmp(&b.backend_id))
        });
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::Outcome;
    use crate::registry::{Backend, Capabilities};
    use std::time::Duration;

    fn add(registry: &Registry, id: &str, types: &[&str], tier: u32) {
        let caps = Capabilities::new(types.iter().map(|t| t.to_string()).collect(), tier).unwrap();
        registry.add_backend(Backend::new(id, caps)).unwrap();
    }

    fn record(registry: &Registry, id: &str, successes: u32, failures: u32) {
        for _ in 0..successes {
            registry
                .record_outcome(id, &Outcome::new(id, true, "video/mp4", 100))
                .unwrap();
        }
        for _ in 0..failures {
            registry
                .record_outcome(id, &Outcome::new(id, false, "video/mp4", 100))
                .unwrap();
        }
    }

    fn router(registry: Arc<Registry>) -> Router {
        Router::new(registry, RoutingStrategy::Hybrid, ScoringWeights::default())
    }

    #[test]
    fn cost_strategy_prefers_cheaper_compatible_backend() {
        let registry = Arc::new(Registry::new());
        add(&registry, "A", &["video/*"], 1);
        add(&registry, "B", &["*/*"], 3);

        let decision = router(registry)
            .select(&ContentDescriptor::new("video/mp4", 1024), RoutingStrategy::Cost, None)
            .unwrap();
        assert_eq!(decision.backend_id, "A");
        assert_eq!(decision.alternatives[0].backend_id, "B");
    }

    #[test]
    fn performance_strategy_prefers_reliable_backend() {
        let registry = Arc::new(Registry::new());
        add(&registry, "A", &["video/*"], 1);
        add(&registry, "B", &["*/*"], 3);
        record(&registry, "A", 8, 2);
        record(&registry, "B", 5, 5);

        let decision = router(registry)
            .select(
                &ContentDescriptor::new("video/mp4", 1024),
                RoutingStrategy::Performance,
                None,
            )
            .unwrap();
        assert_eq!(decision.backend_id, "A");
        assert!(decision.score > decision.alternatives[0].score);
    }

    #[test]
    fn content_type_strategy_prefers_exact_match() {
        let registry = Arc::new(Registry::new());
        add(&registry, "generic", &["*/*"], 0);
        add(&registry, "family", &["image/*"], 0);
        add(&registry, "exact", &["image/png"], 0);

        let decision = router(registry)
            .select(
                &ContentDescriptor::new("image/png", 10),
                RoutingStrategy::ContentType,
                None,
            )
            .unwrap();
        assert_eq!(decision.backend_id, "exact");
        let ids: Vec<_> = decision.alternatives.iter().map(|a| a.backend_id.as_str()).collect();
        assert_eq!(ids, vec!["family", "generic"]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let registry = Arc::new(Registry::new());
        for id in ["zeta", "alpha", "mid"] {
            add(&registry, id, &["*/*"], 2);
        }

        let decision = router(registry)
            .select(&ContentDescriptor::new("text/plain", 1), RoutingStrategy::Cost, None)
            .unwrap();
        assert_eq!(decision.backend_id, "alpha");
        let ids: Vec<_> = decision.alternatives.iter().map(|a| a.backend_id.as_str()).collect();
        assert_eq!(ids, vec!["mid", "zeta"]);
    }

    #[test]
    fn alternatives_are_bounded() {
        let registry = Arc::new(Registry::new());
        for i in 0..10 {
            add(&registry, &format!("b{:02}", i), &["*/*"], i);
        }

        let decision = router(registry)
            .with_max_alternatives(3)
            .select(&ContentDescriptor::new("text/plain", 1), RoutingStrategy::Cost, None)
            .unwrap();
        assert_eq!(decision.backend_id, "b00");
        assert_eq!(decision.alternatives.len(), 3);
    }

    #[test]
    fn incompatible_backends_are_never_selected() {
        let registry = Arc::new(Registry::new());
        add(&registry, "images", &["image/*"], 0);

        let result = router(registry).select(
            &ContentDescriptor::new("video/mp4", 1),
            RoutingStrategy::Cost,
            None,
        );
        assert_eq!(
            result.unwrap_err(),
            RoutingError::NoEligibleBackend {
                content_type: "video/mp4".to_string()
            }
        );
    }

    #[test]
    fn disabled_backends_are_skipped() {
        let registry = Arc::new(Registry::new());
        add(&registry, "cheap", &["*/*"], 0);
        add(&registry, "pricey", &["*/*"], 5);
        registry.set_disabled("cheap", true).unwrap();

        let decision = router(Arc::clone(&registry))
            .select(&ContentDescriptor::new("text/plain", 1), RoutingStrategy::Cost, None)
            .unwrap();
        assert_eq!(decision.backend_id, "pricey");
        assert!(decision.alternatives.is_empty());

        registry.set_disabled("pricey", true).unwrap();
        let result = router(registry).select(
            &ContentDescriptor::new("text/plain", 1),
            RoutingStrategy::Cost,
            None,
        );
        assert!(matches!(result, Err(RoutingError::NoEligibleBackend { .. })));
    }

    #[test]
    fn invalid_descriptor_fails_before_evaluation() {
        let registry = Arc::new(Registry::new());
        add(&registry, "a", &["*/*"], 0);

        let result = router(registry).select(&ContentDescriptor::new("", 1), RoutingStrategy::Cost, None);
        assert!(matches!(result, Err(RoutingError::InvalidInput { .. })));
    }

    #[test]
    fn expired_deadline_times_out() {
        let registry = Arc::new(Registry::new());
        add(&registry, "a", &["*/*"], 0);

        let past = Instant::now() - Duration::from_millis(1);
        let result = router(registry).select_before(
            &ContentDescriptor::new("text/plain", 1),
            RoutingStrategy::Cost,
            None,
            Some(past),
        );
        assert!(matches!(result, Err(RoutingError::Timeout { evaluated: 0, .. })));
    }

    #[test]
    fn request_id_is_echoed_or_generated() {
        let registry = Arc::new(Registry::new());
        add(&registry, "a", &["*/*"], 0);
        let router = router(registry);
        let content = ContentDescriptor::new("text/plain", 1);

        let echoed = router.select(&content, RoutingStrategy::Hybrid, Some("req-42")).unwrap();
        assert_eq!(echoed.request_id, "req-42");

        let generated = router.select(&content, RoutingStrategy::Hybrid, Some("  ")).unwrap();
        assert_eq!(generated.request_id.len(), 36);
    }

    #[test]
    fn resolve_strategy_defaults_and_rejects() {
        let router = router(Arc::new(Registry::new()));
        assert_eq!(router.resolve_strategy(None).unwrap(), RoutingStrategy::Hybrid);
        assert_eq!(router.resolve_strategy(Some("")).unwrap(), RoutingStrategy::Hybrid);
        assert_eq!(router.resolve_strategy(Some("cost")).unwrap(), RoutingStrategy::Cost);
        assert!(matches!(
            router.resolve_strategy(Some("fastest")),
            Err(RoutingError::UnknownStrategy { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_ranking_is_sorted_and_deterministic(
                tiers in proptest::collection::vec(0u32..4, 1..12),
                strategy_idx in 0usize..4,
            ) {
                let registry = Arc::new(Registry::new());
                for (i, tier) in tiers.iter().enumerate() {
                    add(&registry, &format!("b{:02}", i), &["*/*"], *tier);
                }
                let router = router(registry).with_max_alternatives(usize::MAX);
                let strategy = RoutingStrategy::ALL[strategy_idx];
                let content = ContentDescriptor::new("video/mp4", 1);

                let first = router.select(&content, strategy, Some("r")).unwrap();
                let second = router.select(&content, strategy, Some("r")).unwrap();
                prop_assert_eq!(&first.backend_id, &second.backend_id);
                prop_assert_eq!(&first.alternatives, &second.alternatives);

                let mut ranked = vec![ScoredBackend {
                    backend_id: first.backend_id.clone(),
                    score: first.score,
                }];
                ranked.extend(first.alternatives.iter().cloned());
                prop_assert_eq!(ranked.len(), tiers.len());
                for pair in ranked.windows(2) {
                    prop_assert!(
                        pair[0].score > pair[1].score
                            || (pair[0].score == pair[1].score && pair[0].backend_id < pair[1].backend_id)
                    );
                }
            }
        }
    }
}
