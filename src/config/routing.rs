//! Routing configuration

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::registry::DEFAULT_LATENCY_WINDOW;
use crate::routing::{
    RoutingStrategy, ScoringWeights, DEFAULT_LATENCY_REFERENCE_MS, DEFAULT_MAX_ALTERNATIVES,
};

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Strategy used when a request names none
    pub default_strategy: RoutingStrategy,
    /// Upper bound on alternatives returned with a decision
    pub max_alternatives: usize,
    /// Average latency at which the performance latency factor is 0.5
    pub latency_reference_ms: f64,
    /// Latency samples kept per backend
    pub latency_window: usize,
    /// Hybrid strategy weights
    pub weights: ScoringWeights,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_strategy: RoutingStrategy::Hybrid,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
            latency_reference_ms: DEFAULT_LATENCY_REFERENCE_MS,
            latency_window: DEFAULT_LATENCY_WINDOW,
            weights: ScoringWeights::default(),
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights
            .validate()
            .map_err(|message| ConfigError::validation("routing.weights", message))?;

        if !(self.latency_reference_ms.is_finite() && self.latency_reference_ms > 0.0) {
            return Err(ConfigError::validation(
                "routing.latency_reference_ms",
                format!("must be positive, got {}", self.latency_reference_ms),
            ));
        }
        if self.latency_window == 0 {
            return Err(ConfigError::validation(
                "routing.latency_window",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_config_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.default_strategy, RoutingStrategy::Hybrid);
        assert_eq!(config.max_alternatives, 5);
        assert_eq!(config.latency_window, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_routing_config_parse() {
        let config: RoutingConfig = toml::from_str(
            r#"
            default_strategy = "cost"
            max_alternatives = 2

            [weights]
            content_type = 0.5
            cost = 0.25
            performance = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.default_strategy, RoutingStrategy::Cost);
        assert_eq!(config.max_alternatives, 2);
        assert_eq!(config.weights.content_type, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_strategy_rejected_at_parse() {
        let result: Result<RoutingConfig, _> = toml::from_str(r#"default_strategy = "fastest""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = RoutingConfig::default();
        config.weights.cost = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "routing.weights"
        ));
    }

    #[test]
    fn test_zero_latency_window_rejected() {
        let config = RoutingConfig {
            latency_window: 0,
            ..RoutingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_latency_reference_rejected() {
        let config = RoutingConfig {
            latency_reference_ms: 0.0,
            ..RoutingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
