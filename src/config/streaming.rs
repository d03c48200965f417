//! Metrics streaming configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::error::ConfigError;
use crate::metrics::HealthThresholds;

/// Metrics stream and health classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Tick period when a subscriber asks for none
    pub update_interval_seconds: u64,
    /// A backend with traffic below this success rate is CRITICAL
    pub low_threshold: f64,
    /// Aggregate success rate below this is a WARNING
    pub high_threshold: f64,
    /// Updates buffered per subscriber
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            update_interval_seconds: 1,
            low_threshold: 0.5,
            high_threshold: 0.9,
            channel_capacity: 16,
        }
    }
}

impl StreamingConfig {
    pub fn thresholds(&self) -> HealthThresholds {
        HealthThresholds {
            low: self.low_threshold,
            high: self.high_threshold,
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_seconds == 0 {
            return Err(ConfigError::validation(
                "streaming.update_interval_seconds",
                "must be at least 1",
            ));
        }
        for (field, value) in [
            ("streaming.low_threshold", self.low_threshold),
            ("streaming.high_threshold", self.high_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::validation(
                    field,
                    format!("must be within [0, 1], got {}", value),
                ));
            }
        }
        if self.low_threshold > self.high_threshold {
            return Err(ConfigError::validation(
                "streaming.low_threshold",
                format!(
                    "must not exceed high_threshold ({} > {})",
                    self.low_threshold, self.high_threshold
                ),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::validation(
                "streaming.channel_capacity",
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
    fn test_streaming_defaults() {
        let config = StreamingConfig::default();
        assert_eq!(config.update_interval(), Duration::from_secs(1));
        assert_eq!(config.thresholds(), HealthThresholds::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = StreamingConfig {
            low_threshold: 0.95,
            high_threshold: 0.9,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let config = StreamingConfig {
            high_threshold: 1.5,
            ..StreamingConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "streaming.high_threshold"
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = StreamingConfig {
            update_interval_seconds: 0,
            ..StreamingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
