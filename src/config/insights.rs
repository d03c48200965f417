//! Insights configuration

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;

/// Outcome history retention and report sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Oldest outcome kept, and the widest window a report may cover
    pub retention_hours: u32,
    /// Hard cap on stored outcomes
    pub max_outcomes: usize,
    /// Backends listed in each report
    pub top_backends: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            retention_hours: 24,
            max_outcomes: 100_000,
            top_backends: 5,
        }
    }
}

impl InsightsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_hours == 0 {
            return Err(ConfigError::validation(
                "insights.retention_hours",
                "must be at least 1",
            ));
        }
        if self.max_outcomes == 0 {
            return Err(ConfigError::validation(
                "insights.max_outcomes",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
