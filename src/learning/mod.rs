//! Outcome Learner.
//!
//! Ingests completed-operation reports, folds them into the owning backend's
//! statistics and keeps a rolling history for the insights engine.

mod history;
mod outcome;

pub use history::OutcomeHistory;
pub use outcome::Outcome;

use crate::registry::{Registry, RegistryError, StatsSnapshot};
use serde::Serialize;
use std::sync::Arc;

/// Acknowledgement returned for every outcome report.
///
/// Reports for unknown backends are acknowledged with `accepted = false`
/// rather than failing, since they may race with administrative changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeAck {
    pub accepted: bool,
    pub message: String,
    /// Backend statistics right after the update (accepted reports only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsSnapshot>,
}

/// Applies outcome reports to the registry.
pub struct OutcomeLearner {
    registry: Arc<Registry>,
    history: Arc<OutcomeHistory>,
}

impl OutcomeLearner {
    pub fn new(registry: Arc<Registry>, history: Arc<OutcomeHistory>) -> Self {
        Self { registry, history }
    }

    /// Record one outcome.
    ///
    /// Successful outcomes add a success and a latency sample; failed ones add
    /// a failure only. Unknown backend ids leave all statistics untouched and
    /// are acknowledged with `accepted = false`.
    ///
    /// # Errors
    ///
    /// Any registry failure other than an unknown backend is returned as is.
    pub fn record(&self, outcome: Outcome) -> Result<OutcomeAck, RegistryError> {
        match self.registry.record_outcome(&outcome.backend_id, &outcome) {
            Ok(stats) => {
                tracing::debug!(
                    backend_id = %outcome.backend_id,
                    success = outcome.success,
                    duration_ms = outcome.duration_ms,
                    successes = stats.success_count,
                    failures = stats.failure_count,
                    "Outcome recorded"
                );
                let message = format!("outcome recorded for backend '{}'", outcome.backend_id);
                self.history.push(outcome);
                Ok(OutcomeAck {
                    accepted: true,
                    message,
                    stats: Some(stats),
                })
            }
            Err(RegistryError::BackendNotFound(id)) => {
                tracing::warn!(
                    backend_id = %id,
                    content_hash = %outcome.content_hash,
                    "Outcome reported for unknown backend, ignoring"
                );
                Ok(OutcomeAck {
                    accepted: false,
                    message: format!("unknown backend '{}', outcome ignored", id),
                    stats: None,
                })
            }
            Err(e) => {
                tracing::error!(
                    backend_id = %outcome.backend_id,
                    error = %e,
                    "Unexpected registry error while recording outcome"
                );
                Err(e)
            }
        }
    }

    /// Shared outcome history.
    pub fn history(&self) -> &Arc<OutcomeHistory> {
        &self.history
    }
}
