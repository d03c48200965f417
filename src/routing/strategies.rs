//! Routing strategies for backend selection

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::RoutingError;

/// Routing strategy determines how backends are scored.
///
/// The set is closed: adding a strategy means adding a variant and its
/// evaluator in [`scoring`](super::scoring).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Prefer backends that advertise the exact content type
    ContentType,

    /// Prefer backends with the lowest cost tier
    Cost,

    /// Prefer backends with the best observed success rate and latency
    Performance,

    /// Weighted blend of the other three
    #[default]
    Hybrid,
}

impl RoutingStrategy {
    /// All strategies, in a stable order.
    pub const ALL: [RoutingStrategy; 4] = [
        RoutingStrategy::ContentType,
        RoutingStrategy::Cost,
        RoutingStrategy::Performance,
        RoutingStrategy::Hybrid,
    ];

    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategy::ContentType => "content_type",
            RoutingStrategy::Cost => "cost",
            RoutingStrategy::Performance => "performance",
            RoutingStrategy::Hybrid => "hybrid",
        }
    }
}

impl FromStr for RoutingStrategy {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "content_type" => Ok(RoutingStrategy::ContentType),
            "cost" => Ok(RoutingStrategy::Cost),
            "performance" => Ok(RoutingStrategy::Performance),
            "hybrid" => Ok(RoutingStrategy::Hybrid),
            _ => Err(RoutingError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
