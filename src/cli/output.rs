//! Output formatting helpers for CLI commands

use crate::registry::BackendSnapshot;
use crate::routing::RoutingDecision;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for backend display
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackendView {
    pub id: String,
    pub content_types: Vec<String>,
    pub cost_tier: u32,
    pub disabled: bool,
    pub success_rate: Option<f64>,
    pub avg_latency_ms: Option<f64>,
}

impl From<&BackendSnapshot> for BackendView {
    fn from(backend: &BackendSnapshot) -> Self {
        Self {
            id: backend.id.clone(),
            content_types: backend.capabilities.content_types.clone(),
            cost_tier: backend.capabilities.cost_tier,
            disabled: backend.disabled,
            success_rate: backend.stats.success_rate(),
            avg_latency_ms: backend.stats.avg_latency_ms,
        }
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

/// Format backends as a table
pub fn format_backends_table(backends: &[BackendView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "ID",
        "Content Types",
        "Cost Tier",
        "Status",
        "Success",
        "Latency",
    ]);

    for b in backends {
        let status_str = if b.disabled {
            "Disabled".red().to_string()
        } else {
            "Enabled".green().to_string()
        };

        table.add_row(vec![
            Cell::new(&b.id),
            Cell::new(b.content_types.join(", ")),
            Cell::new(b.cost_tier),
            Cell::new(status_str),
            Cell::new(or_dash(
                b.success_rate.map(|r| format!("{:.1}%", r * 100.0)),
            )),
            Cell::new(or_dash(b.avg_latency_ms.map(|ms| format!("{:.0}ms", ms)))),
        ]);
    }

    table.to_string()
}

/// Format backends as JSON
pub fn format_backends_json(backends: &[BackendView]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({
        "backends": backends
    }))
}

/// Format a routing decision as a ranked table, winner first
pub fn format_decision_table(decision: &RoutingDecision) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Rank", "Backend", "Score"]);

    table.add_row(vec![
        Cell::new("1"),
        Cell::new(decision.backend_id.green().bold().to_string()),
        Cell::new(format!("{:.4}", decision.score)),
    ]);
    for (i, alt) in decision.alternatives.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 2),
            Cell::new(&alt.backend_id),
            Cell::new(format!("{:.4}", alt.score)),
        ]);
    }

    format!(
        "Strategy: {}\nRequest:  {}\n{}",
        decision.strategy, decision.request_id, table
    )
}

/// Format a routing decision as JSON
pub fn format_decision_json(decision: &RoutingDecision) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(decision)
}
