//! Environment overrides.
//!
//! Kept in its own test binary: env vars are process-wide, and no other test
//! here reads configuration.

use switchyard::config::{LogFormat, SwitchyardConfig};
use switchyard::routing::RoutingStrategy;

const VARS: [&str; 5] = [
    "SWITCHYARD_PORT",
    "SWITCHYARD_HOST",
    "SWITCHYARD_LOG_LEVEL",
    "SWITCHYARD_LOG_FORMAT",
    "SWITCHYARD_STRATEGY",
];

#[test]
fn test_env_overrides_then_invalid_values_ignored() {
    std::env::set_var("SWITCHYARD_PORT", "9999");
    std::env::set_var("SWITCHYARD_HOST", "127.0.0.1");
    std::env::set_var("SWITCHYARD_LOG_LEVEL", "debug");
    std::env::set_var("SWITCHYARD_LOG_FORMAT", "json");
    std::env::set_var("SWITCHYARD_STRATEGY", "cost");
    let config = SwitchyardConfig::default().with_env_overrides();
    assert_eq!(config.server.port, 9999);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.routing.default_strategy, RoutingStrategy::Cost);

    std::env::set_var("SWITCHYARD_PORT", "not-a-number");
    std::env::set_var("SWITCHYARD_STRATEGY", "fastest");
    std::env::set_var("SWITCHYARD_LOG_FORMAT", "xml");
    let config = SwitchyardConfig::default().with_env_overrides();
    assert_eq!(config.server.port, 8700);
    assert_eq!(config.routing.default_strategy, RoutingStrategy::Hybrid);
    assert_eq!(config.logging.format, LogFormat::Pretty);

    for var in VARS {
        std::env::remove_var(var);
    }
}
