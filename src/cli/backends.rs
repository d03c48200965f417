//! Backends command implementation

use crate::cli::output::{format_backends_json, format_backends_table, BackendView};
use crate::cli::{load_config_or_default, BackendsArgs};
use crate::service::RoutingService;

/// Handle `switchyard backends`
pub fn handle_backends(args: &BackendsArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_or_default(&args.config)?;
    let service = RoutingService::from_config(&config)?;
    render_backends(&service, args.json)
}

/// Render the registry of a built service
pub fn render_backends(
    service: &RoutingService,
    json: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let views: Vec<BackendView> = service.backends().iter().map(BackendView::from).collect();

    if json {
        Ok(format_backends_json(&views)?)
    } else {
        Ok(format_backends_table(&views))
    }
}
