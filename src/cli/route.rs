//! Route command implementation
//!
//! Runs one selection against the configured backends without starting a
//! server. Nothing has been learned yet, so performance scores use the
//! neutral prior.

use crate::cli::output::{format_decision_json, format_decision_table};
use crate::cli::{load_config_or_default, RouteArgs};
use crate::routing::ContentDescriptor;
use crate::service::{RoutingService, SelectRequest};

/// Handle `switchyard route`
pub fn handle_route(args: &RouteArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_or_default(&args.config)?;
    let service = RoutingService::from_config(&config)?;
    route_with(&service, args)
}

/// Run the dry-run selection against an existing service
pub fn route_with(
    service: &RoutingService,
    args: &RouteArgs,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut request = SelectRequest::new(ContentDescriptor::new(&args.content_type, args.size));
    if let Some(ref strategy) = args.strategy {
        request = request.with_strategy(strategy);
    }

    let decision = service.select_backend(&request, None)?;

    if args.json {
        Ok(format_decision_json(&decision)?)
    } else {
        Ok(format_decision_table(&decision))
    }
}
