//! Switchyard - adaptive content routing
//!
//! Picks the best backend for each piece of content from its MIME type and
//! size, learns from reported outcomes, explains which scoring factors have
//! been driving successful routes, and streams fleet health.
//!
//! The core lives in [`service::RoutingService`]; [`api`] exposes it over HTTP.

pub mod api;
pub mod cli;
pub mod config;
pub mod insights;
pub mod learning;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod routing;
pub mod service;
