//! CLI module for Switchyard
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the routing server
//! - `backends` - Show configured backends
//! - `route` - Dry-run a selection against the configured backends
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start server with default config
//! switchyard serve
//!
//! # Which backend would take an mp4 under the cost strategy?
//! switchyard route video/mp4 --size 1048576 --strategy cost
//!
//! # Generate shell completions
//! switchyard completions bash > ~/.bash_completion.d/switchyard
//! ```

pub mod backends;
pub mod completions;
pub mod config;
pub mod output;
pub mod route;
pub mod serve;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::config::SwitchyardConfig;

/// Switchyard - adaptive content routing
#[derive(Parser, Debug)]
#[command(
    name = "switchyard",
    version,
    about = "Adaptive content-routing service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the routing server
    Serve(ServeArgs),
    /// Show configured backends
    Backends(BackendsArgs),
    /// Dry-run a selection against the configured backends
    Route(RouteArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "switchyard.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "SWITCHYARD_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "SWITCHYARD_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "SWITCHYARD_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Override the default routing strategy
    #[arg(short, long)]
    pub strategy: Option<String>,
}

#[derive(Args, Debug)]
pub struct BackendsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "switchyard.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// MIME type of the content, e.g. video/mp4
    pub content_type: String,

    /// Content size in bytes
    #[arg(long, default_value = "0")]
    pub size: i64,

    /// Routing strategy (content_type, cost, performance, hybrid)
    #[arg(short, long)]
    pub strategy: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, default_value = "switchyard.toml")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "switchyard.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

/// Load a config file for the offline commands.
///
/// A missing file falls back to defaults; a file that exists but does not
/// parse is an error.
pub fn load_config_or_default(path: &Path) -> Result<SwitchyardConfig, Box<dyn std::error::Error>> {
    let config = if path.exists() {
        SwitchyardConfig::load(Some(path))?
    } else {
        SwitchyardConfig::default()
    };
    Ok(config.with_env_overrides())
}
