//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, SwitchyardConfig};
use crate::service::RoutingService;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<SwitchyardConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = if args.config.exists() {
        SwitchyardConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        SwitchyardConfig::default()
    };

    config = config.with_env_overrides();

    // CLI overrides have the highest priority
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if let Some(ref strategy) = args.strategy {
        config.routing.default_strategy = strategy.parse()?;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// Build the service with Prometheus export attached.
///
/// The global recorder can only be installed once per process; later calls
/// get a detached handle.
pub fn build_service(
    config: &SwitchyardConfig,
) -> Result<Arc<RoutingService>, Box<dyn std::error::Error>> {
    let handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
        tracing::debug!("Metrics already initialized, creating new handle: {}", e);
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle()
    });

    let service = RoutingService::from_config(config)?.with_prometheus(handle);
    Ok(Arc::new(service))
}

/// Wait for SIGINT or SIGTERM, or for `cancel_token` to be cancelled.
///
/// Ends every metrics stream before returning so that open SSE responses
/// finish and graceful shutdown can complete.
async fn shutdown_signal(service: Arc<RoutingService>, cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => {
            tracing::info!("Shutdown requested");
        }
    }

    cancel_token.cancel();
    service.shutdown();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!("Starting Switchyard server");
    tracing::debug!(?config, "Loaded configuration");

    let service = build_service(&config)?;
    let app = create_router(Arc::new(AppState::new(Arc::clone(&service))));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Switchyard API server listening");

    let cancel_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&service), cancel_token))
        .await?;

    tracing::info!("Switchyard server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::routing::RoutingStrategy;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn args(config: PathBuf) -> ServeArgs {
        ServeArgs {
            config,
            port: None,
            host: None,
            log_level: None,
            strategy: None,
        }
    }

    #[test]
    fn test_serve_config_loading() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let config = load_config_with_overrides(&args(temp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_serve_cli_overrides_config() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server]\nport = 8080").unwrap();

        let mut args = args(temp.path().to_path_buf());
        args.port = Some(9000);
        args.strategy = Some("performance".to_string());

        let config = load_config_with_overrides(&args).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.routing.default_strategy, RoutingStrategy::Performance);
    }

    #[test]
    fn test_serve_rejects_unknown_strategy_override() {
        let mut args = args(PathBuf::from("nonexistent.toml"));
        args.strategy = Some("round_robin".to_string());
        assert!(load_config_with_overrides(&args).is_err());
    }

    #[test]
    fn test_serve_broken_config_file_errors() {
        let temp = NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[server\nport = ").unwrap();
        assert!(load_config_with_overrides(&args(temp.path().to_path_buf())).is_err());
    }

    #[test]
    fn test_build_service_twice_reuses_recorder() {
        let mut config = SwitchyardConfig::default();
        config.backends.push(BackendConfig::new("a", &["*/*"], 0));

        let first = build_service(&config).unwrap();
        let second = build_service(&config).unwrap();
        assert_eq!(first.backends().len(), 1);
        assert_eq!(second.backends().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_signal_ends_metrics_streams() {
        use futures::StreamExt;

        let mut config = SwitchyardConfig::default();
        config.backends.push(BackendConfig::new("a", &["*/*"], 0));
        let service = Arc::new(RoutingService::from_config(&config).unwrap());
        let mut stream = service.stream_metrics(60, false);
        assert!(stream.next().await.is_some());

        let cancel = CancellationToken::new();
        let signal = tokio::spawn(shutdown_signal(Arc::clone(&service), cancel.clone()));
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), signal)
            .await
            .unwrap()
            .unwrap();
        assert!(service.streamer().is_shutdown());
        assert!(stream.next().await.is_none());
    }
}
