//! Zipper daemon - Main Entry Point
//! REST server + background job runner

mod config;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{DaemonConfig, LogFormat};
use zipper_api_http::ApiServer;
use zipper_core::application::JobManager;
use zipper_core::port::RandomIdProvider;
use zipper_infra_system::{HttpFetcher, ZipPackager};

const DEFAULT_LOG_FILTER: &str =
    "zipper=info,zipperd=info,zipper_core=info,zipper_api_http=info,zipper_infra_system=info,actix_web=info";

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .context("Failed to create env filter")?;

    let installed = match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        }
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init(),
    };
    installed.context("Failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    init_logging(config.log_format)?;
    info!("Zipper daemon v{} starting...", zipper_core::VERSION);

    // 3. Setup dependencies (DI wiring)
    let fetcher = HttpFetcher::new(config.fetch()).context("HTTP client setup failed")?;
    let manager = JobManager::new(
        config.manager(),
        Arc::new(RandomIdProvider),
        Arc::new(fetcher),
        Arc::new(ZipPackager::new()),
    )
    .context("Job manager setup failed")?;

    // 4. Start HTTP server
    let server = ApiServer::new(config.http(), Arc::new(manager))
        .start()
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    info!(host = %config.host, port = config.port, "System ready. Waiting for tasks...");
    info!("Press Ctrl+C to shutdown");

    // 5. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 6. Graceful shutdown; running jobs end with the runtime
    server_handle.stop(true).await;
    match tokio::time::timeout(std::time::Duration::from_secs(5), server_task).await {
        Err(_) => warn!("HTTP server did not stop within 5s"),
        Ok(Err(e)) => warn!(error = %e, "HTTP server task failed"),
        Ok(Ok(Err(e))) => warn!(error = %e, "HTTP server exited with error"),
        Ok(Ok(Ok(()))) => {}
    }

    info!("Shutdown complete.");
    Ok(())
}
