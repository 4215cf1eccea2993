// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record Keeper Daemon (rkd)
//!
//! Serves the record API and appends every accepted write to the log.

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use rk_daemon::config::{Args, Config, API_KEY_ENV};
use rk_daemon::lifecycle::{self, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments and load configuration
    let args = Args::parse();
    let config = Config::resolve(&args, std::env::var(API_KEY_ENV).ok())?;

    // Set up logging
    let _log_guard = setup_logging(&config)?;

    info!("Starting rkd on {}", config.server.bind);

    // Start daemon
    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    if let Some(report) = &daemon.replay {
        info!("Replay finished: {}", report);
    }

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready, listening on {}", daemon.local_addr()?);

    daemon
        .run(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
            }
        })
        .await?;

    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = match &config.logging.path {
        Some(path) => {
            // Create log directory if needed
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => std::path::PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;

            let file_name = path.file_name().ok_or_else(|| {
                LifecycleError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("logging.path has no file name: {}", path.display()),
                ))
            })?;
            let file_appender = tracing_appender::rolling::never(dir, file_name);
            tracing_appender::non_blocking(file_appender)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
