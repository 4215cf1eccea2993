// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, replay, serving, shutdown.

use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use fs2::FileExt;
use rk_adapters::{MemoryIndex, MemoryStore, TracedIndex, TracedStore};
use rk_core::SystemClock;
use rk_engine::{Reconciler, RecordService, ReplayEngine, ReplayError, ReplayReport};
use rk_storage::{LogAppender, LogError, LogReader};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::http;

/// Record service with concrete adapter types (wrapped with tracing)
pub type DaemonService =
    RecordService<TracedStore<MemoryStore>, TracedIndex<MemoryIndex>, SystemClock>;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock on {0}: daemon already running?")]
    LockFailed(std::path::PathBuf, #[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Append log error: {0}")]
    Log(#[from] LogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    lock_file: File,
    listener: TcpListener,
    appender: Arc<LogAppender>,
    service: Arc<DaemonService>,
    /// Result of the startup replay, when one ran
    pub replay: Option<ReplayReport>,
}

impl DaemonState {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn service(&self) -> &Arc<DaemonService> {
        &self.service
    }

    /// Serve requests until `signal` resolves, then shut down
    pub async fn run<F>(self, signal: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = http::router(Arc::clone(&self.service), &self.config.server.api_key);
        let DaemonState {
            config,
            lock_file,
            listener,
            appender,
            ..
        } = self;

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await;
        if let Err(e) = &served {
            error!("Server error: {}", e);
        }

        shutdown(&config, lock_file, &appender).await;
        served.map_err(LifecycleError::Io)
    }
}

/// Drain the log and release the lock
async fn shutdown(config: &Config, lock_file: File, appender: &LogAppender) {
    info!("Shutting down daemon...");

    // 1. Listener already closed by graceful shutdown

    // 2. Drain queued log lines, flush and sync
    appender.close().await;
    let stats = appender.stats();
    info!(
        appended = stats.appended,
        failed = stats.failed,
        "Append log closed"
    );

    // 3. Release and remove the lock file
    if let Err(e) = FileExt::unlock(&lock_file) {
        warn!("Failed to unlock {}: {}", config.lock_path().display(), e);
    }
    drop(lock_file);
    let lock_path = config.lock_path();
    if lock_path.exists() {
        if let Err(e) = std::fs::remove_file(&lock_path) {
            warn!("Failed to remove lock file: {}", e);
        }
    }

    info!("Daemon shutdown complete");
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config, &e);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create the log directory
    if let Some(parent) = config.log.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // 2. Acquire lock file FIRST - one writer per log
    let lock_path = config.lock_path();
    let mut lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(lock_path.clone(), e))?;

    // Write PID to lock file
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // 3. Set up adapters (wrapped with tracing for observability)
    let store = TracedStore::new(MemoryStore::new());
    let index = TracedIndex::new(MemoryIndex::new());
    let reconciler = Reconciler::new(store, index, SystemClock);

    // 4. Replay BEFORE opening for append and before binding
    let replay = if config.replay.enabled {
        Some(replay_log(config, &reconciler).await)
    } else {
        info!("Replay disabled, starting with an empty store");
        None
    };

    // 5. Open the append log
    let appender = Arc::new(LogAppender::open(&config.log.path, config.log.queue_depth)?);
    let service = Arc::new(RecordService::new(reconciler, Arc::clone(&appender)));

    // 6. Bind (LAST - only after all validation passes)
    let listener = TcpListener::bind(config.server.bind)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.server.bind, e))?;

    info!("Daemon started, log at {}", config.log.path.display());

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        appender,
        service,
        replay,
    })
}

/// Replay the log; a failed pass is reported but never stops startup
async fn replay_log(
    config: &Config,
    reconciler: &Reconciler<TracedStore<MemoryStore>, TracedIndex<MemoryIndex>, SystemClock>,
) -> ReplayReport {
    let engine = ReplayEngine::new(config.replay.engine_config());
    let reader = LogReader::new(&config.log.path);

    match engine.replay(&reader, reconciler).await {
        Ok(report) => report,
        Err(ReplayError::Aborted { report, source }) => {
            error!(
                "Replay of {} aborted ({}): {}",
                config.log.path.display(),
                report,
                source
            );
            report
        }
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config, error: &LifecycleError) {
    // Another daemon owns the lock file; leave it alone
    if matches!(error, LifecycleError::LockFailed(..)) {
        return;
    }
    let lock_path = config.lock_path();
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
