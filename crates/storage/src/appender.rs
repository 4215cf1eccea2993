// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background log appender
//!
//! Request handlers enqueue encoded lines and return immediately. A single
//! writer thread owns the [`AppendLog`], so lines land in the order they were
//! enqueued and the file handle is never shared.

use crate::log::{AppendLog, LogError};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Counters for lines handled by the writer thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppenderStats {
    pub appended: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    appended: AtomicU64,
    failed: AtomicU64,
}

/// Queue in front of an [`AppendLog`] drained by a dedicated thread
pub struct LogAppender {
    tx: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl LogAppender {
    /// Open the log and start the writer thread
    pub fn open(path: &Path, queue_depth: usize) -> Result<Self, LogError> {
        let log = AppendLog::open(path)?;
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let counters = Arc::new(Counters::default());

        let thread_counters = Arc::clone(&counters);
        let writer = std::thread::Builder::new()
            .name("log-appender".to_string())
            .spawn(move || drain(log, rx, &thread_counters))?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
            counters,
        })
    }

    /// Enqueue one line, waiting while the queue is full
    pub async fn append(&self, line: Vec<u8>) -> Result<(), LogError> {
        let tx = {
            let guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
            guard.clone().ok_or(LogError::Closed)?
        };
        tx.send(line).await.map_err(|_| LogError::Closed)
    }

    /// Stop accepting lines, drain the queue, and sync the file
    ///
    /// Safe to call more than once.
    pub async fn close(&self) {
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();

        let writer = self.writer.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = writer {
            let joined = tokio::task::spawn_blocking(move || handle.join()).await;
            if !matches!(joined, Ok(Ok(()))) {
                tracing::error!("log appender thread did not exit cleanly");
            }
        }
    }

    pub fn stats(&self) -> AppenderStats {
        AppenderStats {
            appended: self.counters.appended.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

impl Drop for LogAppender {
    fn drop(&mut self) {
        // Closing the channel lets the writer thread finish on its own
        self.tx.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

fn drain(mut log: AppendLog, mut rx: mpsc::Receiver<Vec<u8>>, counters: &Counters) {
    while let Some(line) = rx.blocking_recv() {
        write_line(&mut log, &line, counters);

        // Batch whatever else is already queued before flushing
        while let Ok(line) = rx.try_recv() {
            write_line(&mut log, &line, counters);
        }

        if let Err(e) = log.flush() {
            tracing::error!(path = %log.path().display(), error = %e, "log flush failed");
        }
    }

    if let Err(e) = log.sync() {
        tracing::error!(path = %log.path().display(), error = %e, "log sync failed");
    }
    tracing::debug!(lines = log.lines_written(), "log appender stopped");
}

fn write_line(log: &mut AppendLog, line: &[u8], counters: &Counters) {
    match log.append(line) {
        Ok(()) => {
            counters.appended.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            tracing::error!(path = %log.path().display(), error = %e, "log append failed");
        }
    }
}

#[cfg(test)]
#[path = "appender_tests.rs"]
mod tests;
