// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup replay of the append log
//!
//! ```text
//! LogReader ─► scanner (blocking) ─► decode ─► hash(key, topic) ─┬─► worker 0 ─┐
//!                                                                ├─► worker 1 ─┼─► Reconciler
//!                                                                └─► worker N ─┘
//! ```
//!
//! Every line for one `(key, topic)` lands on the same worker, so per-key
//! order follows file order. The reconciler's stale-line guard covers logs
//! whose lines were appended out of timestamp order.

use crate::error::{ReconcileError, ReplayError};
use crate::reconciler::{ApplyOutcome, Reconciler, WriteMode};
use rk_adapters::{Index, Store};
use rk_core::{decode, Clock, Record, RecordKey};
use rk_storage::{LogError, LogLines, LogReader};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Replay pool sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayConfig {
    pub workers: usize,
    /// Bounded queue per worker
    pub queue_depth: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            queue_depth: 256,
        }
    }
}

/// Counts from one replay pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Lines written to the store
    pub applied: u64,
    /// Lines that could not be decoded or written
    pub failed: u64,
    /// Lines older than the stored record
    pub skipped: u64,
    /// Applied lines whose index write failed
    pub unindexed: u64,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "applied={} failed={} skipped={} unindexed={}",
            self.applied, self.failed, self.skipped, self.unindexed
        )
    }
}

#[derive(Default)]
struct Counters {
    applied: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    unindexed: AtomicU64,
}

impl Counters {
    fn report(&self) -> ReplayReport {
        ReplayReport {
            applied: self.applied.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            unindexed: self.unindexed.load(Ordering::Relaxed),
        }
    }
}

type Work = (u64, Record);

/// Replays a log through a bounded worker pool
pub struct ReplayEngine {
    config: ReplayConfig,
}

impl ReplayEngine {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    /// Apply every decodable line of the log, returning once all workers drain
    ///
    /// Undecodable lines and per-record write failures are counted and
    /// skipped. Only an I/O error on the log itself stops the pass.
    pub async fn replay<S, I, C>(
        &self,
        reader: &LogReader,
        reconciler: &Reconciler<S, I, C>,
    ) -> Result<ReplayReport, ReplayError>
    where
        S: Store,
        I: Index,
        C: Clock,
    {
        let counters = Arc::new(Counters::default());
        let lines = reader.lines().map_err(|source| ReplayError::Aborted {
            report: counters.report(),
            source,
        })?;

        let workers = self.config.workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers {
            let (tx, rx) = mpsc::channel(self.config.queue_depth.max(1));
            senders.push(tx);
            handles.push(tokio::spawn(run_worker(
                worker,
                rx,
                reconciler.clone(),
                Arc::clone(&counters),
            )));
        }

        let scan_counters = Arc::clone(&counters);
        let scanned = tokio::task::spawn_blocking(move || scan(lines, senders, &scan_counters)).await;

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "replay worker panicked");
            }
        }

        let report = counters.report();
        let scanned = match scanned {
            Ok(result) => result,
            Err(e) => Err(LogError::Io(std::io::Error::other(e.to_string()))),
        };
        if let Err(source) = scanned {
            tracing::error!(path = %reader.path().display(), %report, error = %source, "replay aborted");
            return Err(ReplayError::Aborted { report, source });
        }

        tracing::info!(
            path = %reader.path().display(),
            applied = report.applied,
            failed = report.failed,
            skipped = report.skipped,
            unindexed = report.unindexed,
            "replay complete"
        );
        Ok(report)
    }
}

/// Worker slot for a composite key
fn route(id: &RecordKey, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}

/// Read, decode and dispatch every line; senders close when this returns
fn scan(
    lines: LogLines,
    senders: Vec<mpsc::Sender<Work>>,
    counters: &Counters,
) -> Result<(), LogError> {
    for line in lines {
        let line = line?;
        let record = match decode(&line.bytes) {
            Ok(record) => record,
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(line = line.number, kind = e.kind(), error = %e, "skipping undecodable log line");
                continue;
            }
        };

        let slot = route(&record.id(), senders.len());
        if senders[slot].blocking_send((line.number, record)).is_err() {
            // Worker gone; nothing more can be applied
            return Err(LogError::Closed);
        }
    }
    Ok(())
}

async fn run_worker<S, I, C>(
    worker: usize,
    mut rx: mpsc::Receiver<Work>,
    reconciler: Reconciler<S, I, C>,
    counters: Arc<Counters>,
) where
    S: Store,
    I: Index,
    C: Clock,
{
    while let Some((line, record)) = rx.recv().await {
        match reconciler.apply(record, WriteMode::Replay).await {
            Ok(ApplyOutcome::Created(_) | ApplyOutcome::Updated(_)) => {
                counters.applied.fetch_add(1, Ordering::Relaxed);
            }
            Ok(ApplyOutcome::Stale { .. }) => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(ReconcileError::IndexWrite { record, source }) => {
                counters.applied.fetch_add(1, Ordering::Relaxed);
                counters.unindexed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(line, id = %record.id(), error = %source, "replayed record not indexed");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(worker, line, error = %e, "replay apply failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
