// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the write engine

use crate::replay::ReplayReport;
use rk_adapters::{IndexError, StoreError};
use rk_core::{Record, RecordKey};
use rk_storage::LogError;
use thiserror::Error;

/// Errors from applying one record
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// The current value could not be read; nothing was written
    #[error("store read failed for {id}: {source}")]
    StoreRead {
        id: RecordKey,
        #[source]
        source: StoreError,
    },
    /// Nothing was written
    #[error("store write failed for {id}: {source}")]
    StoreWrite {
        id: RecordKey,
        #[source]
        source: StoreError,
    },
    /// The store kept reporting a different current value
    #[error("store conflict on {id} after {attempts} attempts")]
    Conflict { id: RecordKey, attempts: u32 },
    /// The store holds `record` but the index does not
    #[error("index write failed for {}: {source}", record.id())]
    IndexWrite {
        record: Record,
        #[source]
        source: IndexError,
    },
}

/// Errors from read paths
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("store read failed: {0}")]
    Store(#[from] StoreError),
    #[error("index query failed: {0}")]
    Index(#[from] IndexError),
}

/// Replay stopped before the end of the log
///
/// Records applied before the failure stay applied.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay aborted ({report}): {source}")]
    Aborted {
        report: ReplayReport,
        #[source]
        source: LogError,
    },
}
