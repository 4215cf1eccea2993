// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Create-or-update reconciliation
//!
//! Each apply is a read-modify-write on one `(key, topic)`:
//!
//! 1. take the key's lock
//! 2. read the current record from the store
//! 3. decide create vs update and choose timestamps
//! 4. commit with `compare_and_put` against what was read
//! 5. index the committed record
//!
//! The store write is the commit point. An index failure after it is
//! reported as [`ReconcileError::IndexWrite`] carrying the stored record;
//! the store write is not rolled back.

use crate::error::ReconcileError;
use crate::locks::KeyLocks;
use rk_adapters::{Index, Store};
use rk_core::{Clock, Record};

/// Attempts at `compare_and_put` before giving up on a contended key
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Where an incoming record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Request from a client: timestamps come from the clock
    Live,
    /// Decoded log line: timestamps come from the line
    Replay,
}

/// What an apply did to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created(Record),
    Updated(Record),
    /// Replay line older than the stored record; nothing written
    Stale { stored_updated_at: i64 },
}

impl ApplyOutcome {
    /// The record now in the store, if this apply wrote one
    pub fn record(&self) -> Option<&Record> {
        match self {
            ApplyOutcome::Created(r) | ApplyOutcome::Updated(r) => Some(r),
            ApplyOutcome::Stale { .. } => None,
        }
    }
}

/// Applies records to a store/index pair with per-key serialization
#[derive(Clone)]
pub struct Reconciler<S, I, C> {
    store: S,
    index: I,
    clock: C,
    locks: KeyLocks,
}

impl<S, I, C> Reconciler<S, I, C>
where
    S: Store,
    I: Index,
    C: Clock,
{
    pub fn new(store: S, index: I, clock: C) -> Self {
        Self {
            store,
            index,
            clock,
            locks: KeyLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Apply one incoming record
    pub async fn apply(
        &self,
        incoming: Record,
        mode: WriteMode,
    ) -> Result<ApplyOutcome, ReconcileError> {
        if !incoming.is_valid() {
            return Err(ReconcileError::InvalidRecord("key must not be empty".into()));
        }

        let id = incoming.id();
        let _guard = self.locks.lock(&id).await;

        let mut attempts = 0;
        let (record, created) = loop {
            attempts += 1;
            let existing = self
                .store
                .get(&id)
                .await
                .map_err(|source| ReconcileError::StoreRead {
                    id: id.clone(),
                    source,
                })?;

            let Some(next) = self.next_state(&incoming, existing.as_ref(), mode) else {
                let stored_updated_at = existing.map(|r| r.updated_at).unwrap_or_default();
                tracing::debug!(%id, incoming = incoming.updated_at, stored_updated_at, "stale replay line");
                return Ok(ApplyOutcome::Stale { stored_updated_at });
            };

            let swapped = self
                .store
                .compare_and_put(next.clone(), existing.as_ref())
                .await
                .map_err(|source| ReconcileError::StoreWrite {
                    id: id.clone(),
                    source,
                })?;
            if swapped {
                break (next, existing.is_none());
            }

            tracing::warn!(%id, attempts, "store changed during apply, retrying");
            if attempts >= MAX_COMMIT_ATTEMPTS {
                return Err(ReconcileError::Conflict { id, attempts });
            }
        };

        if let Err(source) = self.index.index(&id, &record.topic, &record.content).await {
            return Err(ReconcileError::IndexWrite { record, source });
        }

        if created {
            tracing::debug!(%id, ?mode, created_at = record.created_at, "created");
            Ok(ApplyOutcome::Created(record))
        } else {
            tracing::debug!(%id, ?mode, updated_at = record.updated_at, "updated");
            Ok(ApplyOutcome::Updated(record))
        }
    }

    /// Decide the record to store, or `None` when a replay line is stale
    fn next_state(
        &self,
        incoming: &Record,
        existing: Option<&Record>,
        mode: WriteMode,
    ) -> Option<Record> {
        let mut next = incoming.clone();

        match (existing, mode) {
            (None, WriteMode::Live) => {
                let now = self.clock.now_ms();
                next.created_at = now;
                next.updated_at = now;
                Some(next)
            }
            (Some(existing), WriteMode::Live) => {
                // Strictly increasing per key, even within one millisecond
                next.created_at = existing.created_at;
                next.updated_at = self
                    .clock
                    .now_ms()
                    .max(existing.updated_at.saturating_add(1));
                Some(next)
            }
            (None, WriteMode::Replay) => {
                let (created_at, updated_at) = self.logged_timestamps(incoming);
                next.created_at = created_at;
                next.updated_at = updated_at;
                Some(next)
            }
            (Some(existing), WriteMode::Replay) => {
                let (_, updated_at) = self.logged_timestamps(incoming);
                if updated_at < existing.updated_at {
                    return None;
                }
                next.created_at = existing.created_at;
                next.updated_at = updated_at;
                Some(next)
            }
        }
    }

    /// Timestamps carried by a log line, filled in where the line lacks them
    fn logged_timestamps(&self, record: &Record) -> (i64, i64) {
        match (record.created_at, record.updated_at) {
            (0, 0) => {
                let now = self.clock.now_ms();
                (now, now)
            }
            (0, updated) => (updated, updated),
            (created, 0) => (created, created),
            (created, updated) => (created.min(updated), updated),
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
