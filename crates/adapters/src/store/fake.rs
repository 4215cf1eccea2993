// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MemoryStore, Store, StoreError};
use async_trait::async_trait;
use rk_core::{Record, RecordKey};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Get { id: RecordKey },
    Put { record: Record },
    CompareAndPut { record: Record, swapped: bool },
    Delete { id: RecordKey },
}

#[derive(Default)]
struct FakeStoreState {
    calls: Vec<StoreCall>,
    write_error: Option<StoreError>,
    read_error: Option<StoreError>,
    forced_conflicts: u32,
    latency: Option<Duration>,
}

/// Fake store backed by a [`MemoryStore`], with failure injection
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: MemoryStore,
    state: Arc<Mutex<FakeStoreState>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, for inspecting final state
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Make every write fail with `error` until cleared with `None`
    pub fn set_write_error(&self, error: Option<StoreError>) {
        self.lock().write_error = error;
    }

    /// Make every read fail with `error` until cleared with `None`
    pub fn set_read_error(&self, error: Option<StoreError>) {
        self.lock().read_error = error;
    }

    /// Report the next `count` compare-and-put calls as conflicts
    pub fn force_conflicts(&self, count: u32) {
        self.lock().forced_conflicts = count;
    }

    /// Sleep before every operation, widening race windows
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeStoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn pause(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn get(&self, id: &RecordKey) -> Result<Option<Record>, StoreError> {
        self.pause().await;
        let read_error = {
            let mut state = self.lock();
            state.calls.push(StoreCall::Get { id: id.clone() });
            state.read_error.clone()
        };
        if let Some(err) = read_error {
            return Err(err);
        }
        self.inner.get(id).await
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        self.pause().await;
        let write_error = {
            let mut state = self.lock();
            state.calls.push(StoreCall::Put {
                record: record.clone(),
            });
            state.write_error.clone()
        };
        if let Some(err) = write_error {
            return Err(err);
        }
        self.inner.put(record).await
    }

    async fn compare_and_put(
        &self,
        record: Record,
        expected: Option<&Record>,
    ) -> Result<bool, StoreError> {
        self.pause().await;
        let (write_error, forced_conflict) = {
            let mut state = self.lock();
            let forced = state.forced_conflicts > 0;
            if forced {
                state.forced_conflicts -= 1;
            }
            (state.write_error.clone(), forced)
        };
        if let Some(err) = write_error {
            return Err(err);
        }

        let swapped = if forced_conflict {
            false
        } else {
            self.inner.compare_and_put(record.clone(), expected).await?
        };
        self.lock()
            .calls
            .push(StoreCall::CompareAndPut { record, swapped });
        Ok(swapped)
    }

    async fn delete(&self, id: &RecordKey) -> Result<bool, StoreError> {
        self.pause().await;
        let write_error = {
            let mut state = self.lock();
            state.calls.push(StoreCall::Delete { id: id.clone() });
            state.write_error.clone()
        };
        if let Some(err) = write_error {
            return Err(err);
        }
        self.inner.delete(id).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
