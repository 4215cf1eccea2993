// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Primary record store capability

mod memory;

pub use memory::MemoryStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use async_trait::async_trait;
use rk_core::{Record, RecordKey};
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store timed out: {0}")]
    Timeout(String),
}

/// Key-addressable persistence for records
///
/// Implementations are shared across request tasks and must synchronize
/// internally. A record is addressed by its composite `(key, topic)`.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// Exact lookup by composite key; `Ok(None)` when absent
    async fn get(&self, id: &RecordKey) -> Result<Option<Record>, StoreError>;

    /// Unconditionally write `record` at its composite key
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    /// Atomically write `record` only if the current value equals `expected`
    ///
    /// `expected == None` means the key must be absent. Returns `Ok(false)`
    /// without writing when the current value differs.
    async fn compare_and_put(
        &self,
        record: Record,
        expected: Option<&Record>,
    ) -> Result<bool, StoreError>;

    /// Remove the record at `id`; returns whether one existed
    async fn delete(&self, id: &RecordKey) -> Result<bool, StoreError>;
}
