// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secondary search index capability

mod memory;

pub use memory::MemoryIndex;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeIndex, IndexCall};

use async_trait::async_trait;
use rk_core::RecordKey;
use thiserror::Error;

/// Errors from index operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("index unavailable: {0}")]
    Unavailable(String),
    #[error("index timed out: {0}")]
    Timeout(String),
}

/// Topic-scoped text search over record content
///
/// Documents are identified by the record's composite key so a hit can be
/// resolved back to the full record through the store.
#[async_trait]
pub trait Index: Clone + Send + Sync + 'static {
    /// Insert or replace the document for `id`
    async fn index(&self, id: &RecordKey, topic: &str, content: &str) -> Result<(), IndexError>;

    /// Ids of documents in `topic` whose content matches `query`, in index order
    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RecordKey>, IndexError>;

    /// Drop the document for `id`; returns whether one existed
    async fn remove(&self, id: &RecordKey) -> Result<bool, IndexError>;
}
