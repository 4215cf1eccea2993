// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::index::{Index, IndexError};
use crate::store::{Store, StoreError};
use async_trait::async_trait;
use rk_core::{Record, RecordKey};
use tracing::Instrument;

/// Wrapper that adds tracing to any Store
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Store for TracedStore<S> {
    async fn get(&self, id: &RecordKey) -> Result<Option<Record>, StoreError> {
        let result = self.inner.get(id).await;
        match &result {
            Ok(found) => tracing::trace!(%id, found = found.is_some(), "store.get"),
            Err(e) => tracing::error!(%id, error = %e, "store.get failed"),
        }
        result
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.put", id = %record.id());
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.put(record).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "written"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "put failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn compare_and_put(
        &self,
        record: Record,
        expected: Option<&Record>,
    ) -> Result<bool, StoreError> {
        let span = tracing::info_span!(
            "store.compare_and_put",
            id = %record.id(),
            expect_absent = expected.is_none()
        );
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.compare_and_put(record, expected).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(true) => tracing::debug!(elapsed_ms, "swapped"),
                Ok(false) => tracing::debug!(elapsed_ms, "conflict"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "compare_and_put failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, id: &RecordKey) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.delete", %id);
        async move {
            let result = self.inner.delete(id).await;
            match &result {
                Ok(existed) => tracing::info!(existed, "deleted"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Index
#[derive(Clone)]
pub struct TracedIndex<I> {
    inner: I,
}

impl<I> TracedIndex<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

#[async_trait]
impl<I: Index> Index for TracedIndex<I> {
    async fn index(&self, id: &RecordKey, topic: &str, content: &str) -> Result<(), IndexError> {
        let span = tracing::info_span!("index.index", %id, topic);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.index(id, topic, content).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, content_len = content.len(), "indexed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "index failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RecordKey>, IndexError> {
        let span = tracing::info_span!("index.search", topic, limit, offset);
        async move {
            let start = std::time::Instant::now();
            let result = self.inner.search(topic, query, limit, offset).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(hits) => tracing::debug!(elapsed_ms, hits = hits.len(), "searched"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "search failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn remove(&self, id: &RecordKey) -> Result<bool, IndexError> {
        let result = self.inner.remove(id).await;
        match &result {
            Ok(existed) => tracing::debug!(%id, existed, "index.remove"),
            // Removing from the index is best-effort; the store is authoritative
            Err(e) => tracing::warn!(%id, error = %e, "index.remove failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
