// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake index for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Index, IndexError, MemoryIndex};
use async_trait::async_trait;
use rk_core::RecordKey;
use std::sync::{Arc, Mutex};

/// Recorded index call
#[derive(Debug, Clone, PartialEq)]
pub enum IndexCall {
    Index {
        id: RecordKey,
        topic: String,
        content: String,
    },
    Search {
        topic: String,
        query: String,
    },
    Remove {
        id: RecordKey,
    },
}

#[derive(Default)]
struct FakeIndexState {
    calls: Vec<IndexCall>,
    index_error: Option<IndexError>,
}

/// Fake index backed by a [`MemoryIndex`], with failure injection
#[derive(Clone, Default)]
pub struct FakeIndex {
    inner: MemoryIndex,
    state: Arc<Mutex<FakeIndexState>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing index, for inspecting final state
    pub fn memory(&self) -> &MemoryIndex {
        &self.inner
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<IndexCall> {
        self.lock().calls.clone()
    }

    /// Make every `index` call fail with `error` until cleared with `None`
    pub fn set_index_error(&self, error: Option<IndexError>) {
        self.lock().index_error = error;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeIndexState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Index for FakeIndex {
    async fn index(&self, id: &RecordKey, topic: &str, content: &str) -> Result<(), IndexError> {
        let index_error = {
            let mut state = self.lock();
            state.calls.push(IndexCall::Index {
                id: id.clone(),
                topic: topic.to_string(),
                content: content.to_string(),
            });
            state.index_error.clone()
        };
        if let Some(err) = index_error {
            return Err(err);
        }
        self.inner.index(id, topic, content).await
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RecordKey>, IndexError> {
        self.lock().calls.push(IndexCall::Search {
            topic: topic.to_string(),
            query: query.to_string(),
        });
        self.inner.search(topic, query, limit, offset).await
    }

    async fn remove(&self, id: &RecordKey) -> Result<bool, IndexError> {
        self.lock().calls.push(IndexCall::Remove { id: id.clone() });
        self.inner.remove(id).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
