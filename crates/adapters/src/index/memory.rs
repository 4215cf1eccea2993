// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process substring index

use super::{Index, IndexError};
use async_trait::async_trait;
use rk_core::RecordKey;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Case-insensitive substring index
///
/// Documents are kept in a `BTreeMap` ordered by `(topic, key)`, so a search
/// scans a single contiguous topic range and returns hits in key order.
#[derive(Clone, Default)]
pub struct MemoryIndex {
    docs: Arc<RwLock<BTreeMap<RecordKey, String>>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a document exists for `id`
    pub fn contains(&self, id: &RecordKey) -> bool {
        self.docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(id)
    }
}

#[async_trait]
impl Index for MemoryIndex {
    async fn index(&self, id: &RecordKey, topic: &str, content: &str) -> Result<(), IndexError> {
        // The document lives under the topic it was indexed with
        let doc_id = RecordKey::new(id.key.clone(), topic);
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        docs.insert(doc_id, content.to_lowercase());
        Ok(())
    }

    async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RecordKey>, IndexError> {
        let needle = query.to_lowercase();
        let docs = self.docs.read().unwrap_or_else(|e| e.into_inner());
        let start = RecordKey::new(String::new(), topic);

        let hits = docs
            .range(start..)
            .take_while(|(id, _)| id.topic == topic)
            .filter(|(_, content)| content.contains(&needle))
            .skip(offset)
            .take(limit)
            .map(|(id, _)| id.clone())
            .collect();
        Ok(hits)
    }

    async fn remove(&self, id: &RecordKey) -> Result<bool, IndexError> {
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        Ok(docs.remove(id).is_some())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
