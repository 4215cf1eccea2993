// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process record store

use super::{Store, StoreError};
use async_trait::async_trait;
use rk_core::{Record, RecordKey};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Hash-map backed store, rebuilt from the append log on startup
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<RecordKey, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records ordered by composite key
    pub fn snapshot(&self) -> Vec<Record> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Record> = records.values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(&b.id()));
        all
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, id: &RecordKey) -> Result<Option<Record>, StoreError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(id).cloned())
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.id(), record);
        Ok(())
    }

    async fn compare_and_put(
        &self,
        record: Record,
        expected: Option<&Record>,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        let id = record.id();
        if records.get(&id) != expected {
            return Ok(false);
        }
        records.insert(id, record);
        Ok(true)
    }

    async fn delete(&self, id: &RecordKey) -> Result<bool, StoreError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        Ok(records.remove(id).is_some())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
