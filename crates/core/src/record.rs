// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record: the unit of storage, identified by `(key, topic)`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace used when the ingestion layer receives an empty topic
pub const DEFAULT_TOPIC: &str = "default";

/// Composite identity of a record
///
/// Ordered by topic first so that a range over one topic is contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub topic: String,
    pub key: String,
}

impl RecordKey {
    pub fn new(key: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            topic: topic.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.topic, self.key)
    }
}

/// A stored record
///
/// Timestamps are epoch milliseconds. `created_at` is fixed at the first
/// successful write of a `(key, topic)` pair; `updated_at` moves on every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    /// Entries logged before topics existed belong to the default namespace
    #[serde(default = "default_topic")]
    pub topic: String,
    pub content: String,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub created_at: i64,
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

impl Record {
    /// Create a record with unset timestamps
    pub fn new(key: impl Into<String>, topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            topic: topic.into(),
            content: content.into(),
            updated_at: 0,
            created_at: 0,
        }
    }

    /// Builder-style timestamp setter
    pub fn with_timestamps(mut self, created_at: i64, updated_at: i64) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Composite identity of this record
    pub fn id(&self) -> RecordKey {
        RecordKey::new(self.key.clone(), self.topic.clone())
    }

    /// A record is valid when it has a non-empty key
    pub fn is_valid(&self) -> bool {
        !self.key.is_empty()
    }

    /// Whether `other` addresses the same `(key, topic)`
    pub fn same_identity(&self, other: &Record) -> bool {
        self.key == other.key && self.topic == other.topic
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
