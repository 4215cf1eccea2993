// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingestion facade used by the HTTP surface

use crate::error::{QueryError, ReconcileError};
use crate::reconciler::{ApplyOutcome, Reconciler, WriteMode};
use rk_adapters::{Index, Store};
use rk_core::{encode, Clock, Record, RecordKey, DEFAULT_TOPIC};
use rk_storage::LogAppender;
use std::sync::Arc;

/// Result of a successful add
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    pub record: Record,
    /// False when the store took the write but the index did not
    pub indexed: bool,
}

/// Reconciles live writes and records them in the append log
pub struct RecordService<S, I, C> {
    reconciler: Reconciler<S, I, C>,
    appender: Arc<LogAppender>,
}

impl<S, I, C> RecordService<S, I, C>
where
    S: Store,
    I: Index,
    C: Clock,
{
    pub fn new(reconciler: Reconciler<S, I, C>, appender: Arc<LogAppender>) -> Self {
        Self {
            reconciler,
            appender,
        }
    }

    pub fn reconciler(&self) -> &Reconciler<S, I, C> {
        &self.reconciler
    }

    /// Create or update `(key, topic)`, then queue the result for the log
    ///
    /// The log line is queued whenever the store committed, including when
    /// only the index write failed. Returns once the line is queued, not
    /// written.
    pub async fn add(
        &self,
        key: &str,
        topic: &str,
        content: &str,
    ) -> Result<AddOutcome, ReconcileError> {
        let incoming = Record::new(key, normalize_topic(topic), content);
        let id = incoming.id();

        let outcome = match self.reconciler.apply(incoming, WriteMode::Live).await {
            Ok(ApplyOutcome::Created(record) | ApplyOutcome::Updated(record)) => AddOutcome {
                record,
                indexed: true,
            },
            // Live writes stamp past the stored value, so this means the store moved
            Ok(ApplyOutcome::Stale { .. }) => {
                return Err(ReconcileError::Conflict { id, attempts: 1 })
            }
            Err(ReconcileError::IndexWrite { record, source }) => {
                tracing::warn!(id = %record.id(), error = %source, "record stored but not indexed");
                AddOutcome {
                    record,
                    indexed: false,
                }
            }
            Err(e) => return Err(e),
        };

        self.log(&outcome.record).await;
        Ok(outcome)
    }

    async fn log(&self, record: &Record) {
        let line = match encode(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(id = %record.id(), error = %e, "record not logged");
                return;
            }
        };
        if let Err(e) = self.appender.append(line.into_bytes()).await {
            tracing::error!(id = %record.id(), error = %e, "record not logged");
        }
    }

    /// Look up one record by its composite key
    pub async fn get(&self, key: &str, topic: &str) -> Result<Option<Record>, QueryError> {
        let id = RecordKey::new(key, normalize_topic(topic));
        Ok(self.reconciler.store().get(&id).await?)
    }

    /// Search a topic and resolve hits through the store, in index order
    ///
    /// Hits whose record is no longer in the store are dropped.
    pub async fn search(
        &self,
        topic: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Record>, QueryError> {
        let topic = normalize_topic(topic);
        let ids = self
            .reconciler
            .index()
            .search(topic, query, limit, offset)
            .await?;

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.reconciler.store().get(&id).await? {
                Some(record) => records.push(record),
                None => tracing::debug!(%id, "index hit missing from store"),
            }
        }
        Ok(records)
    }
}

/// Empty topics belong to the default namespace
pub fn normalize_topic(topic: &str) -> &str {
    if topic.is_empty() {
        DEFAULT_TOPIC
    } else {
        topic
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
