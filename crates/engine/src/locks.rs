// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-key lock table
//!
//! One async mutex per `(key, topic)` currently in use. Entries are created on
//! first lock and evicted when the last holder or waiter lets go, so the table
//! only ever holds keys with writes in flight.

use rk_core::RecordKey;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Table = Arc<Mutex<HashMap<RecordKey, Arc<AsyncMutex<()>>>>>;
type Acquire = Pin<Box<dyn Future<Output = OwnedMutexGuard<()>> + Send>>;

#[derive(Clone, Default)]
pub struct KeyLocks {
    table: Table,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`
    pub async fn lock(&self, id: &RecordKey) -> KeyGuard {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(table.entry(id.clone()).or_default())
        };
        let mut waiter = Waiter {
            table: Arc::clone(&self.table),
            id: id.clone(),
            acquire: Box::pin(slot.lock_owned()),
            acquired: false,
        };
        let guard = (&mut waiter.acquire).await;
        waiter.acquired = true;
        KeyGuard {
            table: Arc::clone(&self.table),
            id: id.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a holder or waiter
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A `lock` call that has not acquired its slot yet
///
/// Dropping it (the caller gave up waiting) evicts the entry when no holder
/// or other waiter is left. The pending acquire still owns a reference to
/// the slot at that point, so an idle slot has exactly two: the table's and
/// the acquire's.
struct Waiter {
    table: Table,
    id: RecordKey,
    acquire: Acquire,
    acquired: bool,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if self.acquired {
            return;
        }
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        let idle = table
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) == 2);
        if idle {
            table.remove(&self.id);
        }
    }
}

/// Exclusive access to one key; released on drop
pub struct KeyGuard {
    table: Table,
    id: RecordKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Holding the table lock keeps new waiters from cloning the slot
        // between the release and the count check.
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        self.guard.take();
        let idle = table
            .get(&self.id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1);
        if idle {
            table.remove(&self.id);
        }
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
