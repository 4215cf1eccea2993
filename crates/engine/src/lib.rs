// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Record Keeper write engine
//!
//! Live writes and replayed log lines take the same path through the
//! [`Reconciler`]; they differ only in how timestamps are chosen.

mod error;
mod locks;
mod reconciler;
mod replay;
mod service;

pub use error::{QueryError, ReconcileError, ReplayError};
pub use locks::{KeyGuard, KeyLocks};
pub use reconciler::{ApplyOutcome, Reconciler, WriteMode};
pub use replay::{ReplayConfig, ReplayEngine, ReplayReport};
pub use service::{normalize_topic, AddOutcome, RecordService};
