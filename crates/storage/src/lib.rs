// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Append-only record log
//!
//! ```text
//! encoded line → LogAppender (bounded queue) → writer thread → AppendLog → disk
//!                                                                   ↓
//!                                                      LogReader → lines → replay
//! ```
//!
//! The store write is the commit point and the log line is written after the
//! caller has been answered. With an in-memory store the log is the only
//! history that survives a restart: a crash loses whatever was still queued
//! for the writer thread, and a graceful shutdown drains and syncs the queue
//! first.

mod appender;
mod log;

pub use appender::{AppenderStats, LogAppender};
pub use log::{AppendLog, LogError, LogLine, LogLines, LogReader};
