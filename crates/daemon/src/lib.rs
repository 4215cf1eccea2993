// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Record Keeper daemon (rkd)
//!
//! Serves the record API over HTTP. On startup the daemon takes the log
//! lock, optionally replays the append log into the store, opens the log for
//! appending, and only then binds the listener.

pub mod config;
pub mod http;
pub mod lifecycle;
