// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rk-core: Core types for the Record Keeper store
//!
//! This crate provides:
//! - The `Record` unit of storage and its composite `(key, topic)` identity
//! - Clock abstraction producing epoch-millisecond timestamps
//! - The log-line codec (JSON → gzip → base64)

pub mod clock;
pub mod codec;
pub mod record;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use codec::{decode, encode, CodecError};
pub use record::{Record, RecordKey, DEFAULT_TOPIC};
