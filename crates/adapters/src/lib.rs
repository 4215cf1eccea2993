// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Capability adapters for the primary store and the search index

pub mod index;
pub mod store;
pub mod traced;

pub use index::{Index, IndexError, MemoryIndex};
pub use store::{MemoryStore, Store, StoreError};
pub use traced::{TracedIndex, TracedStore};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use index::{FakeIndex, IndexCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
