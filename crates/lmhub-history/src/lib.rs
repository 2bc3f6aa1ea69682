// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction history persistence for lmhub.
//!
//! Wraps a single SQLite database holding the `request_history` audit
//! table. Writes are serialized through one background connection thread;
//! recording failures are surfaced as [`lmhub_core::HubError::Storage`]
//! and it is the caller's policy (not this crate's) whether they are fatal.

pub mod store;

pub use store::HistoryStore;
