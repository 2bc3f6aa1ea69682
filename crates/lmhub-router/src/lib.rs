// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task classification and route resolution for lmhub.
//!
//! Given a request message and a snapshot of configured model entries,
//! this crate decides which entry should serve the request. The whole
//! pipeline is pure and synchronous: the same message against the same
//! snapshot always yields the same route.

pub mod classifier;
pub mod resolver;

pub use classifier::{classify, ClassificationResult};
pub use resolver::resolve;
