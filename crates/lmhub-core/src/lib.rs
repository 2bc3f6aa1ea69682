// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the lmhub routing hub.
//!
//! This crate provides the shared type vocabulary (task types, model
//! entries, route results, transaction records), the error taxonomy, and
//! the recorder trait seam used throughout the lmhub workspace.

pub mod error;
pub mod sink;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::HubError;
pub use sink::TransactionSink;
pub use types::{
    ModelEntry, RouteResult, TaskType, TransactionRecord, TransactionStatus, Usage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_error_has_all_variants() {
        // Verify all 8 error variants exist and can be constructed.
        let _config = HubError::Config("test".into());
        let _no_route = HubError::NoRoute { hint: None };
        let _http = HubError::ProviderHttp {
            label: "test".into(),
            status: 500,
            body: "oops".into(),
        };
        let _transport = HubError::ProviderTransport {
            message: "test".into(),
            source: None,
        };
        let _timeout = HubError::ProviderTimeout {
            duration: std::time::Duration::from_secs(60),
        };
        let _tool = HubError::ExternalTool {
            message: "test".into(),
            remediation: None,
        };
        let _storage = HubError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _internal = HubError::Internal("test".into());
    }

    #[test]
    fn sink_trait_is_object_safe() {
        fn _assert(_: &dyn TransactionSink) {}
    }
}
