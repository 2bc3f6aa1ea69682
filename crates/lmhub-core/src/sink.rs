// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seam between the request path and the transaction recorder.

use async_trait::async_trait;

use crate::error::HubError;
use crate::types::TransactionRecord;

/// Destination for completed transaction records.
///
/// Implementations persist one record per resolved attempt. Callers must
/// treat `record` failures as non-fatal: telemetry loss never alters the
/// primary request/response flow.
#[async_trait]
pub trait TransactionSink: Send + Sync {
    /// Append one immutable record.
    async fn record(&self, record: &TransactionRecord) -> Result<(), HubError>;
}
