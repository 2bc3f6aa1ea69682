// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lmhub history` subcommand implementations.

use lmhub_config::HubConfig;
use lmhub_core::{HubError, TransactionStatus};
use lmhub_history::HistoryStore;

/// Print the most recent transactions, newest first.
pub async fn run_recent(config: &HubConfig, limit: u32) -> Result<(), HubError> {
    let store = HistoryStore::open(&config.history.database_path).await?;
    let (records, total) = store.recent(1, limit).await?;

    if records.is_empty() {
        println!("No transactions recorded yet.");
        return Ok(());
    }

    println!("Showing {} of {total} transactions:\n", records.len());
    for record in &records {
        let marker = match record.status {
            TransactionStatus::Success => "ok ",
            TransactionStatus::Error => "ERR",
        };
        let tool = record.tool_name.as_deref().unwrap_or(record.method.as_str());
        let model = record.model.as_deref().unwrap_or("-");
        let tokens = record
            .total_tokens
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} {} {:<14} {:<20} {:>6} tok {:>6}ms  {}",
            marker,
            record.timestamp,
            tool,
            model,
            tokens,
            record.duration_ms,
            record.request_preview
        );
        if let Some(err) = &record.error_message {
            println!("      {err}");
        }
    }

    store.close().await?;
    Ok(())
}

/// Delete every recorded transaction.
pub async fn run_clear(config: &HubConfig) -> Result<(), HubError> {
    let store = HistoryStore::open(&config.history.database_path).await?;
    let removed = store.clear_all().await?;
    println!("Removed {removed} transaction(s).");
    store.close().await?;
    Ok(())
}
