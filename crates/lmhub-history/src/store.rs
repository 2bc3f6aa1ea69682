// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed store for transaction records.
//!
//! All operations go through the single tokio-rusqlite background thread,
//! which serializes writes. Records are immutable once inserted; the only
//! deletions are age-based retention cleanup and an explicit clear-all.

use async_trait::async_trait;
use tracing::{debug, info};

use lmhub_core::{HubError, TransactionRecord, TransactionSink, TransactionStatus};

/// Convert a tokio-rusqlite error into HubError::Storage.
fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> HubError {
    HubError::Storage {
        source: Box::new(e),
    }
}

/// Persistent transaction history backed by SQLite.
pub struct HistoryStore {
    conn: tokio_rusqlite::Connection,
}

impl HistoryStore {
    /// Open (or create) the history database at `path`.
    ///
    /// Parent directories are created as needed, and the schema is applied
    /// idempotently on every open.
    pub async fn open(path: &str) -> Result<Self, HubError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| HubError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| HubError::Storage {
                source: Box::new(e),
            })?;

        conn.call(|conn| {
            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS request_history (
                    id TEXT PRIMARY KEY,
                    timestamp TEXT NOT NULL,
                    client_name TEXT,
                    client_version TEXT,
                    method TEXT NOT NULL,
                    tool_name TEXT,
                    model TEXT,
                    duration_ms INTEGER,
                    input_tokens INTEGER,
                    output_tokens INTEGER,
                    total_tokens INTEGER,
                    request_preview TEXT,
                    response_preview TEXT,
                    status TEXT NOT NULL,
                    error_message TEXT
                );
                CREATE INDEX IF NOT EXISTS idx_timestamp ON request_history(timestamp DESC);
                CREATE INDEX IF NOT EXISTS idx_client ON request_history(client_name);
                CREATE INDEX IF NOT EXISTS idx_model ON request_history(model);",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, "history store opened");
        Ok(Self { conn })
    }

    /// Insert one transaction record.
    pub async fn record(&self, record: &TransactionRecord) -> Result<(), HubError> {
        let r = record.clone();
        let status = r.status.to_string();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO request_history (
                        id, timestamp, client_name, client_version, method, tool_name,
                        model, duration_ms, input_tokens, output_tokens, total_tokens,
                        request_preview, response_preview, status, error_message
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    rusqlite::params![
                        r.id,
                        r.timestamp,
                        r.client_name,
                        r.client_version,
                        r.method,
                        r.tool_name,
                        r.model,
                        r.duration_ms,
                        r.input_tokens,
                        r.output_tokens,
                        r.total_tokens,
                        r.request_preview,
                        r.response_preview,
                        status,
                        r.error_message,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(id = %record.id, status = %record.status, "transaction recorded");
        Ok(())
    }

    /// Fetch one page of records, newest first, plus the total row count.
    ///
    /// `page` is 1-based; a `page` of 0 is treated as 1.
    pub async fn recent(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<TransactionRecord>, u64), HubError> {
        let offset = (page.max(1) - 1) as i64 * page_size as i64;
        let limit = page_size as i64;

        self.conn
            .call(move |conn| {
                let total: u64 = conn.query_row(
                    "SELECT COUNT(*) FROM request_history",
                    [],
                    |row| row.get(0),
                )?;

                let mut stmt = conn.prepare(
                    "SELECT id, timestamp, client_name, client_version, method, tool_name,
                            model, duration_ms, input_tokens, output_tokens, total_tokens,
                            request_preview, response_preview, status, error_message
                     FROM request_history ORDER BY timestamp DESC LIMIT ?1 OFFSET ?2",
                )?;
                let records = stmt
                    .query_map(rusqlite::params![limit, offset], row_to_record)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok((records, total))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Delete records older than `days_to_keep` days. Returns the number of
    /// rows removed.
    pub async fn cleanup_older_than(&self, days_to_keep: u32) -> Result<u64, HubError> {
        // Timestamps are millisecond-precision ISO 8601 UTC strings, so
        // lexical comparison against a cutoff in the same format is correct.
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(days_to_keep as i64))
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();

        let removed = self
            .conn
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM request_history WHERE timestamp < ?1",
                    rusqlite::params![cutoff],
                )?;
                Ok(n as u64)
            })
            .await
            .map_err(map_tr_err)?;

        if removed > 0 {
            info!(removed, days_to_keep, "retention cleanup removed records");
        }
        Ok(removed)
    }

    /// Delete every record.
    pub async fn clear_all(&self) -> Result<u64, HubError> {
        let removed = self
            .conn
            .call(|conn| {
                let n = conn.execute("DELETE FROM request_history", [])?;
                Ok(n as u64)
            })
            .await
            .map_err(map_tr_err)?;
        info!(removed, "history cleared");
        Ok(removed)
    }

    /// Close the underlying connection, flushing pending work.
    pub async fn close(self) -> Result<(), HubError> {
        self.conn.close().await.map_err(|e| HubError::Storage {
            source: Box::new(e),
        })
    }
}

#[async_trait]
impl TransactionSink for HistoryStore {
    async fn record(&self, record: &TransactionRecord) -> Result<(), HubError> {
        HistoryStore::record(self, record).await
    }
}

/// Map one `request_history` row back into a [`TransactionRecord`].
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let status_str: String = row.get(13)?;
    let status = status_str
        .parse::<TransactionStatus>()
        .unwrap_or(TransactionStatus::Error);

    Ok(TransactionRecord {
        id: row.get(0)?,
        timestamp: row.get(1)?,
        client_name: row.get(2)?,
        client_version: row.get(3)?,
        method: row.get(4)?,
        tool_name: row.get(5)?,
        model: row.get(6)?,
        duration_ms: row.get(7)?,
        input_tokens: row.get(8)?,
        output_tokens: row.get(9)?,
        total_tokens: row.get(10)?,
        request_preview: row.get(11)?,
        response_preview: row.get(12)?,
        status,
        error_message: row.get(14)?,
    })
}
