// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lmhub serve` command implementation.
//!
//! Starts the MCP server on stdio: resolves the configured model entries,
//! opens the history database, and hands the tool surface to the rmcp
//! service loop. stdout belongs to the MCP transport, so all logging goes
//! to stderr.

use std::sync::Arc;
use std::time::Duration;

use rmcp::{transport::stdio, ServiceExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lmhub_config::HubConfig;
use lmhub_core::{HubError, TransactionSink};
use lmhub_history::HistoryStore;
use lmhub_mcp::{CodexRunner, HubServer};
use lmhub_provider::ProviderClient;

/// Interval between retention cleanup passes while serving.
const RETENTION_SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs the `lmhub serve` command until the client disconnects or the
/// process is interrupted.
pub async fn run_serve(config: HubConfig) -> Result<(), HubError> {
    init_tracing(&config.hub.log_level);

    let entries = config.resolve_entries();
    let routable = entries
        .iter()
        .filter(|e| e.enabled && e.has_credential())
        .count();
    info!(
        configured = entries.len(),
        routable, "starting lmhub serve"
    );
    if routable == 0 {
        warn!("no entry is enabled with an API key; ai_ask will fail until one is configured");
    }

    let store = Arc::new(HistoryStore::open(&config.history.database_path).await?);

    // Retention runs once at startup and then daily in the background.
    if let Err(err) = store.cleanup_older_than(config.history.retention_days).await {
        warn!(error = %err, "startup retention cleanup failed");
    }
    let shutdown = CancellationToken::new();
    let retention = tokio::spawn(retention_loop(
        store.clone(),
        config.history.retention_days,
        shutdown.clone(),
    ));

    let client = ProviderClient::new(
        config.provider.temperature,
        Duration::from_secs(config.provider.timeout_secs),
    )?;
    let codex = CodexRunner::new(
        config.codex.binary.clone(),
        Duration::from_secs(config.codex.timeout_secs),
    );

    let sink: Arc<dyn TransactionSink> = store.clone();
    let server = HubServer::new(entries, client, codex, Some(sink));

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| HubError::Internal(format!("MCP initialization failed: {e}")))?;
    info!("MCP server ready on stdio");

    tokio::select! {
        quit = service.waiting() => {
            quit.map_err(|e| HubError::Internal(format!("MCP service failed: {e}")))?;
            info!("client disconnected");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    shutdown.cancel();
    let _ = retention.await;
    Ok(())
}

/// Background task deleting expired history records once per sweep interval.
async fn retention_loop(store: Arc<HistoryStore>, retention_days: u32, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(RETENTION_SWEEP_INTERVAL) => {
                if let Err(err) = store.cleanup_older_than(retention_days).await {
                    warn!(error = %err, "retention cleanup failed");
                }
            }
            _ = shutdown.cancelled() => return,
        }
    }
}

/// Initialize the tracing subscriber, writing to stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lmhub={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
