// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lmhub doctor` command implementation.
//!
//! Runs diagnostic checks against the lmhub environment to identify
//! configuration issues, missing credentials, and connectivity problems.

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::time::{Duration, Instant};

use lmhub_config::HubConfig;
use lmhub_core::HubError;
use lmhub_mcp::CodexRunner;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

/// Run the `lmhub doctor` command.
///
/// Runs quick diagnostic checks. With `--deep`, also probes each enabled
/// endpoint and the database integrity. With `--plain`, disables colors.
pub async fn run_doctor(config: &HubConfig, deep: bool, plain: bool) -> Result<(), HubError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    results.push(check_entries(config));
    results.push(check_database(&config.history.database_path).await);
    results.push(check_codex(config).await);

    if deep {
        results.push(check_db_integrity(&config.history.database_path).await);
        results.push(check_endpoints(config).await);
    }

    println!();
    println!("  lmhub doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line;

        match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    let symbol = "✓".green().to_string();
                    line = format!(
                        "    {symbol} {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                } else {
                    line = format!(
                        "    [OK]   {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "!".yellow().to_string();
                    line = format!(
                        "    {symbol} {:<16} {} ({duration_ms}ms)",
                        result.name,
                        result.message.yellow()
                    );
                } else {
                    line = format!(
                        "    [WARN] {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    let symbol = "✗".red().to_string();
                    line = format!(
                        "    {symbol} {:<16} {} ({duration_ms}ms)",
                        result.name,
                        result.message.red()
                    );
                } else {
                    line = format!(
                        "    [FAIL] {:<16} {} ({duration_ms}ms)",
                        result.name, result.message
                    );
                }
            }
        }

        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Check that at least one entry is routable.
fn check_entries(config: &HubConfig) -> CheckResult {
    let start = Instant::now();
    let entries = config.resolve_entries();
    let routable = entries
        .iter()
        .filter(|e| e.enabled && e.has_credential())
        .count();

    if entries.is_empty() {
        CheckResult {
            name: "Models".to_string(),
            status: CheckStatus::Fail,
            message: "no [[models]] entries configured".to_string(),
            duration: start.elapsed(),
        }
    } else if routable == 0 {
        CheckResult {
            name: "Models".to_string(),
            status: CheckStatus::Warn,
            message: format!(
                "{} configured, none routable (set LMHUB_API_KEY_<ID> or api_key)",
                entries.len()
            ),
            duration: start.elapsed(),
        }
    } else {
        CheckResult {
            name: "Models".to_string(),
            status: CheckStatus::Pass,
            message: format!("{} configured, {routable} routable", entries.len()),
            duration: start.elapsed(),
        }
    }
}

/// Check the history database file exists and can be opened.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    let path = std::path::Path::new(db_path);

    if !path.exists() {
        return CheckResult {
            name: "History DB".to_string(),
            status: CheckStatus::Warn,
            message: format!("not found: {db_path} (will be created on first run)"),
            duration: start.elapsed(),
        };
    }

    match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let query_result: Result<(), tokio_rusqlite::Error<rusqlite::Error>> = conn
                .call(|conn| {
                    conn.execute_batch("SELECT 1")?;
                    Ok(())
                })
                .await;

            match query_result {
                Ok(()) => CheckResult {
                    name: "History DB".to_string(),
                    status: CheckStatus::Pass,
                    message: "connected".to_string(),
                    duration: start.elapsed(),
                },
                Err(e) => CheckResult {
                    name: "History DB".to_string(),
                    status: CheckStatus::Fail,
                    message: format!("query failed: {e}"),
                    duration: start.elapsed(),
                },
            }
        }
        Err(e) => CheckResult {
            name: "History DB".to_string(),
            status: CheckStatus::Fail,
            message: format!("open failed: {e}"),
            duration: start.elapsed(),
        },
    }
}

/// Probe the Codex CLI binary.
async fn check_codex(config: &HubConfig) -> CheckResult {
    let start = Instant::now();
    let runner = CodexRunner::new(config.codex.binary.clone(), Duration::from_secs(5));

    match runner.version().await {
        Some(version) => CheckResult {
            name: "Codex CLI".to_string(),
            status: CheckStatus::Pass,
            message: version,
            duration: start.elapsed(),
        },
        None => CheckResult {
            name: "Codex CLI".to_string(),
            status: CheckStatus::Warn,
            message: format!(
                "`{}` not responding (install: npm install -g @openai/codex)",
                config.codex.binary
            ),
            duration: start.elapsed(),
        },
    }
}

/// Deep check: SQLite integrity of the history database.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();

    if !std::path::Path::new(db_path).exists() {
        return CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Warn,
            message: "database not created yet".to_string(),
            duration: start.elapsed(),
        };
    }

    let outcome: Result<String, String> = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let checked: Result<String, tokio_rusqlite::Error<rusqlite::Error>> = conn
                .call(|conn| {
                    let result: String =
                        conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
                    Ok(result)
                })
                .await;
            checked.map_err(|e| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(result) if result == "ok" => CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Pass,
            message: "ok".to_string(),
            duration: start.elapsed(),
        },
        Ok(result) => CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Fail,
            message: result,
            duration: start.elapsed(),
        },
        Err(e) => CheckResult {
            name: "DB integrity".to_string(),
            status: CheckStatus::Fail,
            message: e,
            duration: start.elapsed(),
        },
    }
}

/// Deep check: reach each distinct enabled endpoint with a HEAD request.
///
/// Any HTTP response counts as reachable; we are probing the network path,
/// not authentication.
async fn check_endpoints(config: &HubConfig) -> CheckResult {
    let start = Instant::now();

    let urls: BTreeSet<String> = config
        .models
        .iter()
        .filter(|e| e.enabled)
        .map(|e| e.effective_base_url())
        .filter(|u| u.starts_with("https://"))
        .collect();

    if urls.is_empty() {
        return CheckResult {
            name: "Endpoints".to_string(),
            status: CheckStatus::Warn,
            message: "no enabled endpoints to probe".to_string(),
            duration: start.elapsed(),
        };
    }

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult {
                name: "Endpoints".to_string(),
                status: CheckStatus::Fail,
                message: format!("HTTP client error: {e}"),
                duration: start.elapsed(),
            };
        }
    };

    let mut unreachable = Vec::new();
    for url in &urls {
        if client.head(url).send().await.is_err() {
            unreachable.push(url.clone());
        }
    }

    if unreachable.is_empty() {
        CheckResult {
            name: "Endpoints".to_string(),
            status: CheckStatus::Pass,
            message: format!("{} reachable", urls.len()),
            duration: start.elapsed(),
        }
    } else {
        CheckResult {
            name: "Endpoints".to_string(),
            status: CheckStatus::Fail,
            message: format!("unreachable: {}", unreachable.join(", ")),
            duration: start.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_entries_warn_without_keys() {
        // Starter entries ship without credentials.
        let config = HubConfig::default();
        let result = check_entries(&config);
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("none routable"));
    }

    #[tokio::test]
    async fn missing_database_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        let result = check_database(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn integrity_check_passes_on_healthy_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        drop(conn);

        let result = check_db_integrity(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "ok");
    }

    #[tokio::test]
    async fn missing_codex_binary_is_a_warning() {
        let mut config = HubConfig::default();
        config.codex.binary = "lmhub-no-such-binary".to_string();
        let result = check_codex(&config).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("npm install"));
    }
}
