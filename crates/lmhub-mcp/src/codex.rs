// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Codex CLI delegation.
//!
//! Runs `codex exec --skip-git-repo-check --full-auto <task>` as a child
//! process. Codex authenticates through its own ChatGPT login, so no API
//! key flows through lmhub for these tasks.

use std::process::Stdio;
use std::time::Duration;

use tracing::debug;

use lmhub_core::HubError;

/// Shown when the Codex binary cannot be found on PATH.
const INSTALL_HINT: &str = "Install: npm install -g @openai/codex, then run: codex login";

/// Placeholder for a clean exit that produced no stdout.
const NO_OUTPUT_PLACEHOLDER: &str = "(Codex completed with no output)";

/// Runs Codex CLI tasks with a wall-clock limit.
#[derive(Debug, Clone)]
pub struct CodexRunner {
    binary: String,
    timeout: Duration,
}

impl CodexRunner {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Run one autonomous Codex task and return its trimmed stdout.
    ///
    /// `working_dir` defaults to the hub process's current directory.
    pub async fn run(&self, task: &str, working_dir: Option<&str>) -> Result<String, HubError> {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.args(["exec", "--skip-git-repo-check", "--full-auto", task])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        debug!(binary = %self.binary, timeout = ?self.timeout, "running codex task");

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| HubError::ExternalTool {
                message: format!("Codex timed out after {}s", self.timeout.as_secs()),
                remediation: None,
            })?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    HubError::ExternalTool {
                        message: "Codex CLI not found".to_string(),
                        remediation: Some(INSTALL_HINT.to_string()),
                    }
                } else {
                    HubError::ExternalTool {
                        message: format!("Codex CLI error: {e}"),
                        remediation: None,
                    }
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // A non-zero exit with output is still useful; only a silent
        // failure becomes an error.
        if !output.status.success() && stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!(
                    "Codex exited with code {}",
                    output.status.code().unwrap_or(-1)
                )
            } else {
                stderr
            };
            return Err(HubError::ExternalTool {
                message,
                remediation: None,
            });
        }

        if stdout.is_empty() {
            Ok(NO_OUTPUT_PLACEHOLDER.to_string())
        } else {
            Ok(stdout)
        }
    }

    /// Probe for the Codex binary via `codex --version` (5 second cap).
    ///
    /// Returns the trimmed version string when the binary responds.
    pub async fn version(&self) -> Option<String> {
        let mut cmd = tokio::process::Command::new(&self.binary);
        cmd.arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(Duration::from_secs(5), cmd.output())
            .await
            .ok()?
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!version.is_empty()).then_some(version)
    }
}
