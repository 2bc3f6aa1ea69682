// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the lmhub routing hub.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use lmhub_core::{ModelEntry, TaskType};

/// Top-level lmhub configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Hub identity and logging settings.
    #[serde(default)]
    pub hub: HubSection,

    /// Outbound provider call settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Transaction history storage settings.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Codex CLI delegation settings.
    #[serde(default)]
    pub codex: CodexConfig,

    /// Configured model entries, in declaration order.
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntryConfig>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            hub: HubSection::default(),
            provider: ProviderConfig::default(),
            history: HistoryConfig::default(),
            codex: CodexConfig::default(),
            models: default_models(),
        }
    }
}

/// Hub identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubSection {
    /// Display name announced to MCP clients.
    #[serde(default = "default_hub_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            name: default_hub_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_hub_name() -> String {
    "lmhub".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound provider call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Sampling temperature sent with every chat completion request.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

fn default_temperature() -> f64 {
    0.7
}

fn default_provider_timeout_secs() -> u64 {
    60
}

/// Transaction history storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Records older than this many days are removed by retention cleanup.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("lmhub").join("history.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("history.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_retention_days() -> u32 {
    30
}

/// Codex CLI delegation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodexConfig {
    /// Binary name or path of the Codex CLI.
    #[serde(default = "default_codex_binary")]
    pub binary: String,

    /// Wall-clock limit for one Codex run, in seconds.
    #[serde(default = "default_codex_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            binary: default_codex_binary(),
            timeout_secs: default_codex_timeout_secs(),
        }
    }
}

fn default_codex_binary() -> String {
    "codex".to_string()
}

fn default_codex_timeout_secs() -> u64 {
    300
}

/// One `[[models]]` entry as written in TOML.
///
/// Most fields are optional: `label`, `base_url`, and `tasks` fall back to
/// the catalog defaults for `catalog_id` when omitted, so a minimal entry is
/// just an `id` and a `catalog_id`. The credential may live here or in the
/// `LMHUB_API_KEY_<ID>` environment variable (config wins when both are set).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelEntryConfig {
    /// Stable identifier, unique within the `[[models]]` array.
    pub id: String,

    /// Catalog model identifier (also the model name sent on the wire).
    pub catalog_id: String,

    /// Display label. Defaults to the catalog label, then to `catalog_id`.
    #[serde(default)]
    pub label: Option<String>,

    /// API endpoint. Defaults to the catalog endpoint. Required for relay
    /// and custom models the catalog has no endpoint for.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Task affinities for auto-routing. Defaults to the catalog's.
    #[serde(default)]
    pub tasks: Option<Vec<TaskType>>,

    #[serde(default = "default_entry_enabled")]
    pub enabled: bool,

    /// Lower value wins among entries eligible for the same task.
    #[serde(default)]
    pub priority: i32,

    /// Inline API key. Prefer the `LMHUB_API_KEY_<ID>` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_entry_enabled() -> bool {
    true
}

impl ModelEntryConfig {
    /// Name of the environment variable consulted for this entry's key:
    /// `LMHUB_API_KEY_` plus the uppercased id with `-`, `.`, and `/`
    /// replaced by `_`.
    pub fn credential_env_var(&self) -> String {
        let suffix: String = self
            .id
            .chars()
            .map(|c| match c {
                '-' | '.' | '/' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        format!("LMHUB_API_KEY_{suffix}")
    }

    /// Effective endpoint after catalog fallback. Empty when neither the
    /// entry nor the catalog provides one.
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| {
                lmhub_registry::lookup(&self.catalog_id).map(|c| c.default_base_url.clone())
            })
            .unwrap_or_default()
    }

    /// Whether this entry points at a relay-only catalog model but has no
    /// endpoint configured yet. Such entries are tolerated (disabled in
    /// practice) rather than rejected.
    pub fn is_relay_pending(&self) -> bool {
        self.base_url.is_none()
            && lmhub_registry::lookup(&self.catalog_id).is_some_and(|c| c.is_relay)
    }

    /// Resolve this config entry into a runtime [`ModelEntry`], consulting
    /// the catalog for omitted fields and the environment for the credential.
    pub fn resolve(&self) -> ModelEntry {
        let catalog = lmhub_registry::lookup(&self.catalog_id);
        let label = self
            .label
            .clone()
            .or_else(|| catalog.map(|c| c.label.clone()))
            .unwrap_or_else(|| self.catalog_id.clone());
        let tasks = self
            .tasks
            .clone()
            .or_else(|| catalog.map(|c| c.default_tasks.clone()))
            .unwrap_or_default();
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(self.credential_env_var()).ok())
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        ModelEntry {
            id: self.id.clone(),
            catalog_id: self.catalog_id.clone(),
            label,
            base_url: self.effective_base_url(),
            tasks,
            enabled: self.enabled,
            priority: self.priority,
            api_key,
        }
    }
}

impl HubConfig {
    /// Resolve all configured entries into runtime model entries, preserving
    /// declaration order.
    pub fn resolve_entries(&self) -> Vec<ModelEntry> {
        self.models.iter().map(ModelEntryConfig::resolve).collect()
    }
}

/// Starter entries used when no `[[models]]` array is configured.
///
/// None carries an inline key, so nothing routes until the user supplies a
/// credential via `LMHUB_API_KEY_<ID>` or writes their own config. They make
/// `lmhub doctor` and `ai_list_providers` useful out of the box.
fn default_models() -> Vec<ModelEntryConfig> {
    ["deepseek-chat", "glm-4.7", "qwen-coder-plus", "kimi-k2-instruct"]
        .into_iter()
        .map(|catalog_id| ModelEntryConfig {
            id: format!("default-{}", catalog_id.replace('.', "-")),
            catalog_id: catalog_id.to_string(),
            label: None,
            base_url: None,
            tasks: None,
            enabled: true,
            priority: 0,
            api_key: None,
        })
        .collect()
}
