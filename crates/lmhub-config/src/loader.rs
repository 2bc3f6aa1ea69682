// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lmhub.toml` > `~/.config/lmhub/lmhub.toml` > `/etc/lmhub/lmhub.toml`
//! with environment variable overrides via `LMHUB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::HubConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lmhub/lmhub.toml` (system-wide)
/// 3. `~/.config/lmhub/lmhub.toml` (user XDG config)
/// 4. `./lmhub.toml` (local directory)
/// 5. `LMHUB_*` environment variables
pub fn load_config() -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::file("/etc/lmhub/lmhub.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lmhub/lmhub.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lmhub.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config file specification.
pub fn load_config_from_str(toml_content: &str) -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<HubConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(HubConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `LMHUB_HISTORY_DATABASE_PATH`
/// must map to `history.database_path`, not `history.database.path`.
///
/// `LMHUB_API_KEY_*` variables are per-entry credentials read at entry
/// resolution time, not config keys; they are filtered out here so they do
/// not trip `deny_unknown_fields`.
fn env_provider() -> Env {
    Env::prefixed("LMHUB_")
        .filter(|key| !key.as_str().starts_with("api_key_"))
        .map(|key| {
            // `key` is the lowercased env var name with prefix stripped.
            // Example: LMHUB_CODEX_TIMEOUT_SECS -> "codex_timeout_secs"
            let key_str = key.as_str();
            let mapped = key_str
                .replacen("hub_", "hub.", 1)
                .replacen("provider_", "provider.", 1)
                .replacen("history_", "history.", 1)
                .replacen("codex_", "codex.", 1);
            mapped.into()
        })
}
