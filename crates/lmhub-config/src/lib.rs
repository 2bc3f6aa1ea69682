// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the lmhub routing hub.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and Elm-style diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use lmhub_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("History database: {}", config.history.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError, TomlSources};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{CodexConfig, HistoryConfig, HubConfig, ModelEntryConfig, ProviderConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
///
/// Returns either a valid `HubConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<HubConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            // Read TOML source files for error source span information
            let toml_sources = collect_toml_sources();
            Err(diagnostic::explain_figment_error(err, &toml_sources))
        }
    }
}

/// Load configuration from an explicit file path (plus env overrides) and
/// validate it. Backs the CLI's `--config` flag; the XDG hierarchy is
/// skipped entirely.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<HubConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let mut sources = TomlSources::new();
            if let Ok(content) = std::fs::read_to_string(path) {
                sources.push(path.display().to_string(), content);
            }
            Err(diagnostic::explain_figment_error(err, &sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<HubConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let mut sources = TomlSources::new();
            sources.push("<inline>", toml_content);
            Err(diagnostic::explain_figment_error(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> TomlSources {
    let mut sources = TomlSources::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("lmhub.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("lmhub.toml").display().to_string())
            .unwrap_or_else(|_| "lmhub.toml".to_string());
        sources.push(path, content);
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("lmhub/lmhub.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push(path.display().to_string(), content);
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/lmhub/lmhub.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push(system_path.display().to_string(), content);
    }

    sources
}
