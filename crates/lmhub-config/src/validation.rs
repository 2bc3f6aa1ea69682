// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as HTTPS endpoints, unique entry identifiers, and
//! sensible numeric ranges.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::HubConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !(0.0..=2.0).contains(&config.provider.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "provider.temperature must be between 0.0 and 2.0, got {}",
                config.provider.temperature
            ),
        });
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.history.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "history.database_path must not be empty".to_string(),
        });
    }

    if config.history.retention_days == 0 {
        errors.push(ConfigError::Validation {
            message: "history.retention_days must be at least 1".to_string(),
        });
    }

    if config.codex.binary.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "codex.binary must not be empty".to_string(),
        });
    }

    if config.codex.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "codex.timeout_secs must be at least 1".to_string(),
        });
    }

    // Entry ids must be non-empty and unique across the [[models]] array.
    let mut seen_ids = HashSet::new();
    for (i, entry) in config.models.iter().enumerate() {
        if entry.id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("models[{i}].id must not be empty"),
            });
        } else if !seen_ids.insert(&entry.id) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate model id `{}` in [[models]] array", entry.id),
            });
        }

        if entry.catalog_id.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("models[{i}].catalog_id must not be empty"),
            });
        }

        // Enabled entries need a routable HTTPS endpoint after catalog
        // fallback. Relay models with no endpoint yet are tolerated; they
        // simply never route.
        if entry.enabled && !entry.is_relay_pending() {
            let url = entry.effective_base_url();
            if !url.starts_with("https://") {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "models[{i}] (`{}`): base_url must be an https:// URL, got `{url}`",
                        entry.id
                    ),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
