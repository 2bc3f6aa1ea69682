// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static model catalog for lmhub.
//!
//! The catalog is a read-only mapping from catalog model identifiers (e.g.
//! "deepseek-chat") to vendor metadata: display label, provider group,
//! default endpoint, default task affinities, and whether the model is only
//! reachable through a relay. It ships as an embedded JSON data file parsed
//! once on first access; updating the catalog is a data change, not a code
//! change.
//!
//! An unknown identifier is not an error: callers treat such entries as
//! fully custom models and rely on the user-supplied endpoint instead.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use lmhub_core::TaskType;

/// Embedded catalog data, compiled into the binary.
const CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Vendor metadata for one catalog model.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Display label shown in summaries and pickers.
    pub label: String,
    /// Vendor grouping (e.g. "DeepSeek", "OpenAI").
    pub provider_group: String,
    /// Default API endpoint. Empty for relay-only models.
    pub default_base_url: String,
    /// Task types this model is suggested for by default.
    pub default_tasks: Vec<TaskType>,
    /// Short human-readable note.
    pub note: String,
    /// Whether the vendor API requires a key.
    pub requires_api_key: bool,
    /// Whether the model has no direct API and needs a relay endpoint.
    #[serde(default)]
    pub is_relay: bool,
}

fn catalog() -> &'static HashMap<String, CatalogEntry> {
    static CATALOG: OnceLock<HashMap<String, CatalogEntry>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        // The data file is embedded at compile time; a parse failure is a
        // build defect caught by the tests below, not a runtime condition.
        serde_json::from_str(CATALOG_JSON).expect("embedded catalog.json must parse")
    })
}

/// Look up a catalog model by identifier.
///
/// Returns `None` for unknown identifiers; callers must treat that as
/// non-fatal and fall back to the entry's own configuration.
pub fn lookup(catalog_id: &str) -> Option<&'static CatalogEntry> {
    catalog().get(catalog_id)
}

/// All catalog models, in no particular order.
pub fn all() -> impl Iterator<Item = (&'static str, &'static CatalogEntry)> {
    catalog().iter().map(|(id, entry)| (id.as_str(), entry))
}

/// Catalog models belonging to one provider group.
pub fn models_in_group(group: &str) -> Vec<(&'static str, &'static CatalogEntry)> {
    let mut models: Vec<_> = all()
        .filter(|(_, entry)| entry.provider_group == group)
        .collect();
    models.sort_by_key(|(id, _)| *id);
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_catalog_parses() {
        assert!(!catalog().is_empty());
    }

    #[test]
    fn lookup_known_model() {
        let entry = lookup("deepseek-chat").unwrap();
        assert_eq!(entry.provider_group, "DeepSeek");
        assert_eq!(entry.default_base_url, "https://api.deepseek.com/v1");
        assert!(entry.default_tasks.contains(&TaskType::CodeGen));
        assert!(!entry.is_relay);
    }

    #[test]
    fn lookup_unknown_model_is_none() {
        assert!(lookup("definitely-not-a-model").is_none());
    }

    #[test]
    fn relay_models_may_have_empty_base_url() {
        let entry = lookup("meta-llama/llama-3.3-70b-instruct").unwrap();
        assert!(entry.is_relay);
        assert!(entry.default_base_url.is_empty());
    }

    #[test]
    fn non_relay_models_have_https_endpoints() {
        for (id, entry) in all() {
            if !entry.is_relay {
                assert!(
                    entry.default_base_url.starts_with("https://"),
                    "{id} has non-HTTPS default_base_url"
                );
                assert!(
                    !entry.default_base_url.ends_with('/'),
                    "{id} has trailing slash in default_base_url"
                );
            }
        }
    }

    #[test]
    fn models_in_group_filters_and_sorts() {
        let deepseek = models_in_group("DeepSeek");
        assert_eq!(deepseek.len(), 2);
        assert_eq!(deepseek[0].0, "deepseek-chat");
        assert!(models_in_group("NoSuchVendor").is_empty());
    }

    #[test]
    fn anthropic_group_carries_both_generations() {
        let anthropic = models_in_group("Anthropic");
        let ids: Vec<&str> = anthropic.iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            [
                "claude-opus-4-5",
                "claude-opus-4-6",
                "claude-sonnet-4-5",
                "claude-sonnet-4-6",
            ]
        );
    }

    #[test]
    fn specialty_models_are_listed() {
        let image = lookup("gemini-3-image").unwrap();
        assert!(image.default_tasks.contains(&TaskType::Vision));

        let highspeed = lookup("MiniMax-M2.5-highspeed").unwrap();
        assert_eq!(highspeed.provider_group, "MiniMax");
    }
}
