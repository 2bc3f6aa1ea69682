// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route resolution: pick one model entry for a request.
//!
//! Resolution is a pure function over the entry snapshot. Priority order:
//! 1. Eligibility filter (enabled + credentialed)
//! 2. Forced-provider hint (advisory substring match)
//! 3. Task classification + priority sort
//! 4. First-eligible fallback
//!
//! Step 4 guarantees that whenever at least one eligible entry exists,
//! resolution succeeds.

use tracing::debug;

use lmhub_core::{HubError, ModelEntry, RouteResult};

use crate::classifier::classify;

/// Resolve a request message against an entry snapshot.
///
/// `forced_provider` is an advisory hint: it is matched case-insensitively
/// as a substring of each eligible entry's `catalog_id` and `label`, in
/// snapshot order. A hint that matches nothing falls through to automatic
/// routing rather than failing.
///
/// Fails only with [`HubError::NoRoute`], and only when no entry is both
/// enabled and credentialed.
pub fn resolve(
    message: &str,
    entries: &[ModelEntry],
    forced_provider: Option<&str>,
) -> Result<RouteResult, HubError> {
    let eligible: Vec<&ModelEntry> = entries
        .iter()
        .filter(|e| e.enabled && e.has_credential())
        .collect();

    if eligible.is_empty() {
        return Err(HubError::NoRoute {
            hint: forced_provider.map(str::to_string),
        });
    }

    let mut chosen: Option<&ModelEntry> = None;

    if let Some(hint) = forced_provider {
        let hint = hint.to_lowercase();
        chosen = eligible
            .iter()
            .copied()
            .find(|e| {
                e.catalog_id.to_lowercase().contains(&hint)
                    || e.label.to_lowercase().contains(&hint)
            });
    }

    if chosen.is_none() {
        let classification = classify(message);
        // Stable sort: declaration order breaks priority ties.
        let mut matching: Vec<&ModelEntry> = eligible
            .iter()
            .copied()
            .filter(|e| e.tasks.contains(&classification.task))
            .collect();
        matching.sort_by_key(|e| e.priority);

        chosen = matching.first().copied().or_else(|| eligible.first().copied());

        debug!(
            task = %classification.task,
            trigger = classification.trigger.unwrap_or("<default>"),
            entry = chosen.map(|e| e.id.as_str()).unwrap_or("<none>"),
            "classified request"
        );
    }

    // The eligibility filter guarantees both the entry and its credential.
    let entry = chosen.ok_or_else(|| HubError::Internal("empty eligible set after filter".into()))?;
    let api_key = entry
        .api_key
        .clone()
        .ok_or_else(|| HubError::Internal(format!("entry `{}` lost its credential", entry.id)))?;

    Ok(RouteResult {
        label: entry.label.clone(),
        api_key,
        base_url: entry.base_url.trim_end_matches('/').to_string(),
        model_id: entry.catalog_id.clone(),
    })
}
