// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the lmhub workspace.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse intent categories a request can be classified into.
///
/// This is a closed set: variants are never created or destroyed at runtime,
/// and the on-disk spelling (snake_case) is shared by the catalog data file,
/// the TOML configuration, and the classifier trigger table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    CodeGen,
    CodeReview,
    Architecture,
    Documentation,
    Translation,
    UiDesign,
    Vision,
    LongContext,
    MathReasoning,
    ToolCalling,
    Creative,
    Agentic,
}

impl TaskType {
    /// The safe default used when classification finds no trigger match.
    pub const DEFAULT: TaskType = TaskType::CodeGen;
}

/// A configured, user-owned binding of a catalog model to operational
/// settings, with its credential already resolved.
///
/// The `api_key` is a [`SecretString`]: it never appears in `Debug` output
/// or logs, and is only exposed at the point the bearer header is built.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    /// Opaque stable identifier, unique within the configuration set.
    pub id: String,
    /// Reference into the model catalog (e.g. "deepseek-chat"). May name a
    /// model the static catalog does not know (custom/relay models).
    pub catalog_id: String,
    /// Human-readable display name, independent of catalog data.
    pub label: String,
    /// HTTPS endpoint, vendor-direct or relay.
    pub base_url: String,
    /// Task types this entry is eligible to serve under auto-routing.
    /// May be empty: the entry then only serves forced-provider requests.
    pub tasks: Vec<TaskType>,
    /// Disabled entries are excluded from all selection.
    pub enabled: bool,
    /// Lower value is preferred among entries tied on task eligibility.
    pub priority: i32,
    /// Resolved credential, if any. Entries without one are never routable.
    pub api_key: Option<SecretString>,
}

impl ModelEntry {
    /// Whether this entry holds a non-empty credential.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }
}

/// The ephemeral product of route resolution: everything the provider
/// client needs to perform one outbound call. Never persisted.
#[derive(Clone)]
pub struct RouteResult {
    /// Display label of the chosen entry, used in error messages and records.
    pub label: String,
    /// Credential for the bearer header.
    pub api_key: SecretString,
    /// Base URL with any trailing slash removed.
    pub base_url: String,
    /// Model identifier sent on the wire.
    pub model_id: String,
}

impl std::fmt::Debug for RouteResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteResult")
            .field("label", &self.label)
            .field("base_url", &self.base_url)
            .field("model_id", &self.model_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Token usage reported by a provider, defaulting to zero when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Terminal status of a recorded transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Error,
}

/// One immutable audit entry per completed routing attempt.
///
/// Created exactly once per resolved attempt (success or failure), never
/// mutated afterwards, and deleted only by age-based retention cleanup or
/// an explicit clear-all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique record identifier (UUID v4).
    pub id: String,
    /// ISO 8601 timestamp of when the attempt started.
    pub timestamp: String,
    /// Descriptor of the calling client (transport shell).
    pub client_name: String,
    /// Version of the calling client.
    pub client_version: String,
    /// RPC method that triggered the attempt.
    pub method: String,
    /// Tool name, when the method was a tool call.
    pub tool_name: Option<String>,
    /// Display label of the resolved model, when resolution succeeded.
    pub model: Option<String>,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: i64,
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
    /// Truncated copy of the request text.
    pub request_preview: String,
    /// Truncated copy of the response text or error message.
    pub response_preview: String,
    pub status: TransactionStatus,
    pub error_message: Option<String>,
}

impl TransactionRecord {
    /// Generate a fresh record identifier.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Current time formatted the way records store it.
    pub fn now_timestamp() -> String {
        chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }
}
