// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the lmhub routing hub.

use thiserror::Error;

/// The primary error type used across all lmhub crates.
#[derive(Debug, Error)]
pub enum HubError {
    /// Configuration errors (invalid TOML, missing required fields, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// No enabled model entry with a resolvable API key exists.
    ///
    /// This is a user-actionable configuration state, not a transient fault:
    /// the fix is to add or enable a model with a credential.
    #[error("no enabled model with an API key is configured")]
    NoRoute {
        /// The forced-provider hint that was in effect, if any.
        hint: Option<String>,
    },

    /// Provider returned a non-2xx HTTP status.
    #[error("{label} API {status}: {body}")]
    ProviderHttp {
        /// Display label of the model entry that was called.
        label: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Transport-level failure reaching the provider (DNS, TLS, reset).
    #[error("provider request failed: {message}")]
    ProviderTransport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The outbound provider call exceeded its deadline.
    #[error("provider request timed out after {duration:?}")]
    ProviderTimeout { duration: std::time::Duration },

    /// External CLI tool failure (missing binary, non-zero exit, timeout).
    #[error("{message}")]
    ExternalTool {
        message: String,
        /// Remediation hint shown to the user (e.g. install instructions).
        remediation: Option<String>,
    },

    /// History storage errors (connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HubError {
    /// Full user-facing message, including the remediation hint when present.
    pub fn user_message(&self) -> String {
        match self {
            HubError::NoRoute { hint: Some(h) } => format!(
                "No configured model found for provider \"{h}\". \
                 Add or enable a model with an API key in lmhub.toml."
            ),
            HubError::NoRoute { hint: None } => "No configured model found. \
                 Add or enable a model with an API key in lmhub.toml."
                .to_string(),
            HubError::ExternalTool {
                message,
                remediation: Some(r),
            } => format!("{message}. {r}"),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_http_display_carries_status_and_body() {
        let err = HubError::ProviderHttp {
            label: "DeepSeek-V3".into(),
            status: 401,
            body: r#"{"error":{"message":"invalid api key"}}"#.into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid api key"));
        assert!(msg.contains("DeepSeek-V3"));
    }

    #[test]
    fn no_route_user_message_mentions_hint() {
        let err = HubError::NoRoute {
            hint: Some("glm".into()),
        };
        assert!(err.user_message().contains("\"glm\""));

        let err = HubError::NoRoute { hint: None };
        assert!(err.user_message().contains("lmhub.toml"));
    }

    #[test]
    fn external_tool_user_message_appends_remediation() {
        let err = HubError::ExternalTool {
            message: "Codex CLI not found".into(),
            remediation: Some("Install: npm install -g @openai/codex".into()),
        };
        let msg = err.user_message();
        assert!(msg.contains("not found"));
        assert!(msg.contains("npm install"));
    }

    #[test]
    fn timeout_is_distinct_from_transport() {
        let timeout = HubError::ProviderTimeout {
            duration: std::time::Duration::from_secs(60),
        };
        let transport = HubError::ProviderTransport {
            message: "connection refused".into(),
            source: None,
        };
        assert!(timeout.to_string().contains("timed out"));
        assert!(!transport.to_string().contains("timed out"));
    }
}
