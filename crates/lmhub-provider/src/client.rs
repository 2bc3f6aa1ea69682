// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completion endpoints.
//!
//! One [`ProviderClient`] serves every configured vendor: the endpoint,
//! model identifier, and bearer credential all come from the resolved
//! [`RouteResult`], so a call is stateless with respect to which provider
//! it hits.

use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::debug;

use lmhub_core::{HubError, RouteResult, Usage};

use crate::types::{ApiErrorBody, ChatMessage, ChatRequest, ChatResponse};

/// Maximum number of characters of an error body carried into an error.
const ERROR_BODY_LIMIT: usize = 300;

/// Placeholder returned when a 2xx response carries no message content.
const NO_RESPONSE_PLACEHOLDER: &str = "No response";

/// Result of one successful chat completion call.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    /// Assistant message text, or a placeholder when the vendor sent none.
    pub text: String,
    /// Token usage, zeroed when the vendor omitted it.
    pub usage: Usage,
}

/// HTTP client for outbound provider calls.
///
/// Holds the shared connection pool plus the request parameters that are
/// global across providers (temperature, timeout). Credentials are per-call
/// and never stored here.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    temperature: f64,
    timeout: Duration,
}

impl ProviderClient {
    /// Creates a new provider client.
    pub fn new(temperature: f64, timeout: Duration) -> Result<Self, HubError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HubError::ProviderTransport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            temperature,
            timeout,
        })
    }

    /// Performs one chat completion call against the routed provider.
    ///
    /// Exactly one outbound request per invocation; there is no retry.
    pub async fn call(
        &self,
        route: &RouteResult,
        message: &str,
        system_prompt: Option<&str>,
    ) -> Result<ChatOutcome, HubError> {
        let url = build_endpoint(&route.base_url);

        let mut messages = Vec::with_capacity(2);
        // An empty system prompt is treated as absent, not sent on the wire.
        if let Some(prompt) = system_prompt.filter(|p| !p.is_empty()) {
            messages.push(ChatMessage::system(prompt));
        }
        messages.push(ChatMessage::user(message));

        let request = ChatRequest {
            model: route.model_id.clone(),
            messages,
            temperature: self.temperature,
        };

        debug!(label = %route.label, model = %route.model_id, url = %url, "calling provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(route.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HubError::ProviderTimeout {
                        duration: self.timeout,
                    }
                } else {
                    HubError::ProviderTransport {
                        message: format!("request to {} failed: {e}", route.label),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HubError::ProviderHttp {
                label: route.label.clone(),
                status: status.as_u16(),
                body: error_body_preview(&body),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| HubError::ProviderTransport {
                    message: format!("invalid response body from {}: {e}", route.label),
                    source: Some(Box::new(e)),
                })?;

        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string());

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens.unwrap_or(0),
                output_tokens: u.completion_tokens.unwrap_or(0),
            })
            .unwrap_or_default();

        Ok(ChatOutcome { text, usage })
    }
}

/// Join a base URL and the chat completions path, idempotently: a base that
/// already ends in `/chat/completions` is used as-is.
pub fn build_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

/// Extract the vendor's error message when the body is the usual JSON
/// envelope, otherwise keep the raw body; either way cap the length so a
/// misbehaving vendor cannot flood logs and history records.
fn error_body_preview(body: &str) -> String {
    let text = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.to_string(),
    };
    if text.chars().count() <= ERROR_BODY_LIMIT {
        text
    } else {
        text.chars().take(ERROR_BODY_LIMIT).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn route_to(server: &MockServer) -> RouteResult {
        RouteResult {
            label: "DeepSeek-V3".into(),
            api_key: SecretString::from("sk-test-key"),
            base_url: server.uri(),
            model_id: "deepseek-chat".into(),
        }
    }

    #[test]
    fn endpoint_append_is_idempotent() {
        assert_eq!(
            build_endpoint("https://api.deepseek.com/v1"),
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(
            build_endpoint("https://api.deepseek.com/v1/chat/completions"),
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(
            build_endpoint("https://relay.example.com/v1/"),
            "https://relay.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn error_preview_extracts_envelope_message() {
        let preview = error_body_preview(r#"{"error":{"message":"invalid api key"}}"#);
        assert_eq!(preview, "invalid api key");

        let preview = error_body_preview("<html>bad gateway</html>");
        assert_eq!(preview, "<html>bad gateway</html>");

        let long = "x".repeat(1000);
        assert_eq!(error_body_preview(&long).len(), ERROR_BODY_LIMIT);
    }

    #[tokio::test]
    async fn successful_call_returns_text_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "temperature": 0.7,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "fn main() {}"}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let outcome = client
            .call(&route_to(&server), "write main", None)
            .await
            .unwrap();
        assert_eq!(outcome.text, "fn main() {}");
        assert_eq!(outcome.usage.input_tokens, 10);
        assert_eq!(outcome.usage.output_tokens, 5);
    }

    #[tokio::test]
    async fn system_prompt_is_prepended() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [
                    {"role": "system", "content": "be terse"},
                    {"role": "user", "content": "hello"},
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let outcome = client
            .call(&route_to(&server), "hello", Some("be terse"))
            .await
            .unwrap();
        assert_eq!(outcome.text, "hi");
    }

    #[tokio::test]
    async fn empty_system_prompt_is_not_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let outcome = client
            .call(&route_to(&server), "hello", Some(""))
            .await
            .unwrap();
        assert_eq!(outcome.text, "hi");
    }

    #[tokio::test]
    async fn empty_content_yields_placeholder_with_zero_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": ""}}]
            })))
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let outcome = client.call(&route_to(&server), "hi", None).await.unwrap();
        assert_eq!(outcome.text, NO_RESPONSE_PLACEHOLDER);
        assert_eq!(outcome.usage, Usage::default());
    }

    #[tokio::test]
    async fn http_401_surfaces_vendor_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided"}
            })))
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let err = client
            .call(&route_to(&server), "hi", None)
            .await
            .unwrap_err();
        match err {
            HubError::ProviderHttp {
                label,
                status,
                body,
            } => {
                assert_eq!(label, "DeepSeek-V3");
                assert_eq!(status, 401);
                assert_eq!(body, "Incorrect API key provided");
            }
            other => panic!("expected ProviderHttp, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_millis(100)).unwrap();
        let err = client
            .call(&route_to(&server), "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::ProviderTimeout { .. }));
    }

    #[tokio::test]
    async fn malformed_success_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let err = client
            .call(&route_to(&server), "hi", None)
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::ProviderTransport { .. }));
    }
}
