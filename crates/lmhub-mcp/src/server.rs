// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The MCP tool surface: `ai_ask`, `ai_list_providers`, `ai_codex_task`.
//!
//! Tool-level failures (no route, provider errors, Codex errors) are
//! reported as error tool results with a user-actionable message, never as
//! protocol errors. Every routing attempt is recorded to the transaction
//! sink; recording failures are logged and swallowed so telemetry can
//! never break a request.

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData, ServerHandler,
};
use serde::Deserialize;
use tracing::warn;

use lmhub_core::{
    ModelEntry, TransactionRecord, TransactionSink, TransactionStatus, Usage,
};
use lmhub_provider::ProviderClient;
use lmhub_router::resolve;

use crate::codex::CodexRunner;

/// Maximum characters of request/response text kept in a history record.
const PREVIEW_LIMIT: usize = 300;

/// Shared hub state behind the cloneable server handle.
pub struct HubState {
    /// Snapshot of resolved model entries. Swapped atomically on config
    /// reload; in-flight requests keep the snapshot they loaded.
    entries: ArcSwap<Vec<ModelEntry>>,
    client: ProviderClient,
    codex: CodexRunner,
    sink: Option<Arc<dyn TransactionSink>>,
}

/// MCP server handler for lmhub.
#[derive(Clone)]
pub struct HubServer {
    state: Arc<HubState>,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AskArgs {
    /// The question or task.
    pub message: String,
    /// Force a specific provider (e.g. "deepseek", "glm"). Omit for smart
    /// auto-routing.
    #[serde(default)]
    pub provider: Option<String>,
    /// Optional system-level instructions.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CodexTaskArgs {
    /// Task description for Codex.
    pub task: String,
    /// Working directory. Defaults to the hub's current directory.
    #[serde(default)]
    pub working_dir: Option<String>,
}

#[tool_router]
impl HubServer {
    pub fn new(
        entries: Vec<ModelEntry>,
        client: ProviderClient,
        codex: CodexRunner,
        sink: Option<Arc<dyn TransactionSink>>,
    ) -> Self {
        Self {
            state: Arc::new(HubState {
                entries: ArcSwap::from_pointee(entries),
                client,
                codex,
                sink,
            }),
            tool_router: Self::tool_router(),
        }
    }

    /// Replace the entry snapshot. In-flight requests are unaffected.
    pub fn update_entries(&self, entries: Vec<ModelEntry>) {
        self.state.entries.store(Arc::new(entries));
    }

    #[tool(
        description = "Ask a question to a specialized AI expert. lmhub auto-routes to the best model based on your configured models and task types. Specify a provider to force a specific one."
    )]
    async fn ai_ask(
        &self,
        Parameters(args): Parameters<AskArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let started = Instant::now();
        let timestamp = TransactionRecord::now_timestamp();
        let entries = self.state.entries.load();

        let route = match resolve(&args.message, &entries, args.provider.as_deref()) {
            Ok(route) => route,
            Err(err) => {
                let text = err.user_message();
                self.record("ai_ask", timestamp, started, None, None, &args.message, &text, Some(text.clone()))
                    .await;
                return Ok(CallToolResult::error(vec![Content::text(text)]));
            }
        };

        match self
            .state
            .client
            .call(&route, &args.message, args.system_prompt.as_deref())
            .await
        {
            Ok(outcome) => {
                self.record(
                    "ai_ask",
                    timestamp,
                    started,
                    Some(route.label),
                    Some(outcome.usage),
                    &args.message,
                    &outcome.text,
                    None,
                )
                .await;
                Ok(CallToolResult::success(vec![Content::text(outcome.text)]))
            }
            Err(err) => {
                let text = format!("Error calling {}: {}", route.label, err.user_message());
                self.record(
                    "ai_ask",
                    timestamp,
                    started,
                    Some(route.label),
                    None,
                    &args.message,
                    &text,
                    Some(text.clone()),
                )
                .await;
                Ok(CallToolResult::error(vec![Content::text(text)]))
            }
        }
    }

    #[tool(description = "List configured AI models and their assigned task types.")]
    async fn ai_list_providers(&self) -> Result<CallToolResult, ErrorData> {
        let entries = self.state.entries.load();
        let codex_status = match self.state.codex.version().await {
            Some(version) => format!("✅ Ready ({version}, uses ChatGPT login)"),
            None => "❌ Not installed (run: npm install -g @openai/codex)".to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(
            provider_summary(&entries, &codex_status),
        )]))
    }

    #[tool(
        description = "Run an autonomous coding task using Codex CLI. Codex reads/writes local files and executes terminal commands with no API key needed, using your ChatGPT account. Best for: file rewrites, code review, refactoring."
    )]
    async fn ai_codex_task(
        &self,
        Parameters(args): Parameters<CodexTaskArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let started = Instant::now();
        let timestamp = TransactionRecord::now_timestamp();

        match self
            .state
            .codex
            .run(&args.task, args.working_dir.as_deref())
            .await
        {
            Ok(text) => {
                self.record(
                    "ai_codex_task",
                    timestamp,
                    started,
                    Some("Codex CLI".to_string()),
                    None,
                    &args.task,
                    &text,
                    None,
                )
                .await;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(err) => {
                let text = format!("Codex error: {}", err.user_message());
                self.record(
                    "ai_codex_task",
                    timestamp,
                    started,
                    Some("Codex CLI".to_string()),
                    None,
                    &args.task,
                    &text,
                    Some(text.clone()),
                )
                .await;
                Ok(CallToolResult::error(vec![Content::text(text)]))
            }
        }
    }

    /// Record one transaction, swallowing sink failures.
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        tool_name: &str,
        timestamp: String,
        started: Instant,
        model: Option<String>,
        usage: Option<Usage>,
        request: &str,
        response: &str,
        error_message: Option<String>,
    ) {
        let Some(sink) = &self.state.sink else {
            return;
        };

        let status = if error_message.is_some() {
            TransactionStatus::Error
        } else {
            TransactionStatus::Success
        };
        let record = TransactionRecord {
            id: TransactionRecord::new_id(),
            timestamp,
            client_name: "stdio".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            method: "tools/call".to_string(),
            tool_name: Some(tool_name.to_string()),
            model,
            duration_ms: started.elapsed().as_millis() as i64,
            input_tokens: usage.map(|u| u.input_tokens),
            output_tokens: usage.map(|u| u.output_tokens),
            total_tokens: usage.map(|u| u.total()),
            request_preview: truncate_preview(request),
            response_preview: truncate_preview(response),
            status,
            error_message,
        };

        if let Err(err) = sink.record(&record).await {
            warn!(error = %err, tool = tool_name, "failed to record transaction");
        }
    }
}

#[tool_handler]
impl ServerHandler for HubServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "lmhub".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "lmhub routes ai_ask requests across your configured OpenAI-compatible \
                 models, lists them via ai_list_providers, and delegates autonomous \
                 coding tasks to Codex CLI via ai_codex_task."
                    .to_string(),
            ),
        }
    }
}

/// Cap preview text at [`PREVIEW_LIMIT`] characters.
fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LIMIT {
        text.to_string()
    } else {
        text.chars().take(PREVIEW_LIMIT).collect()
    }
}

/// Human-readable model listing for `ai_list_providers`.
fn provider_summary(entries: &[ModelEntry], codex_status: &str) -> String {
    let mut lines = Vec::new();
    let has_routable = entries.iter().any(|e| e.enabled && e.has_credential());

    if has_routable {
        lines.push("Configured models:".to_string());
        for e in entries.iter().filter(|e| e.enabled && e.has_credential()) {
            let tasks = e
                .tasks
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let tasks = if tasks.is_empty() {
                "none".to_string()
            } else {
                tasks
            };
            lines.push(format!("✅ {} ({}) - tasks: {tasks}", e.label, e.catalog_id));
        }
    } else {
        lines.push("No routable models configured.".to_string());
        for e in entries {
            let reason = if !e.enabled { "disabled" } else { "missing API key" };
            lines.push(format!("❌ {} ({}) - {reason}", e.label, e.catalog_id));
        }
        lines.push(String::new());
        lines.push(
            "Tip: add an api_key (or set LMHUB_API_KEY_<ID>) and enable the entry in lmhub.toml."
                .to_string(),
        );
    }

    lines.push(String::new());
    lines.push(format!("🤖 Codex CLI: {codex_status}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lmhub_core::{HubError, TaskType};
    use secrecy::SecretString;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct VecSink {
        records: Mutex<Vec<TransactionRecord>>,
    }

    impl VecSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                records: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TransactionSink for VecSink {
        async fn record(&self, record: &TransactionRecord) -> Result<(), HubError> {
            self.records.lock().await.push(record.clone());
            Ok(())
        }
    }

    fn entry(base_url: &str) -> ModelEntry {
        ModelEntry {
            id: "ds".to_string(),
            catalog_id: "deepseek-chat".to_string(),
            label: "DeepSeek-V3".to_string(),
            base_url: base_url.to_string(),
            tasks: vec![TaskType::CodeGen],
            enabled: true,
            priority: 0,
            api_key: Some(SecretString::from("sk-test")),
        }
    }

    fn server_with(entries: Vec<ModelEntry>, sink: Arc<VecSink>) -> HubServer {
        let client = ProviderClient::new(0.7, Duration::from_secs(5)).unwrap();
        let codex = CodexRunner::new("lmhub-no-such-binary", Duration::from_secs(5));
        HubServer::new(entries, client, codex, Some(sink))
    }

    fn text_of(result: &CallToolResult) -> String {
        result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .expect("text content")
    }

    #[test]
    fn truncate_preview_caps_characters() {
        assert_eq!(truncate_preview("short"), "short");
        let long = "龙".repeat(500);
        let truncated = truncate_preview(&long);
        assert_eq!(truncated.chars().count(), PREVIEW_LIMIT);
    }

    #[test]
    fn provider_summary_lists_routable_entries() {
        let mut keyless = entry("https://api.example.com/v1");
        keyless.id = "glm".to_string();
        keyless.label = "GLM".to_string();
        keyless.api_key = None;

        let summary = provider_summary(
            &[entry("https://api.example.com/v1"), keyless],
            "✅ Ready",
        );
        assert!(summary.contains("✅ DeepSeek-V3 (deepseek-chat) - tasks: code_gen"));
        // Keyless entries are hidden from the routable listing.
        assert!(!summary.contains("GLM"));
        assert!(summary.contains("Codex CLI: ✅ Ready"));
    }

    #[test]
    fn provider_summary_explains_why_nothing_routes() {
        let mut disabled = entry("https://api.example.com/v1");
        disabled.enabled = false;
        let mut keyless = entry("https://api.example.com/v1");
        keyless.id = "glm".to_string();
        keyless.label = "GLM".to_string();
        keyless.api_key = None;

        let summary = provider_summary(&[disabled, keyless], "❌ Not installed");
        assert!(summary.contains("No routable models configured."));
        assert!(summary.contains("❌ DeepSeek-V3 (deepseek-chat) - disabled"));
        assert!(summary.contains("❌ GLM (deepseek-chat) - missing API key"));
        assert!(summary.contains("LMHUB_API_KEY_<ID>"));
    }

    #[tokio::test]
    async fn ai_ask_success_records_transaction() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "the answer"}}],
                "usage": {"prompt_tokens": 7, "completion_tokens": 3}
            })))
            .mount(&mock)
            .await;

        let sink = VecSink::new();
        let server = server_with(vec![entry(&mock.uri())], sink.clone());
        let result = server
            .ai_ask(Parameters(AskArgs {
                message: "write code for a parser".to_string(),
                provider: None,
                system_prompt: None,
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "the answer");

        let records = sink.records.lock().await;
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.tool_name.as_deref(), Some("ai_ask"));
        assert_eq!(r.model.as_deref(), Some("DeepSeek-V3"));
        assert_eq!(r.status, TransactionStatus::Success);
        assert_eq!(r.input_tokens, Some(7));
        assert_eq!(r.total_tokens, Some(10));
        assert_eq!(r.request_preview, "write code for a parser");
    }

    #[tokio::test]
    async fn ai_ask_without_routable_entries_is_tool_error() {
        let sink = VecSink::new();
        let server = server_with(Vec::new(), sink.clone());
        let result = server
            .ai_ask(Parameters(AskArgs {
                message: "hello".to_string(),
                provider: Some("glm".to_string()),
                system_prompt: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.contains("\"glm\""));
        assert!(text.contains("lmhub.toml"));

        let records = sink.records.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, TransactionStatus::Error);
        assert!(records[0].model.is_none());
    }

    #[tokio::test]
    async fn ai_ask_provider_failure_names_the_model() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "invalid api key"}
            })))
            .mount(&mock)
            .await;

        let sink = VecSink::new();
        let server = server_with(vec![entry(&mock.uri())], sink.clone());
        let result = server
            .ai_ask(Parameters(AskArgs {
                message: "hello".to_string(),
                provider: None,
                system_prompt: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.contains("Error calling DeepSeek-V3"));
        assert!(text.contains("401"));
        assert!(text.contains("invalid api key"));

        let records = sink.records.lock().await;
        assert_eq!(records[0].status, TransactionStatus::Error);
        assert_eq!(records[0].model.as_deref(), Some("DeepSeek-V3"));
    }

    #[tokio::test]
    async fn ai_codex_task_missing_binary_is_tool_error() {
        let sink = VecSink::new();
        let server = server_with(Vec::new(), sink.clone());
        let result = server
            .ai_codex_task(Parameters(CodexTaskArgs {
                task: "refactor everything".to_string(),
                working_dir: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.starts_with("Codex error:"));
        assert!(text.contains("npm install -g @openai/codex"));

        let records = sink.records.lock().await;
        assert_eq!(records[0].tool_name.as_deref(), Some("ai_codex_task"));
        assert_eq!(records[0].status, TransactionStatus::Error);
    }

    #[tokio::test]
    async fn ai_list_providers_reports_codex_missing() {
        let server = server_with(vec![entry("https://api.example.com/v1")], VecSink::new());
        let result = server.ai_list_providers().await.unwrap();
        assert_ne!(result.is_error, Some(true));
        let text = text_of(&result);
        assert!(text.contains("DeepSeek-V3"));
        assert!(text.contains("❌ Not installed"));
    }

    #[tokio::test]
    async fn update_entries_swaps_the_snapshot() {
        let sink = VecSink::new();
        let server = server_with(Vec::new(), sink.clone());

        let result = server
            .ai_ask(Parameters(AskArgs {
                message: "hi".to_string(),
                provider: None,
                system_prompt: None,
            }))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));

        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "now routable"}}]
            })))
            .mount(&mock)
            .await;

        server.update_entries(vec![entry(&mock.uri())]);
        let result = server
            .ai_ask(Parameters(AskArgs {
                message: "hi".to_string(),
                provider: None,
                system_prompt: None,
            }))
            .await
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), "now routable");
    }
}
