// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MCP tool surface for the lmhub routing hub.
//!
//! Exposes three tools over the Model Context Protocol: `ai_ask` (routed
//! chat completion), `ai_list_providers` (configured model listing), and
//! `ai_codex_task` (Codex CLI delegation). The transport itself (stdio)
//! is wired up by the binary crate.

pub mod codex;
pub mod server;

pub use codex::CodexRunner;
pub use server::HubServer;
