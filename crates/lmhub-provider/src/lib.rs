// SPDX-FileCopyrightText: 2026 Lmhub Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound provider client for lmhub.
//!
//! Speaks the OpenAI-compatible `/chat/completions` dialect that every
//! supported vendor (DeepSeek, GLM, Qwen, Moonshot, OpenAI, Anthropic
//! gateways, Gemini's OpenAI surface, Mistral, relays) accepts.

pub mod client;
pub mod types;

pub use client::{build_endpoint, ChatOutcome, ProviderClient};
pub use types::{ChatMessage, ChatRequest, ChatResponse};
