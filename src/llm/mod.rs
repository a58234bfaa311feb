// ABOUTME: Chat-completion abstraction layer: message model, tool-call types, provider trait
// ABOUTME: Defines the contract the completion relay uses for tool detection and streaming
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Chat Completion Provider Interface
//!
//! This module defines the message model shared between the HTTP front door, the
//! prompt assembler, and the completion relay, plus the [`LlmProvider`] trait the
//! relay drives.
//!
//! ## Key Concepts
//!
//! - **`ChatMessage`**: one entry of the ordered conversation (`system`, `user`,
//!   `assistant`, or `tool`). Fields the caller sends that this service does not
//!   interpret are preserved and forwarded untouched.
//! - **`ToolCall`**: a function call requested by the model. Arguments stay a JSON
//!   encoded string, exactly as the completion API produced them.
//! - **`StreamChunk`**: one streamed completion payload, kept as raw JSON text so it
//!   can be relayed byte-for-byte.
//!
//! ## Example
//!
//! ```rust,no_run
//! use blackbeard_extension::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider, token: &str) {
//!     let request = ChatRequest::new(vec![
//!         ChatMessage::system("Answer like a pirate."),
//!         ChatMessage::user("What's the weather in Tokyo?"),
//!     ])
//!     .with_streaming();
//!     let stream = provider.complete_stream(token, &request).await;
//! }
//! ```

mod copilot;
pub mod prompts;
pub mod sse_parser;

pub use copilot::{CopilotProvider, CopilotProviderConfig};
pub use prompts::{assemble_messages, persona_system_prompt};

use std::pin::Pin;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio_stream::Stream;

use crate::errors::AppError;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
    /// Result of a tool call
    Tool,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Text content; `null` for assistant messages that only carry tool calls
    #[serde(default)]
    pub content: Option<String>,
    /// Tool calls requested by the assistant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call a `tool` message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Caller-supplied fields this service passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Create a new text message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
            extra: Map::new(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Assistant message that carries a tool call
    #[must_use]
    pub fn assistant_tool_call(content: Option<String>, call: ToolCall) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
            tool_calls: Some(vec![call]),
            tool_call_id: None,
            extra: Map::new(),
        }
    }

    /// Tool result message answering `tool_call_id`
    #[must_use]
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            extra: Map::new(),
        }
    }

    /// Content length in characters, zero when absent
    #[must_use]
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map_or(0, |c| c.chars().count())
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// Function name and JSON-encoded arguments of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as a JSON-encoded string
    pub arguments: String,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID, echoed back in the tool result message
    pub id: String,
    /// Always `function` for the completion API
    #[serde(rename = "type", default = "default_tool_call_type")]
    pub call_type: String,
    /// Function details
    pub function: FunctionCall,
}

fn default_tool_call_type() -> String {
    "function".to_owned()
}

/// Function declaration advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameters schema (JSON Schema format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier; the provider default when `None`
    pub model: Option<String>,
    /// Whether to stream the response
    pub stream: bool,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            stream: false,
        }
    }

    /// Enable streaming
    #[must_use]
    pub const fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }
}

/// Response from a non-streaming completion that may contain tool calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseWithTools {
    /// Generated message content (usually `None` when tool calls are present)
    pub content: Option<String>,
    /// Tool calls requested by the model, in the order the model listed them
    pub tool_calls: Vec<ToolCall>,
    /// Model used for generation
    pub model: String,
    /// Finish reason (stop, `tool_calls`, length, ...)
    pub finish_reason: Option<String>,
}

impl ChatResponseWithTools {
    /// Check if this response contains tool calls
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// One streamed completion payload, kept as the raw JSON text the API sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    raw: String,
}

impl StreamChunk {
    /// Wrap a `data:` payload after checking it is well-formed JSON
    ///
    /// The payload is re-sent as a single `data:` field, so it may not contain a
    /// line break even where JSON would allow one as whitespace.
    ///
    /// # Errors
    ///
    /// Returns the JSON syntax error if the payload is not valid JSON, or a
    /// custom error if it contains `\r` or `\n`.
    pub fn from_data(raw: impl Into<String>) -> Result<Self, serde_json::Error> {
        let raw = raw.into();
        if raw.contains(['\r', '\n']) {
            return Err(serde::de::Error::custom("line break inside a data payload"));
        }
        serde_json::from_str::<serde::de::IgnoredAny>(&raw)?;
        Ok(Self { raw })
    }

    /// The payload exactly as received
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parse the payload into a JSON value
    ///
    /// # Errors
    ///
    /// Never fails for chunks built with [`StreamChunk::from_data`].
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.raw)
    }
}

/// Stream type for chat completion responses
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AppError>> + Send>>;

// ============================================================================
// Provider Trait
// ============================================================================

/// Chat-completion provider used by the relay
///
/// The caller's token is passed on every call: the completion API authenticates
/// each end user individually, so a provider holds no credentials of its own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider identifier used in logs and error messages
    fn name(&self) -> &'static str;

    /// Model used when the request does not name one
    fn default_model(&self) -> &str;

    /// Non-streaming completion declaring `tools` with `tool_choice: auto`
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the call fails or the response cannot be decoded.
    async fn complete_with_tools(
        &self,
        api_key: &str,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
    ) -> Result<ChatResponseWithTools, AppError>;

    /// Streaming completion without tools
    ///
    /// The returned stream is single-pass; it ends after the upstream `[DONE]`.
    ///
    /// # Errors
    ///
    /// Returns an upstream error if the stream cannot be opened. Failures after
    /// that arrive as items of the stream.
    async fn complete_stream(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatStream, AppError>;
}
