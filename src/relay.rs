// ABOUTME: Completion relay: tool-detecting initial call followed by the streamed answer
// ABOUTME: Executes a requested tool locally and feeds its result into the streaming call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Completion Relay
//!
//! Each conversation goes through at most two completion calls:
//!
//! 1. A non-streaming call that declares the tools with `tool_choice: auto`.
//! 2. A streaming call without tools. If the first call requested a tool, the
//!    assistant tool-call message and the tool result are appended first.
//!
//! Only the first requested tool call is honored.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::errors::AppResult;
use crate::llm::{ChatMessage, ChatRequest, ChatStream, LlmProvider, ToolCall};
use crate::tools::{self, DeclaredTool};

/// Drives the completion calls for one conversation at a time
///
/// Requests name no model; the provider's configured default applies to both calls.
#[derive(Clone)]
pub struct CompletionRelay {
    provider: Arc<dyn LlmProvider>,
}

impl CompletionRelay {
    /// Create a relay over `provider`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// Run the initial call, any requested tool, and open the final stream
    ///
    /// `messages` is the assembled conversation, persona message included.
    ///
    /// # Errors
    ///
    /// Returns the error of whichever step failed: either completion call, or
    /// dispatch of the requested tool. Nothing is streamed in that case.
    #[instrument(
        skip_all,
        fields(
            provider = self.provider.name(),
            model = self.provider.default_model(),
            messages = messages.len()
        )
    )]
    pub async fn run(&self, api_key: &str, messages: Vec<ChatMessage>) -> AppResult<ChatStream> {
        let declarations = tools::declarations();
        let initial = ChatRequest::new(messages);

        let response = self
            .provider
            .complete_with_tools(api_key, &initial, &declarations)
            .await?;

        let mut messages = initial.messages;
        let mut tool_calls = response.tool_calls.into_iter();
        if let Some(call) = tool_calls.next() {
            let ignored: Vec<String> = tool_calls.map(|extra| extra.function.name).collect();
            if !ignored.is_empty() {
                warn!(
                    ?ignored,
                    "Model requested {} additional tool calls; only the first is executed",
                    ignored.len()
                );
            }
            Self::append_tool_exchange(&mut messages, response.content, call)?;
        } else {
            info!("No tool call requested, streaming answer");
        }

        self.provider
            .complete_stream(api_key, &ChatRequest::new(messages).with_streaming())
            .await
    }

    fn append_tool_exchange(
        messages: &mut Vec<ChatMessage>,
        content: Option<String>,
        call: ToolCall,
    ) -> AppResult<()> {
        let tool = DeclaredTool::from_call(&call)?;
        info!(tool = tool.name(), call_id = %call.id, "Executing tool call");
        let output = tool.execute()?;

        let call_id = call.id.clone();
        messages.push(ChatMessage::assistant_tool_call(content, call));
        messages.push(ChatMessage::tool_result(call_id, output));
        Ok(())
    }
}
