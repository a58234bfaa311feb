// ABOUTME: Copilot chat-completions provider speaking the OpenAI-compatible wire format
// ABOUTME: Issues the tool-declaring initial call and the streaming follow-up call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Copilot Provider
//!
//! Client for the Copilot chat-completions API (`POST {base}/chat/completions`),
//! which follows the `OpenAI` wire format. The caller's own GitHub token is the
//! API key, so it is supplied per call rather than stored in the provider.
//!
//! ## Example
//!
//! ```rust,no_run
//! use blackbeard_extension::errors::AppError;
//! use blackbeard_extension::llm::{
//!     ChatMessage, ChatRequest, CopilotProvider, CopilotProviderConfig, LlmProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let provider = CopilotProvider::new(CopilotProviderConfig::default())?;
//!     let request = ChatRequest::new(vec![ChatMessage::user("Ahoy!")]).with_streaming();
//!     let _stream = provider.complete_stream("gho_example", &request).await?;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::sse_parser::create_sse_stream;
use super::{
    ChatMessage, ChatRequest, ChatResponseWithTools, ChatStream, FunctionDeclaration,
    LlmProvider, MessageRole, ToolCall,
};
use crate::config::UpstreamConfig;
use crate::constants::{defaults, service_names};
use crate::errors::AppError;

/// Name used in logs and upstream error messages
const PROVIDER_NAME: &str = "Copilot";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

/// Chat-completions request body
#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

/// Tool definition for the wire format
#[derive(Debug, Serialize)]
struct OpenAiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: &'a FunctionDeclaration,
}

/// Non-streaming response
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Error body (`{"error": {"message": ..., "type": ...}}`)
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the Copilot provider
#[derive(Debug, Clone)]
pub struct CopilotProviderConfig {
    /// API base URL, without the `/chat/completions` suffix
    pub base_url: String,
    /// Model used when a request does not name one
    pub default_model: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for CopilotProviderConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::COPILOT_API_URL.to_owned(),
            default_model: defaults::COPILOT_MODEL.to_owned(),
            connect_timeout: Duration::from_secs(defaults::UPSTREAM_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl From<&UpstreamConfig> for CopilotProviderConfig {
    fn from(upstream: &UpstreamConfig) -> Self {
        Self {
            base_url: upstream.copilot_api_url.clone(),
            default_model: upstream.model.clone(),
            connect_timeout: upstream.connect_timeout,
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Copilot chat-completions provider
pub struct CopilotProvider {
    client: Client,
    config: CopilotProviderConfig,
}

impl CopilotProvider {
    /// Create a provider with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: CopilotProviderConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(service_names::USER_AGENT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(client, config))
    }

    /// Create a provider sharing an existing HTTP client (and its connection pool)
    #[must_use]
    pub fn with_client(client: Client, config: CopilotProviderConfig) -> Self {
        info!(
            "Initializing {PROVIDER_NAME} provider: base_url={}, model={}",
            config.base_url, config.default_model
        );
        Self { client, config }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn build_request<'a>(
        &'a self,
        request: &'a ChatRequest,
        tools: &'a [FunctionDeclaration],
        stream: bool,
    ) -> OpenAiRequest<'a> {
        let openai_tools = (!tools.is_empty()).then(|| {
            tools
                .iter()
                .map(|function| OpenAiTool {
                    tool_type: "function",
                    function,
                })
                .collect::<Vec<_>>()
        });

        OpenAiRequest {
            model: request
                .model
                .as_deref()
                .unwrap_or(&self.config.default_model),
            messages: &request.messages,
            stream,
            tool_choice: openai_tools.as_ref().map(|_| "auto"),
            tools: openai_tools,
        }
    }

    fn log_messages_debug(messages: &[ChatMessage], has_tools: bool) {
        for (i, msg) in messages.iter().enumerate() {
            debug!(
                "Message[{i}] role={}, content_len={}, tool_calls={}",
                msg.role.as_str(),
                msg.content_len(),
                msg.tool_calls.as_ref().map_or(0, Vec::len)
            );
            if msg.role == MessageRole::System {
                debug!(
                    "System prompt preview: {}...",
                    msg.content
                        .as_deref()
                        .unwrap_or_default()
                        .chars()
                        .take(200)
                        .collect::<String>()
                );
            }
        }
        debug!(
            "Sending chat completion request to {PROVIDER_NAME} with {} messages and tools={has_tools}",
            messages.len()
        );
    }

    /// Map a non-success status and body to the error taxonomy
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| {
                let error_type = parsed.error.error_type.unwrap_or_else(|| "unknown".to_owned());
                format!("{error_type} - {}", parsed.error.message)
            },
        );

        match status {
            StatusCode::TOO_MANY_REQUESTS => AppError::upstream_rate_limited(
                PROVIDER_NAME,
                format!("rate limit reached: {detail}"),
            ),
            _ => AppError::upstream(PROVIDER_NAME, format!("API error ({status}): {detail}")),
        }
    }

    async fn post_completion(
        &self,
        api_key: &str,
        body: &OpenAiRequest<'_>,
    ) -> Result<reqwest::Response, AppError> {
        let accept = if body.stream {
            "text/event-stream"
        } else {
            "application/json"
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(api_key)
            .header(ACCEPT, accept)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {PROVIDER_NAME}: {e}");
                if e.is_connect() {
                    AppError::upstream(
                        PROVIDER_NAME,
                        format!("Cannot connect to {}", self.config.base_url),
                    )
                    .with_source(e)
                } else {
                    AppError::upstream(PROVIDER_NAME, format!("Failed to send request: {e}"))
                        .with_source(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::parse_error_response(status, &body));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for CopilotProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(
        skip_all,
        fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model))
    )]
    async fn complete_with_tools(
        &self,
        api_key: &str,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
    ) -> Result<ChatResponseWithTools, AppError> {
        Self::log_messages_debug(&request.messages, !tools.is_empty());
        let body = self.build_request(request, tools, false);

        let response = self.post_completion(api_key, &body).await?;
        let text = response.text().await.map_err(|e| {
            error!("Failed to read {PROVIDER_NAME} response: {e}");
            AppError::upstream(PROVIDER_NAME, format!("Failed to read response: {e}"))
        })?;

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse {PROVIDER_NAME} response: {e} - body: {}",
                text.chars().take(500).collect::<String>()
            );
            AppError::upstream(PROVIDER_NAME, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream(PROVIDER_NAME, "API returned no choices"))?;

        let tool_calls = choice.message.tool_calls.unwrap_or_default();
        debug!(
            "Received response from {PROVIDER_NAME}: content={:?}, tool_calls={}, finish_reason={:?}",
            choice.message.content.as_ref().map(String::len),
            tool_calls.len(),
            choice.finish_reason
        );

        Ok(ChatResponseWithTools {
            content: choice.message.content,
            tool_calls,
            model: parsed.model.unwrap_or_else(|| body.model.to_owned()),
            finish_reason: choice.finish_reason,
        })
    }

    #[instrument(
        skip_all,
        fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model))
    )]
    async fn complete_stream(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatStream, AppError> {
        Self::log_messages_debug(&request.messages, false);
        let body = self.build_request(request, &[], true);

        let response = self.post_completion(api_key, &body).await?;
        debug!("{PROVIDER_NAME} stream opened");

        Ok(create_sse_stream(response.bytes_stream(), PROVIDER_NAME))
    }
}
