// ABOUTME: Scripted fakes of the completion provider and identity resolver
// ABOUTME: Record every call so tests can assert on what the relay sent upstream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use blackbeard_extension::auth::GitHubToken;
use blackbeard_extension::errors::{AppError, AppResult, ErrorCode};
use blackbeard_extension::identity::IdentityResolver;
use blackbeard_extension::llm::{
    ChatRequest, ChatResponseWithTools, ChatStream, FunctionCall, FunctionDeclaration,
    LlmProvider, StreamChunk, ToolCall,
};
use blackbeard_extension::relay::CompletionRelay;
use blackbeard_extension::routes::AppState;
use blackbeard_extension::server;

/// What the non-streaming call answers
#[derive(Debug, Clone)]
pub enum InitialReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    Fail(ErrorCode),
}

/// One call received by [`ScriptedProvider`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub api_key: String,
    pub request: ChatRequest,
    pub tool_names: Vec<String>,
    pub streaming: bool,
}

/// Provider fake that answers from a script and records its calls
pub struct ScriptedProvider {
    initial: InitialReply,
    chunks: Vec<String>,
    fail_stream_after: Option<usize>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new(initial: InitialReply, chunks: &[&str]) -> Self {
        Self {
            initial,
            chunks: chunks.iter().map(|c| (*c).to_owned()).collect(),
            fail_stream_after: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail the stream after `count` chunks
    pub fn failing_stream_after(mut self, count: usize) -> Self {
        self.fail_stream_after = Some(count);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        api_key: &str,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
        streaming: bool,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            api_key: api_key.to_owned(),
            request: request.clone(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            streaming,
        });
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "gpt-4o"
    }

    async fn complete_with_tools(
        &self,
        api_key: &str,
        request: &ChatRequest,
        tools: &[FunctionDeclaration],
    ) -> Result<ChatResponseWithTools, AppError> {
        self.record(api_key, request, tools, false);
        match &self.initial {
            InitialReply::Text(text) => Ok(ChatResponseWithTools {
                content: Some(text.clone()),
                tool_calls: Vec::new(),
                model: "gpt-4o".to_owned(),
                finish_reason: Some("stop".to_owned()),
            }),
            InitialReply::ToolCalls(calls) => Ok(ChatResponseWithTools {
                content: None,
                tool_calls: calls.clone(),
                model: "gpt-4o".to_owned(),
                finish_reason: Some("tool_calls".to_owned()),
            }),
            InitialReply::Fail(code) => Err(AppError::new(*code, "scripted failure")),
        }
    }

    async fn complete_stream(
        &self,
        api_key: &str,
        request: &ChatRequest,
    ) -> Result<ChatStream, AppError> {
        self.record(api_key, request, &[], true);

        let mut items: Vec<Result<StreamChunk, AppError>> = self
            .chunks
            .iter()
            .map(|c| Ok(StreamChunk::from_data(c.clone()).unwrap()))
            .collect();
        if let Some(count) = self.fail_stream_after {
            items.truncate(count);
            items.push(Err(AppError::upstream("Scripted", "connection reset")));
        }
        Ok(Box::pin(futures_util::stream::iter(items)))
    }
}

/// Identity fake returning a fixed login or a fixed failure
pub struct StaticIdentity {
    outcome: Result<String, ErrorCode>,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl StaticIdentity {
    pub fn login(login: &str) -> Self {
        Self {
            outcome: Ok(login.to_owned()),
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
        }
    }

    pub fn failing(code: ErrorCode) -> Self {
        Self {
            outcome: Err(code),
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve_login(&self, token: &GitHubToken) -> AppResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.expose().to_owned());
        self.outcome
            .clone()
            .map_err(|code| AppError::new(code, "scripted identity failure"))
    }
}

/// A `getWeather`-style tool call
pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_owned(),
        call_type: "function".to_owned(),
        function: FunctionCall {
            name: name.to_owned(),
            arguments: arguments.to_owned(),
        },
    }
}

/// Full application (routes and middleware) over the given fakes
pub fn app(provider: &Arc<ScriptedProvider>, identity: &Arc<StaticIdentity>) -> Router {
    let provider: Arc<dyn LlmProvider> = provider.clone();
    let identity: Arc<dyn IdentityResolver> = identity.clone();
    server::build_app(AppState::new(identity, CompletionRelay::new(provider)))
}
