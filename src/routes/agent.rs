// ABOUTME: Agent endpoint: greeting on GET and the streamed pirate completion on POST
// ABOUTME: Checks the token, parses the body, resolves identity, then relays the stream
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! Agent routes
//!
//! `POST /` validates in a fixed order: the `X-GitHub-Token` header, then the
//! JSON body, then the caller's identity. Only after all three succeed is a
//! completion call made, so every failure up to that point is a plain JSON
//! error response rather than a broken stream.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};

use super::AppState;
use crate::auth::extract_github_token;
use crate::constants::{headers::REQUEST_ID, messages::GREETING};
use crate::errors::{AppError, AppResult};
use crate::llm::{assemble_messages, ChatMessage, ChatStream};
use crate::sse::sse_response;

/// `POST /` request body; other top-level fields are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct AgentRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<ChatMessage>,
}

/// Agent routes implementation
pub struct AgentRoutes;

impl AgentRoutes {
    /// Create the agent routes
    #[must_use]
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/", get(Self::greet).post(Self::converse))
            .with_state(state)
    }

    async fn greet() -> &'static str {
        GREETING
    }

    #[instrument(skip_all, fields(request_id = request_id(&headers).unwrap_or_default()))]
    async fn converse(
        State(state): State<AppState>,
        headers: HeaderMap,
        body: Result<Json<AgentRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        match Self::open_stream(&state, &headers, body).await {
            Ok(chunks) => Ok(sse_response(chunks).into_response()),
            Err(e) => Err(match request_id(&headers) {
                Some(id) => e.with_request_id(id),
                None => e,
            }),
        }
    }

    async fn open_stream(
        state: &AppState,
        headers: &HeaderMap,
        body: Result<Json<AgentRequest>, JsonRejection>,
    ) -> AppResult<ChatStream> {
        let token = extract_github_token(headers)?;
        let Json(request) =
            body.map_err(|rejection| AppError::invalid_request(rejection.body_text()))?;

        let login = state.identity.resolve_login(&token).await?;
        info!(%login, messages = request.messages.len(), "Relaying conversation");

        let conversation = assemble_messages(&login, request.messages);
        state.relay.run(token.expose(), conversation).await
    }
}

fn request_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(REQUEST_ID)
        .and_then(|value| value.to_str().ok())
}
