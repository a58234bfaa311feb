// ABOUTME: Route module organization for the extension's HTTP endpoints
// ABOUTME: Holds the shared handler state and assembles the route tree
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! Route module for the Blackbeard extension
//!
//! Handlers stay thin: they extract inputs and delegate to the identity
//! resolver and the completion relay held in [`AppState`].

/// Agent endpoint (`GET /` greeting, `POST /` completion relay)
pub mod agent;
/// Health check routes
pub mod health;

pub use agent::{AgentRequest, AgentRoutes};
pub use health::HealthRoutes;

use std::sync::Arc;

use axum::Router;

use crate::identity::IdentityResolver;
use crate::relay::CompletionRelay;

/// Shared, immutable state for request handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolves the caller's GitHub login
    pub identity: Arc<dyn IdentityResolver>,
    /// Runs the completion calls
    pub relay: CompletionRelay,
}

impl AppState {
    /// Bundle the request-handling services
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityResolver>, relay: CompletionRelay) -> Self {
        Self { identity, relay }
    }
}

/// All routes, without middleware
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(AgentRoutes::routes(state))
        .merge(HealthRoutes::routes())
}
