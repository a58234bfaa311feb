// ABOUTME: HTTP server assembly and lifecycle: state wiring, middleware, bind, graceful shutdown
// ABOUTME: Shares one outbound HTTP client between the identity resolver and the completion provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Server
//!
//! [`build_state`] wires the production services from configuration,
//! [`build_app`] adds request tracing and `x-request-id` handling around the
//! routes, and [`run`] serves until Ctrl-C or SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{body::Body, http::HeaderName, http::Request, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info, info_span};

use crate::config::ServerConfig;
use crate::constants::{env_vars, headers::REQUEST_ID, service_names};
use crate::errors::{AppError, AppResult};
use crate::identity::GitHubIdentityResolver;
use crate::llm::{CopilotProvider, CopilotProviderConfig};
use crate::relay::CompletionRelay;
use crate::routes::{self, AppState};

/// Build the production handler state from configuration
///
/// # Errors
///
/// Returns `CONFIG_ERROR` if an upstream base URL does not parse, or
/// `INTERNAL_ERROR` if the outbound HTTP client cannot be created.
pub fn build_state(config: &ServerConfig) -> AppResult<AppState> {
    for (name, url) in [
        (env_vars::COPILOT_API_URL, &config.upstream.copilot_api_url),
        (env_vars::GITHUB_API_URL, &config.upstream.github_api_url),
    ] {
        reqwest::Url::parse(url)
            .map_err(|e| AppError::config(format!("{name} is not a valid URL ({url}): {e}")))?;
    }

    let client = reqwest::Client::builder()
        .connect_timeout(config.upstream.connect_timeout)
        .user_agent(service_names::USER_AGENT)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

    let provider = CopilotProvider::with_client(
        client.clone(),
        CopilotProviderConfig::from(&config.upstream),
    );
    let identity =
        GitHubIdentityResolver::with_client(client, config.upstream.github_api_url.clone());

    Ok(AppState::new(
        Arc::new(identity),
        CompletionRelay::new(Arc::new(provider)),
    ))
}

/// Routes plus request-id and tracing middleware
#[must_use]
pub fn build_app(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID);

    routes::router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or_default();
                    info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::new(request_id)),
    )
}

/// Bind and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if state construction, binding, or serving fails.
pub async fn run(config: ServerConfig) -> Result<()> {
    info!("{}", config.summary());

    let app = build_app(build_state(&config)?);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(addr = %listener.local_addr()?, "Blackbeard extension listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failure")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
