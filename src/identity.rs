// ABOUTME: Resolves the caller's GitHub login from their token via GET /user
// ABOUTME: Maps identity API failures onto the service error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Identity Resolver
//!
//! One `GET {github_api_url}/user` per request. Only the `login` field of the
//! response is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::auth::GitHubToken;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "GitHub";
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Looks up the GitHub login that owns a token
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Return the login of the token's owner
    ///
    /// # Errors
    ///
    /// Returns `AUTHENTICATION_FAILED` when GitHub rejects the token and
    /// `UPSTREAM_ERROR` for any other failure.
    async fn resolve_login(&self, token: &GitHubToken) -> AppResult<String>;
}

/// Subset of the `GET /user` response body
#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
}

/// [`IdentityResolver`] backed by the GitHub REST API
pub struct GitHubIdentityResolver {
    client: Client,
    api_url: String,
}

impl GitHubIdentityResolver {
    /// Create a resolver with its own HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_url: impl Into<String>, connect_timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(service_names::USER_AGENT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, api_url))
    }

    /// Create a resolver sharing an existing HTTP client
    #[must_use]
    pub fn with_client(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn map_status(status: StatusCode, body: &str) -> AppError {
        let detail: String = body.chars().take(200).collect();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::authentication_failed(
                format!("GitHub rejected the token ({status})"),
            ),
            _ => AppError::upstream(SERVICE, format!("GET /user failed ({status}): {detail}")),
        }
    }
}

#[async_trait]
impl IdentityResolver for GitHubIdentityResolver {
    #[instrument(skip_all)]
    async fn resolve_login(&self, token: &GitHubToken) -> AppResult<String> {
        let response = self
            .client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(token.expose())
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|e| {
                warn!("GitHub identity request failed: {e}");
                AppError::upstream(SERVICE, format!("Failed to reach identity API: {e}"))
                    .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        let user: GitHubUser = response.json().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("Unexpected /user response: {e}"))
        })?;

        if user.login.is_empty() {
            return Err(AppError::upstream(SERVICE, "/user response has an empty login"));
        }

        debug!(login = %user.login, "Resolved caller identity");
        Ok(user.login)
    }
}
