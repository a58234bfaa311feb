// ABOUTME: Caller credential extraction from the X-GitHub-Token request header
// ABOUTME: Wraps the token in a redacting newtype so it never reaches logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Caller Authentication
//!
//! The Copilot platform forwards the end user's GitHub token in the
//! `X-GitHub-Token` header. This service never validates the token itself; it is
//! handed to the identity API and then used as the completion API key.

use std::fmt;

use axum::http::HeaderMap;

use crate::constants::headers;
use crate::errors::{AppError, AppResult};

/// The caller's GitHub token
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubToken(String);

impl GitHubToken {
    /// Wrap a raw token value
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for use as a bearer credential
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GitHubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitHubToken(***)")
    }
}

/// Read the caller's token from `X-GitHub-Token`
///
/// Header names are case-insensitive. Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when the header is absent, not visible ASCII, or empty.
pub fn extract_github_token(headers: &HeaderMap) -> AppResult<GitHubToken> {
    let value = headers
        .get(headers::GITHUB_TOKEN)
        .ok_or_else(|| AppError::auth_required("Missing X-GitHub-Token header"))?;

    let token = value
        .to_str()
        .map_err(|_| AppError::auth_required("X-GitHub-Token header is not valid text"))?
        .trim();

    if token.is_empty() {
        return Err(AppError::auth_required("X-GitHub-Token header is empty"));
    }

    Ok(GitHubToken::new(token))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::errors::ErrorCode;
    use axum::http::HeaderValue;

    #[test]
    fn test_extracts_token_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.insert("X-GitHub-Token", HeaderValue::from_static("gho_abc"));
        assert_eq!(extract_github_token(&headers).unwrap().expose(), "gho_abc");
    }

    #[test]
    fn test_missing_or_blank_token_is_auth_required() {
        let err = extract_github_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);

        let mut headers = HeaderMap::new();
        headers.insert("x-github-token", HeaderValue::from_static("   "));
        let err = extract_github_token(&headers).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = GitHubToken::new("gho_secret");
        assert!(!format!("{token:?}").contains("gho_secret"));
    }
}
