// ABOUTME: Unified error type and error-code taxonomy for the Copilot agent endpoint
// ABOUTME: Maps every failure mode to a stable code, HTTP status, and JSON error body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Unified Error Handling
//!
//! Every fallible step of a request (token extraction, identity resolution, the
//! two completion calls, tool execution) returns [`AppResult`]. The [`ErrorCode`]
//! decides the HTTP status the caller sees, so "bad input" and "upstream outage"
//! stay distinguishable.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Standard error codes used throughout the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Request body missing, not JSON, or `messages` malformed
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
    /// No usable bearer token header on the request
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    /// The source-control platform rejected the token
    #[serde(rename = "AUTHENTICATION_FAILED")]
    AuthenticationFailed,
    /// Completion or identity API failed (transport, status, or decoding)
    #[serde(rename = "UPSTREAM_ERROR")]
    UpstreamError,
    /// Completion API answered with a rate-limit status
    #[serde(rename = "UPSTREAM_RATE_LIMITED")]
    UpstreamRateLimited,
    /// Unknown tool requested or tool arguments unusable
    #[serde(rename = "TOOL_EXECUTION_ERROR")]
    ToolExecutionError,
    /// Invalid service configuration
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    /// Anything else
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::AuthRequired | Self::AuthenticationFailed => 401,
            Self::UpstreamError => 502,
            Self::UpstreamRateLimited => 503,
            Self::ToolExecutionError | Self::ConfigError | Self::InternalError => 500,
        }
    }

    /// User-facing description of this error class
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "The request is invalid",
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthenticationFailed => "The provided token could not be authenticated",
            Self::UpstreamError => "An upstream service encountered an error",
            Self::UpstreamRateLimited => "Upstream service rate limit exceeded",
            Self::ToolExecutionError => "A requested tool could not be executed",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

/// Unified error type for the service
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Request ID, when known
    pub request_id: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: None,
            source: None,
        }
    }

    /// Attach the request ID the error occurred under
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Malformed request body or messages
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Missing bearer token header
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthRequired, message)
    }

    /// Token rejected by the identity provider
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthenticationFailed, message)
    }

    /// Upstream service failure, prefixed with the service name
    pub fn upstream(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UpstreamError,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Upstream rate limit
    pub fn upstream_rate_limited(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UpstreamRateLimited,
            format!("{}: {}", service.into(), message.into()),
        )
    }

    /// Tool dispatch or execution failure
    pub fn tool_execution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ToolExecutionError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Request ID, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                request_id: error.request_id,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(
                code = ?self.code,
                status = status.as_u16(),
                "Request failed: {}",
                self.message
            );
        } else {
            warn!(
                code = ?self.code,
                status = status.as_u16(),
                "Request rejected: {}",
                self.message
            );
        }
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::InvalidRequest.http_status(), 400);
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::AuthenticationFailed.http_status(), 401);
        assert_eq!(ErrorCode::UpstreamError.http_status(), 502);
        assert_eq!(ErrorCode::ToolExecutionError.http_status(), 500);
    }

    #[test]
    fn test_upstream_message_is_prefixed_with_service() {
        let error = AppError::upstream("Copilot", "connection refused");
        assert_eq!(error.code, ErrorCode::UpstreamError);
        assert_eq!(error.message, "Copilot: connection refused");
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_response_serialization() {
        let error =
            AppError::tool_execution("unknown tool 'launchCannons'").with_request_id("req-1");
        let json = serde_json::to_string(&ErrorResponse::from(error)).unwrap();
        assert!(json.contains("TOOL_EXECUTION_ERROR"));
        assert!(json.contains("launchCannons"));
        assert!(json.contains("req-1"));
    }
}
