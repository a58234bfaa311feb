// ABOUTME: System-wide constants for the Blackbeard Copilot extension
// ABOUTME: Environment variable names, upstream defaults, header names, and fixed texts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # Constants Module
//!
//! Hardcoded defaults and the names of the environment variables that override them.

/// Service identity used in logs, the health endpoint, and outbound `User-Agent`
pub mod service_names {
    /// Service name
    pub const BLACKBEARD_EXTENSION: &str = "blackbeard-extension";

    /// Service version from Cargo.toml
    pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// `User-Agent` sent on outbound requests (GitHub rejects requests without one)
    pub const USER_AGENT: &str = concat!("blackbeard-extension/", env!("CARGO_PKG_VERSION"));
}

/// Environment variable names
pub mod env_vars {
    /// Listen port
    pub const PORT: &str = "PORT";
    /// Bind address
    pub const HOST: &str = "HOST";
    /// Completion API base URL
    pub const COPILOT_API_URL: &str = "COPILOT_API_URL";
    /// Completion model
    pub const COPILOT_MODEL: &str = "COPILOT_MODEL";
    /// Identity API base URL
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    /// Outbound connect timeout in seconds
    pub const UPSTREAM_CONNECT_TIMEOUT_SECS: &str = "UPSTREAM_CONNECT_TIMEOUT_SECS";
}

/// Default configuration values
pub mod defaults {
    /// Default listen port
    pub const PORT: u16 = 3000;
    /// Default bind address
    pub const HOST: &str = "0.0.0.0";
    /// Default completion API base URL
    pub const COPILOT_API_URL: &str = "https://api.githubcopilot.com";
    /// Default completion model
    pub const COPILOT_MODEL: &str = "gpt-4o";
    /// Default identity API base URL
    pub const GITHUB_API_URL: &str = "https://api.github.com";
    /// Default outbound connect timeout
    pub const UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 10;
}

/// HTTP header names
pub mod headers {
    /// Header carrying the caller's GitHub token
    pub const GITHUB_TOKEN: &str = "x-github-token";
    /// Request correlation header
    pub const REQUEST_ID: &str = "x-request-id";
}

/// Fixed user-facing texts
pub mod messages {
    /// `GET /` greeting
    pub const GREETING: &str = "ようこそ、ブラックビアード海賊 GitHub Copilot 拡張機能へ！";
}
