// ABOUTME: Environment configuration for the agent server
// ABOUTME: Parses listen address and upstream endpoints from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! Environment-based configuration. There is no config file: every setting has a
//! default and may be overridden by one environment variable.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

use crate::constants::{defaults, env_vars};

/// Upstream endpoints the relay talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Completion API base URL (`/chat/completions` is appended)
    pub copilot_api_url: String,
    /// Model requested from the completion API
    pub model: String,
    /// Identity API base URL (`/user` is appended)
    pub github_api_url: String,
    /// Connect timeout applied to every outbound request
    pub connect_timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            copilot_api_url: defaults::COPILOT_API_URL.to_owned(),
            model: defaults::COPILOT_MODEL.to_owned(),
            github_api_url: defaults::GITHUB_API_URL.to_owned(),
            connect_timeout: Duration::from_secs(defaults::UPSTREAM_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: IpAddr,
    /// Listen port
    pub http_port: u16,
    /// Upstream endpoints
    pub upstream: UpstreamConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            http_port: defaults::PORT,
            upstream: UpstreamConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT`, `HOST`, or `UPSTREAM_CONNECT_TIMEOUT_SECS` is set
    /// but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let http_port = match non_empty_var(env_vars::PORT) {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid {} value: {raw}", env_vars::PORT))?,
            None => defaults::PORT,
        };

        let host_raw =
            non_empty_var(env_vars::HOST).unwrap_or_else(|| defaults::HOST.to_owned());
        let host = host_raw
            .parse::<IpAddr>()
            .with_context(|| format!("Invalid {} value: {host_raw}", env_vars::HOST))?;

        let connect_timeout_secs = match non_empty_var(env_vars::UPSTREAM_CONNECT_TIMEOUT_SECS) {
            Some(raw) => raw.parse::<u64>().with_context(|| {
                format!(
                    "Invalid {} value: {raw}",
                    env_vars::UPSTREAM_CONNECT_TIMEOUT_SECS
                )
            })?,
            None => defaults::UPSTREAM_CONNECT_TIMEOUT_SECS,
        };

        let upstream = UpstreamConfig {
            copilot_api_url: base_url_var(env_vars::COPILOT_API_URL, defaults::COPILOT_API_URL),
            model: non_empty_var(env_vars::COPILOT_MODEL)
                .unwrap_or_else(|| defaults::COPILOT_MODEL.to_owned()),
            github_api_url: base_url_var(env_vars::GITHUB_API_URL, defaults::GITHUB_API_URL),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        };

        Ok(Self {
            host,
            http_port,
            upstream,
        })
    }

    /// Socket address to bind
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.http_port)
    }

    /// One-line summary for the startup log
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "listen={} copilot_api={} model={} github_api={} connect_timeout={}s",
            self.bind_addr(),
            self.upstream.copilot_api_url,
            self.upstream.model,
            self.upstream.github_api_url,
            self.upstream.connect_timeout.as_secs()
        )
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn base_url_var(name: &str, default: &str) -> String {
    let url = non_empty_var(name).unwrap_or_else(|| default.to_owned());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        warn!("{name} does not look like an HTTP URL: {url}");
    }
    url.trim_end_matches('/').to_owned()
}
