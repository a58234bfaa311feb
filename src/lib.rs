// ABOUTME: Main library entry point for the Blackbeard GitHub Copilot extension
// ABOUTME: A Copilot agent that answers as a pirate and can look up the weather
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

#![deny(unsafe_code)]

//! # Blackbeard Copilot Extension
//!
//! An HTTP agent for the GitHub Copilot extension platform. For each
//! conversation it:
//!
//! - resolves the caller's GitHub login from the forwarded `X-GitHub-Token`;
//! - prepends a persona instruction to answer as the pirate Blackbeard;
//! - asks the Copilot completion API whether the `getWeather` tool is needed,
//!   running it locally when requested;
//! - streams the final answer back as server-sent events.
//!
//! ## Architecture
//!
//! - **`routes`**: `GET /`, `POST /`, `GET /health`
//! - **`auth`** / **`identity`**: token extraction and `GET /user` lookup
//! - **`llm`**: message model, provider trait, Copilot client, SSE parsing
//! - **`tools`**: declared tools and their dispatch
//! - **`relay`**: the two-call completion flow
//! - **`sse`**: chunk forwarding to the HTTP response
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use blackbeard_extension::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     blackbeard_extension::server::run(config).await
//! }
//! ```

/// Caller token extraction
pub mod auth;

/// Environment-based configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// Error taxonomy and HTTP error responses
pub mod errors;

/// GitHub identity lookup
pub mod identity;

/// Chat-completion provider abstraction and Copilot client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Tool-detecting completion flow
pub mod relay;

/// HTTP route handlers
pub mod routes;

/// Server assembly and lifecycle
pub mod server;

/// Server-sent event forwarding
pub mod sse;

/// Tools offered to the model
pub mod tools;
