// ABOUTME: Configuration module root
// ABOUTME: Re-exports the environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

/// Environment-based configuration
pub mod environment;

pub use environment::{ServerConfig, UpstreamConfig};
