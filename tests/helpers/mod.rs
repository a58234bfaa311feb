// ABOUTME: Shared test helpers for integration tests
// ABOUTME: Exports the oneshot request builder, scripted fakes, and stub upstream servers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod axum_test;
pub mod fakes;
pub mod stub_server;
