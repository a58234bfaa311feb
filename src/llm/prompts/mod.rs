// ABOUTME: Persona system prompt and prompt assembly for the pirate agent
// ABOUTME: Prepends the Blackbeard persona instruction, naming the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # System Prompts
//!
//! Every conversation starts with one persona instruction telling the model to
//! answer as the pirate Blackbeard, addressed to the caller's GitHub login.

use super::ChatMessage;

/// Persona instruction addressed to `@{login}`
#[must_use]
pub fn persona_system_prompt(login: &str) -> String {
    format!("あなたはブラックビアード海賊のようにユーザー(@{login})に応答するアシスタントです。")
}

/// Insert the persona system message at index 0
///
/// The caller's messages follow unchanged and in their original order.
#[must_use]
pub fn assemble_messages(login: &str, messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let mut assembled = Vec::with_capacity(messages.len() + 1);
    assembled.push(ChatMessage::system(persona_system_prompt(login)));
    assembled.extend(messages);
    assembled
}
