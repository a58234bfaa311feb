// ABOUTME: Server-Sent Events forwarder from completion chunks to the HTTP response
// ABOUTME: Relays each chunk as a data frame and closes with the [DONE] sentinel
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # SSE Forwarder
//!
//! Each upstream chunk becomes one `data: <json>\n\n` frame, in arrival order
//! and byte-for-byte. A successful stream ends with exactly one
//! `data: [DONE]\n\n`. When the upstream stream fails midway the error is
//! logged and handed to the response body, which aborts the connection
//! without the sentinel so the client can tell the answer is incomplete.

use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};
use tracing::{debug, error};

use crate::errors::AppError;
use crate::llm::ChatStream;

/// Terminal sentinel written after the last chunk
pub const DONE_SENTINEL: &str = "[DONE]";

/// Turn a completion stream into SSE events
#[must_use]
pub fn forward_chunks(
    mut chunks: ChatStream,
) -> impl Stream<Item = Result<Event, AppError>> + Send {
    async_stream::stream! {
        let mut forwarded = 0_usize;

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => {
                    forwarded += 1;
                    yield Ok(Event::default().data(chunk.as_str()));
                }
                Err(e) => {
                    error!(forwarded, "Completion stream failed mid-response: {e}");
                    yield Err(e);
                    return;
                }
            }
        }

        debug!(forwarded, "Completion stream finished");
        yield Ok(Event::default().data(DONE_SENTINEL));
    }
}

/// SSE response relaying `chunks`
#[must_use]
pub fn sse_response(
    chunks: ChatStream,
) -> Sse<impl Stream<Item = Result<Event, AppError>> + Send> {
    Sse::new(forward_chunks(chunks))
}
