// ABOUTME: Line-buffering SSE parser for streamed completion responses
// ABOUTME: Handles partial lines across TCP boundaries and multiple events per chunk
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Blackbeard Extension Contributors

//! # SSE Stream Parser
//!
//! Turns the completion API's `text/event-stream` body into a [`ChatStream`] of raw
//! JSON payloads. Two framing problems are handled here:
//!
//! 1. **Multiple events per TCP chunk**: every complete `data:` line in a chunk is
//!    emitted, in order.
//! 2. **Partial lines across TCP chunks**: bytes are buffered until a newline
//!    arrives. Buffering happens on raw bytes so a multi-byte UTF-8 character split
//!    across two chunks is decoded intact.
//!
//! The upstream `[DONE]` sentinel ends the stream; it is not forwarded as a chunk.

use std::mem;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use super::{ChatStream, StreamChunk};
use crate::errors::AppError;

/// A parsed SSE event from the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A `data:` payload (prefix stripped)
    Data(String),
    /// The `[DONE]` termination signal
    Done,
}

/// Line-buffering SSE parser
///
/// Non-`data` fields (`event:`, `id:`, `retry:`), comments, and blank separator
/// lines produce no events.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    /// Bytes not yet terminated by a newline
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Create a new empty line buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning the events of every line completed by them
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            events.extend(parse_line(&line));
        }
        events
    }

    /// Parse whatever is left once the byte stream has ended
    pub fn flush(&mut self) -> Vec<SseEvent> {
        let remaining = mem::take(&mut self.buffer);
        parse_line(&remaining).into_iter().collect()
    }

    /// Whether a partial line is waiting for more bytes
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }
}

fn parse_line(line: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim_end_matches(['\n', '\r']);
    let data = text.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    match data.trim() {
        "" => None,
        "[DONE]" => Some(SseEvent::Done),
        _ => Some(SseEvent::Data(data.to_owned())),
    }
}

/// Create a [`ChatStream`] from a raw completion byte stream
///
/// Each `data:` payload is checked to be JSON and yielded as a [`StreamChunk`]. The
/// stream ends at the upstream `[DONE]` or when the body ends. A transport error or
/// a non-JSON payload yields one error item and ends the stream.
pub fn create_sse_stream<S>(byte_stream: S, provider_name: &'static str) -> ChatStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut byte_stream = Box::pin(byte_stream);
        let mut parser = SseLineBuffer::new();

        loop {
            let (events, body_ended) = match byte_stream.next().await {
                Some(Ok(bytes)) => (parser.feed(&bytes), false),
                Some(Err(e)) => {
                    yield Err(AppError::upstream(
                        provider_name,
                        format!("Stream read error: {e}"),
                    ));
                    return;
                }
                None => (parser.flush(), true),
            };

            for event in events {
                match event {
                    SseEvent::Data(payload) => match StreamChunk::from_data(payload) {
                        Ok(chunk) => yield Ok(chunk),
                        Err(e) => {
                            yield Err(AppError::upstream(
                                provider_name,
                                format!("Malformed stream chunk: {e}"),
                            ));
                            return;
                        }
                    },
                    SseEvent::Done => return,
                }
            }

            if body_ended {
                return;
            }
        }
    };

    Box::pin(stream)
}
