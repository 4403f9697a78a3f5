//! Request body collection.
//!
//! # Responsibilities
//! - Read body frames in arrival order until the stream ends
//! - Decode them as UTF-8 with a decoder that carries incomplete
//!   multi-byte sequences across frame boundaries
//! - Enforce the configured maximum body size
//!
//! # Design Decisions
//! - Malformed bytes become U+FFFD, matching `String::from_utf8_lossy`
//! - The size limit counts raw bytes, not decoded characters

use axum::body::Body;
use futures_util::StreamExt;
use thiserror::Error;

const REPLACEMENT: char = '\u{FFFD}';

/// Errors that stop body collection.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(#[from] axum::Error),
}

/// Incremental UTF-8 decoder.
///
/// Holds at most the first three bytes of a sequence whose remaining bytes
/// have not arrived yet.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `chunk`, appending complete characters to `out`.
    pub fn decode(&mut self, chunk: &[u8], out: &mut String) {
        let buffered;
        let mut rest: &[u8] = if self.pending.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.pending);
            joined.extend_from_slice(chunk);
            buffered = joined;
            &buffered
        };

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.push_str(text);
                    }
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &tail[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk.
                            self.pending.extend_from_slice(tail);
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush the decoder at end of stream.
    pub fn finish(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            self.pending.clear();
            out.push(REPLACEMENT);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Collect `body` into a string, failing once more than `limit` bytes arrive.
pub async fn collect_body(body: Body, limit: usize) -> Result<String, BodyError> {
    let mut stream = body.into_data_stream();
    let mut decoder = Utf8Decoder::new();
    let mut text = String::new();
    let mut received = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        received = received.saturating_add(chunk.len());
        if received > limit {
            return Err(BodyError::TooLarge { limit });
        }
        decoder.decode(&chunk, &mut text);
    }

    decoder.finish(&mut text);
    Ok(text)
}
