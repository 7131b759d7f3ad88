//! Server-Sent Events framing shared by the streaming backends.

use async_stream::try_stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use meridian_models::llm::GenerationError;

/// One dispatched SSE event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Value of the `event:` field, if present.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

/// Largest frame the decoder buffers before giving up, in bytes.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Incremental SSE decoder.
///
/// Bytes are buffered until a blank line completes a frame, so multi-byte
/// characters and frames split across network chunks decode intact.
#[derive(Debug)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    // Bytes of `buffer` already searched for a frame terminator.
    scanned: usize,
    max_frame: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_frame(MAX_FRAME_BYTES)
    }
}

impl SseDecoder {
    /// Creates an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty decoder that rejects frames longer than `max_frame` bytes.
    #[must_use]
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_frame,
        }
    }

    /// Feeds bytes and returns every frame they complete.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidResponse`] if the pending frame grows
    /// past the size limit without a terminating blank line.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseFrame>, GenerationError> {
        // CR only ever appears as part of a line ending.
        self.buffer
            .extend(bytes.iter().copied().filter(|byte| *byte != b'\r'));

        let mut frames = Vec::new();
        // The terminator may straddle the previous chunk boundary.
        let mut from = self.scanned.saturating_sub(1);
        while let Some(offset) = self.buffer[from..]
            .windows(2)
            .position(|pair| pair == b"\n\n")
        {
            let end = from + offset;
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(frame) = parse_block(&block[..end]) {
                frames.push(frame);
            }
            from = 0;
        }
        self.scanned = self.buffer.len();

        if self.buffer.len() > self.max_frame {
            return Err(GenerationError::InvalidResponse(format!(
                "SSE frame exceeds {} bytes",
                self.max_frame
            )));
        }
        Ok(frames)
    }

    /// Flushes a trailing frame that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        self.scanned = 0;
        let block = core::mem::take(&mut self.buffer);
        parse_block(&block)
    }
}

fn parse_block(block: &[u8]) -> Option<SseFrame> {
    let text = String::from_utf8_lossy(block);
    let mut event = None;
    let mut data: Option<String> = None;

    for line in text.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = Some(value.to_string()),
            "data" => match &mut data {
                Some(existing) => {
                    existing.push('\n');
                    existing.push_str(value);
                }
                None => data = Some(value.to_string()),
            },
            _ => {}
        }
    }

    data.map(|data| SseFrame { event, data })
}

/// Decodes a streaming HTTP response body into SSE frames.
///
/// Transport errors end the stream with [`GenerationError::Stream`].
pub(crate) fn frames(
    response: reqwest::Response,
) -> BoxStream<'static, Result<SseFrame, GenerationError>> {
    let frames = try_stream! {
        let mut body = Box::pin(response.bytes_stream());
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| GenerationError::Stream(err.to_string()))?;
            tracing::trace!(bytes = chunk.len(), "sse chunk");
            for frame in decoder.push(&chunk)? {
                yield frame;
            }
        }

        if let Some(frame) = decoder.finish() {
            yield frame;
        }
    };
    frames.boxed()
}
