//! `OpenAI`-compatible [`StreamingProvider`] implementation.

use super::types::{ChatChunk, ChatCompletionRequest, ChatMessage, StreamOptions};
use crate::http;
use crate::sse::{self, SseFrame};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use meridian_models::ModelDescriptor;
use meridian_models::error::ConfigurationError;
use meridian_models::llm::{
    EventStream, GenerationError, Message, StopReason, StreamContext, StreamEvent,
    StreamingProvider, Usage,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Protocol tag served by [`OpenAiProvider`].
pub const API: &str = "openai-completions";

/// Sentinel payload closing a chat completions stream.
const DONE: &str = "[DONE]";

/// `OpenAI`-compatible [`StreamingProvider`] implementation.
///
/// The request URL is `{baseUrl}/chat/completions`, so the descriptor's base
/// URL selects between `OpenAI` itself and compatible servers.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAiProvider {
    /// Creates a new provider with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), api_key)
    }

    /// Creates a provider that sends requests through `client`.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Creates a provider that reads the API key from the specified environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingEnv`] if the variable is not set.
    pub fn from_env(env_var: &str) -> Result<Self, ConfigurationError> {
        let api_key = std::env::var(env_var)
            .map_err(|_| ConfigurationError::MissingEnv(env_var.to_string()))?;
        Ok(Self::new(api_key))
    }

    fn headers(&self, model: &ModelDescriptor) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|err| GenerationError::Auth(format!("Invalid API key header: {err}")))?,
        );
        http::apply_descriptor_headers(&mut headers, model)?;
        Ok(headers)
    }
}

impl core::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StreamingProvider for OpenAiProvider {
    async fn open_stream(
        &self,
        model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let body = convert_request(model, context)?;
        let url = format!("{}/chat/completions", model.endpoint());
        let response = http::open(&self.client, &url, self.headers(model)?, &body).await?;
        Ok(decode(sse::frames(response)))
    }
}

// ---------------------------------------------------------------------------
// Request conversion
// ---------------------------------------------------------------------------

fn convert_request(
    model: &ModelDescriptor,
    context: StreamContext,
) -> Result<serde_json::Value, GenerationError> {
    let system = context.system.map(|content| ChatMessage {
        role: "system",
        content,
    });
    let messages = system
        .into_iter()
        .chain(context.messages.into_iter().map(|message| match message {
            Message::User { content } => ChatMessage {
                role: "user",
                content,
            },
            Message::Assistant { content } => ChatMessage {
                role: "assistant",
                content,
            },
        }))
        .collect();

    let request = ChatCompletionRequest {
        model: model.id.clone(),
        messages,
        max_tokens: model.max_tokens,
        stream: true,
        stream_options: StreamOptions {
            include_usage: true,
        },
    };

    http::request_body(&request, context.params)
}

// ---------------------------------------------------------------------------
// Stream decoding
// ---------------------------------------------------------------------------

/// Converts SSE frames into session events.
///
/// A stream that closes without `[DONE]` still completes if a finish reason
/// was reported; otherwise it is treated as truncated.
fn decode(frames: BoxStream<'static, Result<SseFrame, GenerationError>>) -> EventStream {
    let events = try_stream! {
        let mut frames = frames;
        let mut decoder = ChunkDecoder::default();

        while let Some(frame) = frames.next().await {
            for event in decoder.decode(&frame?)? {
                yield event;
            }
            if decoder.finished {
                break;
            }
        }

        if !decoder.finished {
            if decoder.stop_reason.is_none() {
                Err::<(), _>(GenerationError::Stream(
                    "stream ended before [DONE]".to_string(),
                ))?;
            }
            yield decoder.done();
        }
    };
    events.boxed()
}

#[derive(Debug, Default)]
struct ChunkDecoder {
    started: bool,
    usage: Usage,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl ChunkDecoder {
    fn decode(&mut self, frame: &SseFrame) -> Result<Vec<StreamEvent>, GenerationError> {
        if frame.data.trim() == DONE {
            return Ok(vec![self.done()]);
        }

        let chunk: ChatChunk = serde_json::from_str(&frame.data).map_err(|err| {
            GenerationError::InvalidResponse(format!("malformed chunk: {err}"))
        })?;
        if let Some(error) = chunk.error {
            return Err(GenerationError::Stream(error.message));
        }

        let mut events = Vec::new();
        if !self.started {
            self.started = true;
            events.push(StreamEvent::Start);
        }

        if let Some(usage) = chunk.usage {
            self.usage.input_tokens = usage.prompt_tokens;
            self.usage.output_tokens = usage.completion_tokens;
            self.usage.cache_read_tokens = usage
                .prompt_tokens_details
                .and_then(|details| details.cached_tokens);
        }

        for choice in chunk.choices {
            let delta = choice.delta;
            if let Some(thinking) = delta.reasoning_content.filter(|text| !text.is_empty()) {
                events.push(StreamEvent::ThinkingDelta(thinking));
            }
            if let Some(text) = delta.content.filter(|text| !text.is_empty()) {
                events.push(StreamEvent::TextDelta(text));
            }
            for call in delta.tool_calls.into_iter().flatten() {
                let (name, arguments) = call
                    .function
                    .map(|function| (function.name, function.arguments))
                    .unwrap_or_default();
                if let (Some(id), Some(name)) = (call.id, name) {
                    events.push(StreamEvent::ToolCallStart { id, name });
                }
                if let Some(arguments) = arguments.filter(|args| !args.is_empty()) {
                    events.push(StreamEvent::ToolCallDelta(arguments));
                }
            }
            if let Some(reason) = choice.finish_reason {
                self.stop_reason = Some(StopReason::from_provider(&reason));
            }
        }

        Ok(events)
    }

    fn done(&mut self) -> StreamEvent {
        self.finished = true;
        StreamEvent::Done {
            stop_reason: self.stop_reason.take(),
            usage: self.usage,
        }
    }
}
