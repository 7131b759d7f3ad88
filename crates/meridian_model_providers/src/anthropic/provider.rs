//! Anthropic [`StreamingProvider`] implementation.

use super::client::AnthropicClient;
use super::types::{
    BlockDelta, ContentBlockStart, CreateMessageRequest, Event, MessageParam, Role,
};
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

/// Protocol tag served by [`AnthropicProvider`].
pub const API: &str = "anthropic-messages";

/// Anthropic [`StreamingProvider`] implementation.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: AnthropicClient,
}

impl AnthropicProvider {
    /// Creates a new provider.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: AnthropicClient::new(api_key),
        }
    }

    /// Creates a provider that sends requests through `client`.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client: AnthropicClient::with_http_client(client, api_key),
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
}

#[async_trait]
impl StreamingProvider for AnthropicProvider {
    async fn open_stream(
        &self,
        model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let body = convert_request(model, context)?;
        let response = self.client.stream_message(model, &body).await?;
        Ok(decode(sse::frames(response)))
    }
}

fn convert_request(
    model: &ModelDescriptor,
    context: StreamContext,
) -> Result<serde_json::Value, GenerationError> {
    let messages = context
        .messages
        .into_iter()
        .map(|message| match message {
            Message::User { content } => MessageParam {
                role: Role::User,
                content,
            },
            Message::Assistant { content } => MessageParam {
                role: Role::Assistant,
                content,
            },
        })
        .collect();

    let request = CreateMessageRequest {
        model: model.id.clone(),
        max_tokens: model.max_tokens,
        messages,
        system: context.system,
        stream: true,
    };

    http::request_body(&request, context.params)
}

/// Converts SSE frames into session events.
fn decode(frames: BoxStream<'static, Result<SseFrame, GenerationError>>) -> EventStream {
    let events = try_stream! {
        let mut frames = frames;
        let mut decoder = EventDecoder::default();

        while let Some(frame) = frames.next().await {
            if let Some(event) = decoder.decode(&frame?)? {
                let done = matches!(event, StreamEvent::Done { .. });
                yield event;
                if done {
                    break;
                }
            }
        }

        if !decoder.finished {
            Err::<(), _>(GenerationError::Stream(
                "stream ended before message_stop".to_string(),
            ))?;
        }
    };
    events.boxed()
}

/// Per-session decoding state.
#[derive(Debug, Default)]
struct EventDecoder {
    usage: Usage,
    stop_reason: Option<StopReason>,
    finished: bool,
}

impl EventDecoder {
    fn decode(&mut self, frame: &SseFrame) -> Result<Option<StreamEvent>, GenerationError> {
        let value: serde_json::Value = serde_json::from_str(&frame.data).map_err(|err| {
            GenerationError::InvalidResponse(format!("malformed event data: {err}"))
        })?;

        // Unknown `type` tags land in the catch-all variants, so a failure
        // here is a known kind with the wrong shape.
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("untyped")
            .to_string();
        let event = serde_json::from_value::<Event>(value).map_err(|err| {
            GenerationError::InvalidResponse(format!("malformed {kind} event: {err}"))
        })?;

        let event = match event {
            Event::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.usage.input_tokens = usage.input_tokens;
                    self.usage.output_tokens = usage.output_tokens;
                    self.usage.cache_write_tokens = usage.cache_creation_input_tokens;
                    self.usage.cache_read_tokens = usage.cache_read_input_tokens;
                }
                StreamEvent::Start
            }
            Event::ContentBlockStart { content_block } => match content_block {
                ContentBlockStart::Text { text } if text.is_empty() => return Ok(None),
                ContentBlockStart::Text { text } => StreamEvent::TextDelta(text),
                ContentBlockStart::ToolUse { id, name } => StreamEvent::ToolCallStart { id, name },
                ContentBlockStart::Other => other(frame),
            },
            Event::ContentBlockDelta { delta } => match delta {
                BlockDelta::TextDelta { text } => StreamEvent::TextDelta(text),
                BlockDelta::ThinkingDelta { thinking } => StreamEvent::ThinkingDelta(thinking),
                BlockDelta::InputJsonDelta { partial_json } => {
                    StreamEvent::ToolCallDelta(partial_json)
                }
                BlockDelta::Other => other(frame),
            },
            Event::ContentBlockStop {} => StreamEvent::BlockStop,
            Event::MessageDelta { delta, usage } => {
                if let Some(reason) = delta.stop_reason {
                    self.stop_reason = Some(StopReason::from_provider(&reason));
                }
                if let Some(output) = usage.and_then(|usage| usage.output_tokens) {
                    self.usage.output_tokens = Some(output);
                }
                return Ok(None);
            }
            Event::MessageStop => {
                self.finished = true;
                StreamEvent::Done {
                    stop_reason: self.stop_reason.take(),
                    usage: self.usage,
                }
            }
            Event::Ping => StreamEvent::other("ping"),
            Event::Error { error } => {
                return Err(GenerationError::Stream(format!(
                    "{}: {}",
                    error.kind, error.message
                )));
            }
            Event::Unknown => other(frame),
        };

        Ok(Some(event))
    }
}

fn other(frame: &SseFrame) -> StreamEvent {
    StreamEvent::other(frame.event.as_deref().unwrap_or("unknown"))
}
