//! Core types for invocation requests and provider sessions.

use super::sink::ChunkSink;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────
// Request
// ─────────────────────

/// Per-call input to a tier handler.
///
/// The optional [`ChunkSink`] receives every text delta as it arrives.
/// Supplying one never changes the resolved string.
pub struct InvocationRequest {
    /// The user prompt for this turn.
    pub prompt: String,
    /// System prompt for the model.
    pub system: Option<String>,
    /// Earlier conversation turns sent before the prompt.
    pub history: Vec<Message>,
    /// Provider parameters forwarded unmodified into the request body.
    pub params: Map<String, Value>,
    /// Receives each text delta in arrival order.
    pub chunk_sink: Option<Box<dyn ChunkSink>>,
}

impl InvocationRequest {
    /// Creates a new request with a user prompt.
    ///
    /// # Example
    ///
    /// ```rust
    /// use meridian_models::llm::InvocationRequest;
    ///
    /// let request = InvocationRequest::new("What's the weather like?");
    /// assert!(!request.has_sink());
    /// ```
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            history: Vec::new(),
            params: Map::new(),
            chunk_sink: None,
        }
    }

    /// Creates a new request with a system prompt and user prompt.
    #[must_use]
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(prompt).system(system)
    }

    /// Sets the system prompt for the model.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Adds conversation history before the prompt.
    ///
    /// The messages provided are prepended to any existing history.
    #[must_use]
    pub fn history(mut self, mut messages: Vec<Message>) -> Self {
        messages.append(&mut self.history);
        self.history = messages;
        self
    }

    /// Sets a single provider parameter (e.g. `temperature`).
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replaces all provider parameters.
    #[must_use]
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    /// Attaches a sink that receives each text delta as it arrives.
    #[must_use]
    pub fn chunk_sink(mut self, sink: impl ChunkSink + 'static) -> Self {
        self.chunk_sink = Some(Box::new(sink));
        self
    }

    /// Returns `true` if a chunk sink is attached.
    #[must_use]
    pub fn has_sink(&self) -> bool {
        self.chunk_sink.is_some()
    }

    /// Splits the request into the provider-facing context and the sink.
    #[must_use]
    pub fn into_parts(self) -> (StreamContext, Option<Box<dyn ChunkSink>>) {
        let mut messages = self.history;
        messages.push(Message::user(self.prompt));
        let context = StreamContext {
            system: self.system,
            messages,
            params: self.params,
        };
        (context, self.chunk_sink)
    }
}

impl core::fmt::Debug for InvocationRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InvocationRequest")
            .field("prompt", &self.prompt)
            .field("system", &self.system)
            .field("history", &self.history)
            .field("params", &self.params)
            .field("chunk_sink", &self.chunk_sink.is_some())
            .finish()
    }
}

/// What a provider receives when a streaming session is opened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamContext {
    /// System prompt for the model.
    pub system: Option<String>,
    /// Conversation, ending with the current user prompt.
    pub messages: Vec<Message>,
    /// Opaque provider parameters.
    pub params: Map<String, Value>,
}

// ─────────────────────
// Messages
// ─────────────────────

/// A text turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// A message from the user.
    User {
        /// Message text.
        content: String,
    },
    /// A message from the assistant.
    Assistant {
        /// Message text.
        content: String,
    },
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: text.into(),
        }
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: text.into(),
        }
    }

    /// Returns the wire role name.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::User { content } | Self::Assistant { content } => content,
        }
    }
}

// ─────────────────────
// Session metadata
// ─────────────────────

/// Token usage reported at the end of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the input.
    pub input_tokens: Option<u64>,
    /// Number of tokens in the output.
    pub output_tokens: Option<u64>,
    /// Input tokens served from the prompt cache.
    pub cache_read_tokens: Option<u64>,
    /// Input tokens written to the prompt cache.
    pub cache_write_tokens: Option<u64>,
}

impl Usage {
    /// Total tokens (input + output), if either side was reported.
    #[must_use]
    pub fn total_tokens(&self) -> Option<u64> {
        match (self.input_tokens, self.output_tokens) {
            (None, None) => None,
            (input, output) => Some(input.unwrap_or_default() + output.unwrap_or_default()),
        }
    }
}

/// Reason why generation stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of turn.
    EndTurn,
    /// Hit max tokens.
    MaxTokens,
    /// Hit stop sequence.
    StopSequence,
    /// Tool use requested.
    ToolUse,
    /// The model refused the request.
    Refusal,
    /// A provider-specific reason.
    Other(String),
}

impl StopReason {
    /// Maps a provider stop/finish reason string.
    #[must_use]
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "end_turn" | "stop" => Self::EndTurn,
            "max_tokens" | "length" => Self::MaxTokens,
            "stop_sequence" => Self::StopSequence,
            "tool_use" | "tool_calls" | "function_call" => Self::ToolUse,
            "refusal" | "content_filter" => Self::Refusal,
            other => Self::Other(other.to_string()),
        }
    }
}
