//! Events produced by a provider streaming session.

use super::error::GenerationError;
use super::types::{StopReason, Usage};
use futures::stream::BoxStream;

/// A lazy, finite, non-restartable sequence of session events.
///
/// An `Err` item means the session terminated abnormally; nothing after it
/// is read.
pub type EventStream = BoxStream<'static, Result<StreamEvent, GenerationError>>;

/// A discriminated event from a provider streaming session.
///
/// Only [`StreamEvent::TextDelta`] contributes to an invocation's result.
/// Every other variant is observed and dropped, and kinds a backend does not
/// recognise arrive as [`StreamEvent::Other`] so that protocol additions stay
/// inert.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// The session has started.
    Start,
    /// An incremental fragment of generated text.
    TextDelta(String),
    /// An incremental fragment of reasoning text.
    ThinkingDelta(String),
    /// The model started a tool call.
    ToolCallStart {
        /// Provider-assigned call identifier.
        id: String,
        /// Name of the tool being called.
        name: String,
    },
    /// An incremental fragment of tool call arguments (partial JSON).
    ToolCallDelta(String),
    /// The current content block is complete.
    BlockStop,
    /// The session finished normally.
    Done {
        /// Why generation stopped, if reported.
        stop_reason: Option<StopReason>,
        /// Token usage, if reported.
        usage: Usage,
    },
    /// An event kind this crate does not interpret.
    Other {
        /// The provider's event kind.
        kind: String,
    },
}

impl StreamEvent {
    /// Creates a text delta event.
    #[must_use]
    pub fn text(delta: impl Into<String>) -> Self {
        Self::TextDelta(delta.into())
    }

    /// Creates an uninterpreted event of the given kind.
    #[must_use]
    pub fn other(kind: impl Into<String>) -> Self {
        Self::Other { kind: kind.into() }
    }

    /// Returns the payload if this is a text delta.
    #[must_use]
    pub fn as_text_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta(text) => Some(text),
            _ => None,
        }
    }

    /// Returns a short name for the event kind, for logging.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::TextDelta(_) => "text_delta",
            Self::ThinkingDelta(_) => "thinking_delta",
            Self::ToolCallStart { .. } => "toolcall_start",
            Self::ToolCallDelta(_) => "toolcall_delta",
            Self::BlockStop => "block_stop",
            Self::Done { .. } => "done",
            Self::Other { kind } => kind,
        }
    }
}
