//! Error types for streaming generation.

use core::time::Duration;

/// Errors raised by a caller-supplied [`ChunkSink`](super::ChunkSink).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The receiving end of the sink has gone away.
    #[error("chunk sink is closed")]
    Closed,

    /// The sink rejected a chunk.
    #[error("chunk sink failed: {0}")]
    Failed(String),
}

/// Errors for streaming generation.
///
/// A failed invocation never carries partially accumulated text.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Http error (e.g.: connection error, timeout, etc.)
    #[error("http error: {0}")]
    Http(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Rate limited by the provider.
    #[error("rate limited{}", .retry_after.map(|d| format!(", retry after {d:?}")).unwrap_or_default())]
    RateLimited {
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// Error building the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Error parsing the response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No backend is available for the descriptor's protocol family.
    #[error("unsupported api '{0}'")]
    UnsupportedApi(String),

    /// Error returned by the model provider.
    #[error("provider error: {message}")]
    Provider {
        /// HTTP status code if available.
        status: Option<u16>,
        /// Error message.
        message: String,
        /// The underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The event stream terminated abnormally after it was opened.
    #[error("stream failed: {0}")]
    Stream(String),

    /// The caller's chunk sink failed; consumption stopped.
    #[error(transparent)]
    Sink(#[from] SinkError),
}
