//! The [`StreamingProvider`] trait for model provider backends.

use super::error::GenerationError;
use super::event::EventStream;
use super::types::StreamContext;
use crate::descriptor::ModelDescriptor;
use async_trait::async_trait;

/// Trait implemented by provider backends that stream generation events.
///
/// Provider crates implement this trait; consumers only ever see tier
/// handlers built on top of it.
#[async_trait]
pub trait StreamingProvider: Send + Sync + 'static {
    /// Opens one streaming session.
    ///
    /// # Arguments
    ///
    /// * `model` - The descriptor of the model to run
    /// * `context` - Conversation and opaque parameters for this call
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the session cannot be opened (e.g. the
    /// endpoint is unreachable or credentials are rejected). Failures after
    /// the session is open are delivered as `Err` items in the stream.
    async fn open_stream(
        &self,
        model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError>;
}
