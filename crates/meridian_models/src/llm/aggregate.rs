//! Folds a provider event stream into a single resolved string.

use super::error::GenerationError;
use super::event::{EventStream, StreamEvent};
use super::provider::StreamingProvider;
use super::sink::ChunkSink;
use super::types::{InvocationRequest, StopReason, Usage};
use crate::descriptor::ModelDescriptor;
use futures::StreamExt;
use std::sync::Arc;

/// Runs one model invocation end-to-end against a fixed model.
///
/// Each call opens its own session and owns its own accumulator, so
/// concurrent invocations never share state.
#[derive(Clone)]
pub struct StreamingAggregator {
    provider: Arc<dyn StreamingProvider>,
    model: Arc<ModelDescriptor>,
}

impl StreamingAggregator {
    /// Creates an aggregator bound to one model.
    #[must_use]
    pub fn new(provider: Arc<dyn StreamingProvider>, model: Arc<ModelDescriptor>) -> Self {
        Self { provider, model }
    }

    /// Returns the bound model descriptor.
    #[must_use]
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    /// Opens a session for `request` and resolves to the concatenation of
    /// every text delta, in arrival order.
    ///
    /// If the request carries a chunk sink, it is called once per text delta
    /// before the next event is read. The resolved value is the same with or
    /// without a sink.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the session cannot be opened, the
    /// stream fails, or the sink fails. Text accumulated before the failure
    /// is discarded.
    pub async fn invoke(&self, request: InvocationRequest) -> Result<String, GenerationError> {
        let (context, mut sink) = request.into_parts();

        tracing::debug!(
            model = %self.model.id,
            api = %self.model.api,
            messages = context.messages.len(),
            streaming = sink.is_some(),
            "opening stream"
        );

        let events = self.provider.open_stream(&self.model, context).await?;
        let sink = sink.as_mut().map(|sink| sink.as_mut() as &mut dyn ChunkSink);
        let collected = collect(events, sink).await?;

        if let Some(usage) = collected.usage {
            tracing::debug!(
                model = %self.model.id,
                input_tokens = ?usage.input_tokens,
                output_tokens = ?usage.output_tokens,
                cost_usd = self.model.cost.estimate(&usage),
                stop_reason = ?collected.stop_reason,
                "stream complete"
            );
        }

        Ok(collected.text)
    }
}

impl core::fmt::Debug for StreamingAggregator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamingAggregator")
            .field("model", &self.model.id)
            .finish_non_exhaustive()
    }
}

/// Consumes `events` and resolves to the concatenation of every text delta.
///
/// Non-text events are dropped. The stream is read exactly once, front to
/// back; the first `Err` item (or sink failure) ends consumption and the
/// partial text is discarded.
///
/// # Errors
///
/// Returns the stream's error, or [`GenerationError::Sink`] if the sink fails.
pub async fn aggregate_text(
    events: EventStream,
    sink: Option<&mut dyn ChunkSink>,
) -> Result<String, GenerationError> {
    collect(events, sink).await.map(|collected| collected.text)
}

struct Collected {
    text: String,
    stop_reason: Option<StopReason>,
    usage: Option<Usage>,
}

async fn collect(
    mut events: EventStream,
    mut sink: Option<&mut dyn ChunkSink>,
) -> Result<Collected, GenerationError> {
    let mut collected = Collected {
        text: String::new(),
        stop_reason: None,
        usage: None,
    };

    while let Some(event) = events.next().await {
        match event? {
            StreamEvent::TextDelta(delta) => {
                if let Some(sink) = sink.as_mut() {
                    sink.on_chunk(&delta)?;
                }
                collected.text.push_str(&delta);
            }
            StreamEvent::Done { stop_reason, usage } => {
                collected.stop_reason = stop_reason;
                collected.usage = Some(usage);
            }
            other => tracing::trace!(kind = other.kind(), "ignoring event"),
        }
    }

    Ok(collected)
}
