//! Invocation handlers stored in the model registry.

use crate::descriptor::ModelDescriptor;
use crate::llm::{GenerationError, InvocationRequest, StreamingAggregator};
use crate::tier::ModelTier;
use async_trait::async_trait;
use tracing::Instrument;

/// A handler the runtime invokes for a registered tier.
///
/// Streaming and batch calls share this one entry point: attach a
/// [`ChunkSink`](crate::llm::ChunkSink) to the request to receive deltas as
/// they arrive.
#[async_trait]
pub trait ModelHandler: Send + Sync + 'static {
    /// Runs one invocation and resolves to the full generated text.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the invocation fails; partial text is
    /// never returned.
    async fn invoke(&self, request: InvocationRequest) -> Result<String, GenerationError>;

    /// Returns the model descriptor backing this handler, if any.
    fn model(&self) -> Option<&ModelDescriptor> {
        None
    }
}

/// Handler bound to one tier and the descriptor registered for it.
#[derive(Debug, Clone)]
pub struct TierHandler {
    tier: ModelTier,
    aggregator: StreamingAggregator,
}

impl TierHandler {
    /// Creates a handler for `tier`.
    #[must_use]
    pub fn new(tier: ModelTier, aggregator: StreamingAggregator) -> Self {
        Self { tier, aggregator }
    }

    /// Returns the tier this handler serves.
    #[must_use]
    pub fn tier(&self) -> ModelTier {
        self.tier
    }
}

#[async_trait]
impl ModelHandler for TierHandler {
    async fn invoke(&self, request: InvocationRequest) -> Result<String, GenerationError> {
        let model = self.aggregator.model();
        let span = tracing::debug_span!(
            "invoke",
            tier = %self.tier,
            provider = %model.provider,
            model = %model.id,
        );

        self.aggregator
            .invoke(request)
            .instrument(span)
            .await
            .inspect_err(|err| tracing::warn!(tier = %self.tier, error = %err, "invocation failed"))
    }

    fn model(&self) -> Option<&ModelDescriptor> {
        Some(self.aggregator.model())
    }
}
