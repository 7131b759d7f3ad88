//! # Meridian Internal Library
//!
//! Re-exports the core Meridian crates for convenience.

/// Tier registry, invocation requests and streaming aggregation.
pub use meridian_models;

/// Streaming protocol backends.
pub use meridian_model_providers;

/// Tracing subscriber configuration.
pub use meridian_telemetry;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use meridian_model_providers::ProtocolRouter;
    #[cfg(feature = "openai")]
    pub use meridian_model_providers::OpenAiProvider;
    pub use meridian_model_providers::AnthropicProvider;
    pub use meridian_models::error::{ConfigurationError, CreateModelError};
    pub use meridian_models::llm::{
        ChunkSink, GenerationError, InvocationRequest, SinkError, StreamEvent, StreamingProvider,
    };
    pub use meridian_models::{
        ModelDescriptor, ModelHandler, ModelRegistrar, ModelRegistry, ModelTier, PROVIDER_ID,
        TierConfig, TierModel, TierRegistrar,
    };
    pub use meridian_telemetry::{TracingConfig, TracingFormat};
}
