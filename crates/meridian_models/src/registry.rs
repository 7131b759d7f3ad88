//! Model tier registry.

use crate::error::CreateModelError;
use crate::handler::ModelHandler;
use crate::llm::{ChunkSink, GenerationError, InvocationRequest};
use crate::tier::ModelTier;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The runtime capability tier handlers are registered against.
///
/// Registration code receives this as an injected dependency instead of
/// reaching for global state, so any runtime (or a test double) can accept
/// the handlers.
pub trait ModelRegistrar {
    /// Binds `handler` to `tier` under `provider`.
    ///
    /// Registering a tier again replaces the previous binding.
    fn register(&mut self, tier: ModelTier, provider: &str, handler: Arc<dyn ModelHandler>);
}

/// A handler registered for a tier.
#[derive(Clone)]
pub struct Registration {
    /// Identifier of the provider that registered the handler.
    pub provider: String,
    /// The handler itself.
    pub handler: Arc<dyn ModelHandler>,
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("provider", &self.provider)
            .field("model", &self.handler.model().map(|model| &model.id))
            .finish()
    }
}

/// In-memory registry mapping tiers to handlers.
///
/// # For Consumers
///
/// Obtain a [`TierModel`] for a tier and call it:
///
/// ```ignore
/// let text = registry.model(ModelTier::Small)?.generate(InvocationRequest::new("Hi")).await?;
/// ```
///
/// # For Provider Authors
///
/// Registration happens through the [`ModelRegistrar`] trait, normally via
/// [`TierRegistrar`](crate::TierRegistrar), before any invocation occurs.
#[derive(Default)]
pub struct ModelRegistry {
    // Maps tiers to their current registration.
    registrations: BTreeMap<ModelTier, Registration>,
}

impl core::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("registrations", &self.registrations)
            .finish()
    }
}

impl ModelRegistrar for ModelRegistry {
    fn register(&mut self, tier: ModelTier, provider: &str, handler: Arc<dyn ModelHandler>) {
        let registration = Registration {
            provider: provider.to_string(),
            handler,
        };
        if let Some(previous) = self.registrations.insert(tier, registration) {
            tracing::debug!(
                %tier,
                previous_provider = %previous.provider,
                "replaced tier registration"
            );
        }
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: BTreeMap::new(),
        }
    }

    /// Creates a handle for invoking a tier.
    ///
    /// # Errors
    ///
    /// Returns [`CreateModelError::UnregisteredTier`] if nothing is registered
    /// for the tier.
    pub fn model(&self, tier: ModelTier) -> Result<TierModel, CreateModelError> {
        let handler = self
            .handler(tier)
            .ok_or(CreateModelError::UnregisteredTier(tier))?;
        Ok(TierModel { tier, handler })
    }

    /// Creates a handle from a tier name such as `"TEXT_LARGE"` or `"small"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a tier or the tier is unregistered.
    pub fn model_by_name(&self, name: impl AsRef<str>) -> Result<TierModel, CreateModelError> {
        self.model(name.as_ref().parse()?)
    }

    /// Returns the handler registered for a tier.
    #[must_use]
    pub fn handler(&self, tier: ModelTier) -> Option<Arc<dyn ModelHandler>> {
        self.registrations
            .get(&tier)
            .map(|registration| Arc::clone(&registration.handler))
    }

    /// Returns the registration for a tier.
    #[must_use]
    pub fn registration(&self, tier: ModelTier) -> Option<&Registration> {
        self.registrations.get(&tier)
    }

    /// Returns the provider identifier a tier was registered under.
    #[must_use]
    pub fn provider_of(&self, tier: ModelTier) -> Option<&str> {
        self.registrations
            .get(&tier)
            .map(|registration| registration.provider.as_str())
    }

    /// Lists registered tiers in order.
    #[must_use]
    pub fn registered_tiers(&self) -> Vec<ModelTier> {
        self.registrations.keys().copied().collect()
    }

    /// Returns the number of registered tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if no tier is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// A handle for invoking one registered tier.
///
/// Created via [`ModelRegistry::model()`].
#[derive(Clone)]
pub struct TierModel {
    tier: ModelTier,
    handler: Arc<dyn ModelHandler>,
}

impl TierModel {
    /// Runs the request and resolves to the full generated text.
    ///
    /// A chunk sink already attached to `request` is honoured.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the invocation fails.
    pub async fn generate(&self, request: InvocationRequest) -> Result<String, GenerationError> {
        self.handler.invoke(request).await
    }

    /// Runs the request, forwarding each text delta to `sink` as it arrives.
    ///
    /// Resolves to the same string [`generate`](Self::generate) would.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the invocation or the sink fails.
    pub async fn generate_streaming(
        &self,
        request: InvocationRequest,
        sink: impl ChunkSink + 'static,
    ) -> Result<String, GenerationError> {
        self.handler.invoke(request.chunk_sink(sink)).await
    }

    /// Returns the tier this handle invokes.
    #[must_use]
    pub fn tier(&self) -> ModelTier {
        self.tier
    }

    /// Returns the underlying handler.
    #[must_use]
    pub fn handler(&self) -> &Arc<dyn ModelHandler> {
        &self.handler
    }
}

impl core::fmt::Debug for TierModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TierModel")
            .field("tier", &self.tier)
            .field("model", &self.handler.model().map(|model| &model.id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo(&'static str);

    #[async_trait]
    impl ModelHandler for Echo {
        async fn invoke(&self, request: InvocationRequest) -> Result<String, GenerationError> {
            Ok(format!("{}:{}", self.0, request.prompt))
        }
    }

    #[test]
    fn empty_registry_has_no_tiers() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.model(ModelTier::Large),
            Err(CreateModelError::UnregisteredTier(ModelTier::Large))
        ));
    }

    #[test]
    fn re_registration_overwrites() {
        let mut registry = ModelRegistry::new();
        let first: Arc<dyn ModelHandler> = Arc::new(Echo("first"));
        let second: Arc<dyn ModelHandler> = Arc::new(Echo("second"));

        registry.register(ModelTier::Small, "a", Arc::clone(&first));
        registry.register(ModelTier::Small, "b", Arc::clone(&second));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.provider_of(ModelTier::Small), Some("b"));
        let current = registry.handler(ModelTier::Small).unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[tokio::test]
    async fn model_by_name_dispatches_to_handler() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelTier::Large, "test", Arc::new(Echo("large")));

        let model = registry.model_by_name("TEXT_LARGE").unwrap();
        assert_eq!(model.tier(), ModelTier::Large);

        let text = model.generate(InvocationRequest::new("hi")).await.unwrap();
        assert_eq!(text, "large:hi");
    }

    #[test]
    fn model_by_name_rejects_unknown_tier() {
        let registry = ModelRegistry::new();
        assert!(matches!(
            registry.model_by_name("TEXT_MEDIUM"),
            Err(CreateModelError::InvalidTier(_))
        ));
    }
}
