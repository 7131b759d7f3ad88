//! Binds the large and small tiers to concrete models.

use crate::config::TierConfig;
use crate::error::ConfigurationError;
use crate::handler::TierHandler;
use crate::llm::{StreamingAggregator, StreamingProvider};
use crate::registry::ModelRegistrar;
use crate::tier::ModelTier;
use std::sync::Arc;

/// Provider identifier every tier handler is registered under.
pub const PROVIDER_ID: &str = "meridian";

/// Registers one streaming handler per tier with a runtime registry.
///
/// Each handler closes over its own [`ModelDescriptor`](crate::ModelDescriptor)
/// and shares the provider backend used to open sessions.
///
/// ```ignore
/// let registrar = TierRegistrar::new(Arc::new(router), TierConfig::from_path("tiers.toml")?);
/// let mut registry = ModelRegistry::new();
/// registrar.register(&mut registry)?;
/// ```
#[derive(Clone)]
pub struct TierRegistrar {
    provider: Arc<dyn StreamingProvider>,
    config: TierConfig,
}

impl TierRegistrar {
    /// Creates a registrar for the given backend and tier configuration.
    #[must_use]
    pub fn new(provider: Arc<dyn StreamingProvider>, config: TierConfig) -> Self {
        Self { provider, config }
    }

    /// Returns the tier configuration.
    #[must_use]
    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    /// Validates both descriptors, then registers a handler for each tier
    /// under [`PROVIDER_ID`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if either descriptor is malformed. In
    /// that case the registry is left untouched.
    pub fn register(&self, registry: &mut dyn ModelRegistrar) -> Result<(), ConfigurationError> {
        self.config.validate()?;

        for tier in ModelTier::ALL {
            let model = Arc::new(self.config.descriptor(tier).clone());
            let aggregator = StreamingAggregator::new(Arc::clone(&self.provider), model);
            registry.register(
                tier,
                PROVIDER_ID,
                Arc::new(TierHandler::new(tier, aggregator)),
            );
        }

        tracing::info!(
            provider = PROVIDER_ID,
            large = %self.config.large.id,
            small = %self.config.small.id,
            "registered model tiers"
        );
        Ok(())
    }
}

impl core::fmt::Debug for TierRegistrar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TierRegistrar")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
