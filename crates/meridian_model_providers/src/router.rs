//! Dispatch by streaming protocol family.

use async_trait::async_trait;
use meridian_models::ModelDescriptor;
use meridian_models::error::ConfigurationError;
use meridian_models::llm::{EventStream, GenerationError, StreamContext, StreamingProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// A [`StreamingProvider`] that forwards each session to the backend
/// registered for the descriptor's `api` tag.
///
/// ```no_run
/// # #[cfg(feature = "anthropic")]
/// # {
/// use meridian_model_providers::ProtocolRouter;
/// use meridian_model_providers::anthropic::{self, AnthropicProvider};
/// use std::sync::Arc;
///
/// let mut router = ProtocolRouter::new();
/// router.register(anthropic::API, Arc::new(AnthropicProvider::new("sk-...")));
/// # }
/// ```
#[derive(Default, Clone)]
pub struct ProtocolRouter {
    backends: HashMap<String, Arc<dyn StreamingProvider>>,
}

impl ProtocolRouter {
    /// Creates a router with no backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with every compiled-in backend whose API key is set.
    ///
    /// | Backend | Variable |
    /// |---------|----------|
    /// | `anthropic-messages` | `ANTHROPIC_API_KEY` |
    /// | `openai-completions` | `OPENAI_API_KEY` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingEnv`] if none of the variables
    /// are set.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let mut router = Self::new();
        let mut expected: Vec<&str> = Vec::new();

        #[cfg(feature = "anthropic")]
        {
            expected.push("ANTHROPIC_API_KEY");
            if let Ok(provider) = crate::anthropic::AnthropicProvider::from_env("ANTHROPIC_API_KEY")
            {
                router.register(crate::anthropic::API, Arc::new(provider));
            }
        }

        #[cfg(feature = "openai")]
        {
            expected.push("OPENAI_API_KEY");
            if let Ok(provider) = crate::openai::OpenAiProvider::from_env("OPENAI_API_KEY") {
                router.register(crate::openai::API, Arc::new(provider));
            }
        }

        if router.backends.is_empty() {
            return Err(ConfigurationError::MissingEnv(expected.join(" or ")));
        }
        Ok(router)
    }

    /// Registers a backend for a protocol family.
    ///
    /// # Panics
    ///
    /// Panics if a backend is already registered for `api`.
    pub fn register(&mut self, api: impl Into<String>, backend: Arc<dyn StreamingProvider>) {
        let api = api.into();
        assert!(
            !self.backends.contains_key(&api),
            "Backend for api '{api}' is already registered"
        );
        tracing::debug!(%api, "registered streaming backend");
        self.backends.insert(api, backend);
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_backend(
        mut self,
        api: impl Into<String>,
        backend: Arc<dyn StreamingProvider>,
    ) -> Self {
        self.register(api, backend);
        self
    }

    /// Returns `true` if a backend serves `api`.
    #[must_use]
    pub fn supports(&self, api: &str) -> bool {
        self.backends.contains_key(api)
    }

    /// Returns the registered protocol tags, sorted.
    #[must_use]
    pub fn apis(&self) -> Vec<&str> {
        let mut apis: Vec<&str> = self.backends.keys().map(String::as_str).collect();
        apis.sort_unstable();
        apis
    }
}

impl core::fmt::Debug for ProtocolRouter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProtocolRouter")
            .field("apis", &self.apis())
            .finish()
    }
}

#[async_trait]
impl StreamingProvider for ProtocolRouter {
    async fn open_stream(
        &self,
        model: &ModelDescriptor,
        context: StreamContext,
    ) -> Result<EventStream, GenerationError> {
        let Some(backend) = self.backends.get(&model.api) else {
            return Err(GenerationError::UnsupportedApi(model.api.clone()));
        };
        backend.open_stream(model, context).await
    }
}
