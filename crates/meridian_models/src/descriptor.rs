//! Concrete model metadata bound to a tier.

use crate::error::ConfigurationError;
use crate::llm::Usage;
use crate::tier::ModelTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable record identifying one concrete model.
///
/// Descriptors are supplied once when tiers are registered and are captured
/// by the registered handlers for the lifetime of the runtime.
///
/// Field names follow the camelCase model catalog format:
///
/// ```
/// use meridian_models::ModelDescriptor;
///
/// let descriptor: ModelDescriptor = serde_json::from_str(r#"{
///     "id": "claude-sonnet-4-5",
///     "name": "Claude Sonnet 4.5",
///     "api": "anthropic-messages",
///     "provider": "anthropic",
///     "baseUrl": "https://api.anthropic.com",
///     "reasoning": true,
///     "input": ["text", "image"],
///     "cost": { "input": 3.0, "output": 15.0, "cacheRead": 0.3, "cacheWrite": 3.75 },
///     "contextWindow": 200000,
///     "maxTokens": 64000
/// }"#).unwrap();
///
/// assert_eq!(descriptor.context_window, 200_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Provider-side model identifier sent on the wire.
    pub id: String,
    /// Human readable display name.
    pub name: String,
    /// Streaming protocol family (e.g. `anthropic-messages`).
    pub api: String,
    /// Owning provider (e.g. `anthropic`).
    pub provider: String,
    /// Base endpoint the protocol paths are appended to.
    pub base_url: String,
    /// Whether the model supports extended reasoning.
    #[serde(default)]
    pub reasoning: bool,
    /// Accepted input modalities.
    #[serde(default = "default_input")]
    pub input: Vec<InputModality>,
    /// Per-token pricing.
    #[serde(default)]
    pub cost: ModelCost,
    /// Context window size in tokens.
    pub context_window: u32,
    /// Maximum output tokens per call.
    pub max_tokens: u32,
    /// Extra HTTP headers sent with every request to this model.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

fn default_input() -> Vec<InputModality> {
    vec![InputModality::Text]
}

impl ModelDescriptor {
    /// Checks that identity, endpoint and limits are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingField`] for empty or zero required
    /// fields and [`ConfigurationError::InvalidField`] for values that are
    /// present but unusable.
    pub fn validate(&self, tier: ModelTier) -> Result<(), ConfigurationError> {
        let required = [
            ("id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("api", self.api.as_str()),
            ("provider", self.provider.as_str()),
            ("baseUrl", self.base_url.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ConfigurationError::MissingField { tier, field });
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigurationError::InvalidField {
                tier,
                field: "baseUrl",
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }

        if self.context_window == 0 {
            return Err(ConfigurationError::MissingField {
                tier,
                field: "contextWindow",
            });
        }
        if self.max_tokens == 0 {
            return Err(ConfigurationError::MissingField {
                tier,
                field: "maxTokens",
            });
        }
        if self.max_tokens > self.context_window {
            return Err(ConfigurationError::InvalidField {
                tier,
                field: "maxTokens",
                reason: format!(
                    "{} exceeds the context window of {}",
                    self.max_tokens, self.context_window
                ),
            });
        }

        Ok(())
    }

    /// Returns `true` if the model accepts the given input modality.
    #[must_use]
    pub fn accepts(&self, modality: InputModality) -> bool {
        self.input.contains(&modality)
    }

    /// Returns the base URL without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Input modality a model accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModality {
    /// Plain text.
    Text,
    /// Images.
    Image,
    /// Any modality this crate does not interpret.
    #[serde(other)]
    Other,
}

/// Model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCost {
    /// Input token price.
    #[serde(default)]
    pub input: f64,
    /// Output token price.
    #[serde(default)]
    pub output: f64,
    /// Cached input read price.
    #[serde(default)]
    pub cache_read: f64,
    /// Cache write price.
    #[serde(default)]
    pub cache_write: f64,
}

impl ModelCost {
    /// Estimates the USD cost of a finished call.
    #[must_use]
    pub fn estimate(&self, usage: &Usage) -> f64 {
        const PER_MILLION: f64 = 1_000_000.0;

        let tokens = |count: Option<u64>| count.unwrap_or_default() as f64;
        (self.input * tokens(usage.input_tokens)
            + self.output * tokens(usage.output_tokens)
            + self.cache_read * tokens(usage.cache_read_tokens)
            + self.cache_write * tokens(usage.cache_write_tokens))
            / PER_MILLION
    }
}
