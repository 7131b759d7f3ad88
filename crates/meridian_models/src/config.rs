//! Tier configuration loading.

use crate::descriptor::ModelDescriptor;
use crate::error::ConfigurationError;
use crate::tier::ModelTier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One model descriptor per tier.
///
/// Loaded from TOML or JSON:
///
/// ```
/// use meridian_models::TierConfig;
///
/// let config = TierConfig::from_toml_str(r#"
///     [large]
///     id = "claude-sonnet-4-5"
///     name = "Claude Sonnet 4.5"
///     api = "anthropic-messages"
///     provider = "anthropic"
///     baseUrl = "https://api.anthropic.com"
///     contextWindow = 200000
///     maxTokens = 64000
///
///     [small]
///     id = "claude-haiku-4-5"
///     name = "Claude Haiku 4.5"
///     api = "anthropic-messages"
///     provider = "anthropic"
///     baseUrl = "https://api.anthropic.com"
///     contextWindow = 200000
///     maxTokens = 8192
/// "#).unwrap();
///
/// assert_eq!(config.small.id, "claude-haiku-4-5");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    /// Model backing [`ModelTier::Large`].
    pub large: ModelDescriptor,
    /// Model backing [`ModelTier::Small`].
    pub small: ModelDescriptor,
}

impl TierConfig {
    /// Creates a configuration from two descriptors.
    #[must_use]
    pub fn new(large: ModelDescriptor, small: ModelDescriptor) -> Self {
        Self { large, small }
    }

    /// Returns the descriptor bound to `tier`.
    #[must_use]
    pub fn descriptor(&self, tier: ModelTier) -> &ModelDescriptor {
        match tier {
            ModelTier::Large => &self.large,
            ModelTier::Small => &self.small,
        }
    }

    /// Validates both descriptors.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigurationError`] found, checking the large tier
    /// first.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        ModelTier::ALL
            .into_iter()
            .try_for_each(|tier| self.descriptor(tier).validate(tier))
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the document is malformed.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(input).map_err(|err| ConfigurationError::Parse(err.to_string()))
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] if the document is malformed.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(input).map_err(|err| ConfigurationError::Parse(err.to_string()))
    }

    /// Reads a configuration file, choosing the format by extension
    /// (`.json`, otherwise TOML).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        }
    }
}
