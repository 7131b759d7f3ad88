//! Error types for the model registry and tier configuration.

use crate::tier::ModelTier;

/// Error creating a model handle.
#[derive(Debug, thiserror::Error)]
pub enum CreateModelError {
    /// The string does not name a known tier.
    #[error("invalid model tier '{0}': expected 'large', 'small', 'TEXT_LARGE' or 'TEXT_SMALL'")]
    InvalidTier(String),

    /// No handler has been registered for the tier.
    #[error("no handler registered for {0}")]
    UnregisteredTier(ModelTier),
}

/// Error raised while loading or registering tier configuration.
///
/// Registration is all-or-nothing: when this error is returned, no tier has
/// been registered.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A required descriptor field is empty or zero.
    #[error("{tier} model descriptor is missing required field '{field}'")]
    MissingField {
        /// Tier whose descriptor is malformed.
        tier: ModelTier,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A descriptor field is present but unusable.
    #[error("{tier} model descriptor has invalid '{field}': {reason}")]
    InvalidField {
        /// Tier whose descriptor is malformed.
        tier: ModelTier,
        /// Name of the invalid field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration document could not be parsed.
    #[error("failed to parse tier configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("failed to read tier configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
}
