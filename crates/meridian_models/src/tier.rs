//! Abstract model tiers addressed by the runtime.

use crate::error::CreateModelError;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One of the two model-size classes a runtime addresses models by.
///
/// The registry only ever sees a tier; which concrete model backs it is
/// decided when the tiers are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Larger, more capable model.
    Large,
    /// Smaller, faster model.
    Small,
}

impl ModelTier {
    /// Every tier, in registration order.
    pub const ALL: [ModelTier; 2] = [ModelTier::Large, ModelTier::Small];

    /// Returns the runtime model-type name for this tier (e.g. `TEXT_LARGE`).
    #[must_use]
    pub const fn model_type(self) -> &'static str {
        match self {
            Self::Large => "TEXT_LARGE",
            Self::Small => "TEXT_SMALL",
        }
    }

    /// Returns the lowercase short name used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Small => "small",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_type())
    }
}

impl FromStr for ModelTier {
    type Err = CreateModelError;

    /// Accepts either the model-type name (`TEXT_LARGE`) or the short name
    /// (`large`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| {
                trimmed.eq_ignore_ascii_case(tier.model_type())
                    || trimmed.eq_ignore_ascii_case(tier.as_str())
            })
            .ok_or_else(|| CreateModelError::InvalidTier(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_model_type_name() {
        assert_eq!(ModelTier::Large.to_string(), "TEXT_LARGE");
        assert_eq!(ModelTier::Small.to_string(), "TEXT_SMALL");
    }

    #[test]
    fn parses_short_and_model_type_names() {
        assert_eq!("large".parse::<ModelTier>().unwrap(), ModelTier::Large);
        assert_eq!("SMALL".parse::<ModelTier>().unwrap(), ModelTier::Small);
        assert_eq!("text_large".parse::<ModelTier>().unwrap(), ModelTier::Large);
        assert_eq!(" TEXT_SMALL ".parse::<ModelTier>().unwrap(), ModelTier::Small);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "medium".parse::<ModelTier>().unwrap_err();
        assert!(matches!(err, CreateModelError::InvalidTier(name) if name == "medium"));
    }
}
