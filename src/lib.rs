//! Tier-addressed text generation over streaming model providers.
//!
//! A runtime registers a LARGE and a SMALL model once, then invokes either
//! tier by name. Each invocation opens a provider stream, forwards text
//! deltas to an optional sink as they arrive, and resolves to the full text.
//!
//! ```no_run
//! use meridian::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! TracingConfig::default().init();
//!
//! let mut registry = ModelRegistry::new();
//! TierRegistrar::new(
//!     Arc::new(ProtocolRouter::from_env()?),
//!     TierConfig::from_path("tiers.toml")?,
//! )
//! .register(&mut registry)?;
//!
//! let text = registry
//!     .model(ModelTier::Small)?
//!     .generate_streaming(InvocationRequest::new("Hello!"), |chunk: &str| {
//!         print!("{chunk}");
//!         Ok::<_, SinkError>(())
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use meridian_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use meridian_internal::prelude::*;
}
