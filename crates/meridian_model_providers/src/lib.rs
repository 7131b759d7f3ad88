//! Streaming provider backends for Meridian.
//!
//! Each backend implements [`StreamingProvider`](meridian_models::llm::StreamingProvider)
//! for one streaming protocol family, identified by the `api` tag of a
//! [`ModelDescriptor`](meridian_models::ModelDescriptor). A [`ProtocolRouter`]
//! combines them so a single provider can back both model tiers even when
//! they speak different protocols.
//!
//! # Supported Protocols
//!
//! | Protocol | `api` tag | Feature Flag |
//! |----------|-----------|--------------|
//! | Anthropic Messages | `anthropic-messages` | `anthropic` (default) |
//! | `OpenAI`-compatible chat completions | `openai-completions` | `openai` |
//!
//! # Feature Flags
//!
//! ```toml
//! # Anthropic only (default)
//! meridian_model_providers = { path = "../meridian_model_providers" }
//!
//! # Both protocols
//! meridian_model_providers = { path = "../meridian_model_providers", features = ["openai"] }
//! ```
//!
//! # Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use meridian_model_providers::ProtocolRouter;
//! use meridian_models::{ModelRegistry, TierConfig, TierRegistrar};
//! use std::sync::Arc;
//!
//! let router = ProtocolRouter::from_env()?;
//! let mut registry = ModelRegistry::new();
//! TierRegistrar::new(Arc::new(router), TierConfig::from_path("tiers.toml")?)
//!     .register(&mut registry)?;
//! # Ok(())
//! # }
//! ```

mod http;
mod router;
pub mod sse;

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicProvider;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiProvider;

pub use router::ProtocolRouter;
