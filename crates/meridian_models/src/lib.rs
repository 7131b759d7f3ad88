//! Model tier registry and streaming aggregation for Meridian.
//!
//! Lets a runtime invoke text generation by abstract tier without knowing
//! which provider or streaming protocol backs it.
//!
//! # Overview
//!
//! - Tier-addressed: the runtime only sees [`ModelTier::Large`] and
//!   [`ModelTier::Small`]; the concrete [`ModelDescriptor`] is bound at
//!   registration.
//!
//! - One contract, two shapes: every handler resolves to the full generated
//!   text, and optionally streams each delta to a
//!   [`ChunkSink`](llm::ChunkSink) as it arrives.
//!
//! - Injected registry: registration goes through the [`ModelRegistrar`]
//!   trait, so any runtime registry (or test double) can receive handlers.
//!
//! # Example
//!
//! ```ignore
//! use meridian_models::{ModelRegistry, ModelTier, TierConfig, TierRegistrar};
//! use meridian_models::llm::{InvocationRequest, SinkError};
//!
//! let mut registry = ModelRegistry::new();
//! TierRegistrar::new(provider, TierConfig::from_path("tiers.toml")?).register(&mut registry)?;
//!
//! let small = registry.model(ModelTier::Small)?;
//! let text = small
//!     .generate_streaming(InvocationRequest::new("Hello!"), |chunk: &str| {
//!         print!("{chunk}");
//!         Ok::<_, SinkError>(())
//!     })
//!     .await?;
//! ```

pub mod error;
pub mod llm;
mod config;
mod descriptor;
mod handler;
mod registrar;
mod registry;
mod tier;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::TierConfig;
pub use descriptor::{InputModality, ModelCost, ModelDescriptor};
pub use handler::{ModelHandler, TierHandler};
pub use registrar::{PROVIDER_ID, TierRegistrar};
pub use registry::{ModelRegistrar, ModelRegistry, Registration, TierModel};
pub use tier::ModelTier;
