//! Anthropic provider backend.
//!
//! Streams from the Anthropic Messages API and serves descriptors whose
//! `api` is [`API`] (`anthropic-messages`).
//!
//! ```no_run
//! use meridian_model_providers::anthropic::AnthropicProvider;
//!
//! let provider = AnthropicProvider::from_env("ANTHROPIC_API_KEY")?;
//! # Ok::<(), meridian_models::error::ConfigurationError>(())
//! ```

mod client;
mod provider;
mod types;

pub use provider::{API, AnthropicProvider};
