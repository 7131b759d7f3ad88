//! `OpenAI`-compatible provider backend.
//!
//! Streams from any server implementing the chat completions API and serves
//! descriptors whose `api` is [`API`] (`openai-completions`).
//!
//! ```no_run
//! use meridian_model_providers::openai::OpenAiProvider;
//!
//! let provider = OpenAiProvider::from_env("OPENAI_API_KEY")?;
//! # Ok::<(), meridian_models::error::ConfigurationError>(())
//! ```

mod provider;
mod types;

pub use provider::{API, OpenAiProvider};
