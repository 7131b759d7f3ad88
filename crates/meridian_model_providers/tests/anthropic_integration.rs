//! Integration tests for the Anthropic backend.
//!
//! These tests are ignored by default because they require:
//! - `ANTHROPIC_API_KEY` environment variable (or in `.env` file)
//! - Network access to the Anthropic API
//! - May incur API costs
//!
//! To run these tests:
//! ```sh
//! cargo test -p meridian_model_providers --test anthropic_integration -- --ignored
//! ```

#![cfg(feature = "anthropic")]

mod common;

use common::{descriptor, generate_recording, init_env, small_model};
use meridian_model_providers::anthropic::{self, AnthropicProvider};
use meridian_models::TierModel;
use meridian_models::llm::{GenerationError, InvocationRequest};
use std::sync::Arc;

const MODEL: &str = "claude-haiku-4-5";

fn get_model(model_id: &str) -> TierModel {
    init_env();

    let provider =
        AnthropicProvider::from_env("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY should be set");
    small_model(
        Arc::new(provider),
        descriptor(model_id, anthropic::API, "https://api.anthropic.com"),
    )
}

#[tokio::test]
#[ignore = "requires ANTHROPIC_API_KEY"]
async fn test_basic_generation() {
    let text = get_model(MODEL)
        .generate(InvocationRequest::new("Say 'hello' and nothing else."))
        .await
        .expect("generation should succeed");

    assert!(
        text.to_lowercase().contains("hello"),
        "response should contain 'hello': {text}"
    );
}

#[tokio::test]
#[ignore = "requires ANTHROPIC_API_KEY"]
async fn test_streaming_matches_result() {
    let (result, chunks) = generate_recording(
        &get_model(MODEL),
        InvocationRequest::with_system(
            "You are a pirate. Always respond in pirate speak.",
            "Count from one to five.",
        ),
    )
    .await;

    let text = result.expect("generation should succeed");
    assert!(!chunks.is_empty(), "sink should receive chunks");
    assert_eq!(chunks.concat(), text);
}

#[tokio::test]
#[ignore = "requires ANTHROPIC_API_KEY"]
async fn test_invalid_model_error() {
    let result = get_model("not-a-real-model")
        .generate(InvocationRequest::new("Hello"))
        .await;

    assert!(
        matches!(result, Err(GenerationError::Provider { status: Some(404), .. })),
        "should fail with invalid model: {result:?}"
    );
}
