//! Anthropic API client.

use crate::http;
use meridian_models::ModelDescriptor;
use meridian_models::llm::GenerationError;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

/// Messages API version sent with every request.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// HTTP client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    /// Creates a new client.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), api_key)
    }

    /// Creates a client over an existing connection pool.
    pub fn with_http_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    /// Opens a streaming message request against the model's endpoint.
    pub async fn stream_message(
        &self,
        model: &ModelDescriptor,
        body: &Value,
    ) -> Result<reqwest::Response, GenerationError> {
        let url = format!("{}/v1/messages", model.endpoint());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(
            "X-Api-Key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|err| GenerationError::Auth(format!("Invalid API key header: {err}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        http::apply_descriptor_headers(&mut headers, model)?;

        http::open(&self.client, &url, headers, body).await
    }
}

impl core::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
