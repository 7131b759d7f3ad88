//! Request plumbing shared by the HTTP backends.

use core::time::Duration;
use meridian_models::ModelDescriptor;
use meridian_models::llm::GenerationError;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use serde::Serialize;
use serde_json::{Map, Value};

/// Serializes the backend's default body and merges caller params on top.
///
/// Params are forwarded unmodified; a key present in both wins for the params.
pub(crate) fn request_body(
    defaults: &impl Serialize,
    params: Map<String, Value>,
) -> Result<Value, GenerationError> {
    let Value::Object(mut body) = serde_json::to_value(defaults)? else {
        return Err(GenerationError::InvalidRequest(
            "request body must serialize to an object".to_string(),
        ));
    };
    body.extend(params);
    Ok(Value::Object(body))
}

/// Adds the descriptor's extra headers to `headers`.
pub(crate) fn apply_descriptor_headers(
    headers: &mut HeaderMap,
    model: &ModelDescriptor,
) -> Result<(), GenerationError> {
    for (name, value) in &model.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            GenerationError::InvalidRequest(format!("invalid header name '{name}': {err}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|err| {
            GenerationError::InvalidRequest(format!("invalid value for header '{name}': {err}"))
        })?;
        headers.insert(name, value);
    }
    Ok(())
}

/// Posts a streaming request and returns the response once its status is known good.
pub(crate) async fn open(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &Value,
) -> Result<reqwest::Response, GenerationError> {
    let response = client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(|err| GenerationError::Http(err.to_string()))?;

    check_status(response).await
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response.text().await.unwrap_or_default();

    Err(convert_status(status, retry_after, body))
}

fn convert_status(status: StatusCode, retry_after: Option<Duration>, body: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited { retry_after },
        _ => GenerationError::Provider {
            status: Some(status.as_u16()),
            message: body,
            source: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Defaults {
        model: &'static str,
        max_tokens: u32,
    }

    #[test]
    fn params_override_defaults() {
        let defaults = Defaults {
            model: "m",
            max_tokens: 100,
        };
        let mut params = Map::new();
        params.insert("max_tokens".to_string(), json!(5));
        params.insert("temperature".to_string(), json!(0.2));

        let body = request_body(&defaults, params).unwrap();
        assert_eq!(
            body,
            json!({"model": "m", "max_tokens": 5, "temperature": 0.2})
        );
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            convert_status(StatusCode::UNAUTHORIZED, None, "bad key".to_string()),
            GenerationError::Auth(message) if message == "bad key"
        ));
        assert!(matches!(
            convert_status(StatusCode::FORBIDDEN, None, String::new()),
            GenerationError::Auth(_)
        ));
        assert!(matches!(
            convert_status(
                StatusCode::TOO_MANY_REQUESTS,
                Some(Duration::from_secs(3)),
                String::new()
            ),
            GenerationError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(3)
        ));
        assert!(matches!(
            convert_status(StatusCode::BAD_GATEWAY, None, "upstream".to_string()),
            GenerationError::Provider { status: Some(502), .. }
        ));
    }

    #[test]
    fn descriptor_headers_are_applied() {
        let mut model = meridian_models::testing::descriptor("m");
        model
            .headers
            .insert("x-trace".to_string(), "abc".to_string());
        let mut headers = HeaderMap::new();

        apply_descriptor_headers(&mut headers, &model).unwrap();
        assert_eq!(headers["x-trace"], "abc");

        model
            .headers
            .insert("bad header".to_string(), "v".to_string());
        assert!(matches!(
            apply_descriptor_headers(&mut headers, &model),
            Err(GenerationError::InvalidRequest(_))
        ));
    }
}
