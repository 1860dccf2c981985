//! Response decoding.
//!
//! Success bodies are JSON unless the status is 204 or the content type is
//! not JSON; both of those yield `Value::Null`. Error bodies feed
//! [`ApiError::from_response`].

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http::error::{ApiError, ErrorKind};

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode the body of a successful response.
pub fn decode_success(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Value, ApiError> {
    if status == StatusCode::NO_CONTENT || !is_json(content_type) || body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| ApiError::decode(&e))
}

/// Parse an error body if it is JSON; anything else is ignored.
///
/// The content type is not consulted: some hosts label JSON errors as text/html.
pub fn decode_error_body(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body).ok()
}

/// Consume a response into its decoded body or its normalized error.
pub async fn read_response(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.bytes().await.map_err(|e| {
        ApiError::new(
            ErrorKind::Network { cold_start: false },
            format!("Failed to read response body: {e}"),
        )
        .with_status(status.as_u16())
    })?;

    if status.is_success() {
        decode_success(status, content_type.as_deref(), &body)
    } else {
        Err(ApiError::from_response(
            status,
            decode_error_body(&body),
        ))
    }
}

/// Convert a decoded body into a typed value.
pub fn into_typed<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::decode(&e))
}
