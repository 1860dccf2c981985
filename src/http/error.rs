//! The single normalized error every API call fails with.
//!
//! # Classification
//! - transport failure after retries → `Network` (cold start when it timed out)
//! - 400 → `Validation` (per-field messages in `details`)
//! - 401/403 → `Auth`; a failed token refresh → `SessionExpired`
//! - 404 → `NotFound`
//! - anything else → `Server`
//!
//! Callers branch on the `is_*` flags, never on transport types.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::session::store::StoreError;

/// What kind of failure an [`ApiError`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No HTTP response was received.
    Network { cold_start: bool },
    /// The server rejected the credentials or the caller's permissions.
    Auth,
    /// The refresh token was rejected; the user must sign in again.
    SessionExpired,
    /// The request body failed validation.
    Validation,
    /// The addressed resource does not exist.
    NotFound,
    /// Any other error status.
    Server,
    /// A successful response whose body did not match the expected shape.
    Decode,
    /// Reading or writing persisted tokens failed.
    Storage,
}

/// Normalized failure of one logical API call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    details: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Transport failure that survived every retry.
    pub fn network(source: &reqwest::Error, attempts: u32) -> Self {
        let cold_start = source.is_timeout() || source.is_connect();
        let message = if cold_start {
            format!(
                "The server is not responding after {attempts} attempt(s); it may still be starting up. Please try again."
            )
        } else {
            format!("Network error after {attempts} attempt(s): {source}")
        };
        Self::new(ErrorKind::Network { cold_start }, message)
    }

    pub fn session_expired() -> Self {
        Self::new(
            ErrorKind::SessionExpired,
            "Your session has expired. Please sign in again.",
        )
        .with_status(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// Local validation failure for a single field, raised before any request is sent.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut details = serde_json::Map::new();
        details.insert(field.to_string(), Value::Array(vec![Value::String(message.clone())]));
        Self::new(ErrorKind::Validation, message).with_details(Value::Object(details))
    }

    pub fn decode(err: &serde_json::Error) -> Self {
        Self::new(ErrorKind::Decode, format!("Unexpected response from server: {err}"))
    }

    /// Build the error for a non-success status from its (possibly empty) body.
    pub fn from_response(status: StatusCode, body: Option<Value>) -> Self {
        let kind = match status {
            StatusCode::BAD_REQUEST => ErrorKind::Validation,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorKind::Auth,
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            _ => ErrorKind::Server,
        };

        let fallback = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        let (message, details) = match body {
            Some(body) => extract_message(&body)
                .map(|message| (message, field_details(&body)))
                .unwrap_or((fallback, None)),
            None => (fallback, None),
        };

        let mut error = Self::new(kind, message).with_status(status.as_u16());
        error.details = details;
        error
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::Network { .. })
    }

    pub fn is_cold_start(&self) -> bool {
        matches!(self.kind, ErrorKind::Network { cold_start: true })
    }

    /// True for rejected credentials and for expired sessions.
    pub fn is_auth(&self) -> bool {
        matches!(self.kind, ErrorKind::Auth | ErrorKind::SessionExpired)
    }

    pub fn is_session_expired(&self) -> bool {
        self.kind == ErrorKind::SessionExpired
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    pub fn is_server(&self) -> bool {
        self.kind == ErrorKind::Server
    }

    /// First message for every field in the structured details.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let Some(Value::Object(fields)) = &self.details else {
            return BTreeMap::new();
        };

        fields
            .iter()
            .filter_map(|(field, value)| first_message(value).map(|m| (field.clone(), m)))
            .collect()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::new(ErrorKind::Storage, err.to_string())
    }
}

/// Pull a human-readable message out of the server's error body shapes:
/// `{"detail": ..}`, `{"message": ..}`, `{"error": "..."}`, `{"error": {field: [..]}}`,
/// `{"error": "...", "details": {field: [..]}}` or a bare field map.
fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => {
            for key in ["detail", "message", "error"] {
                if let Some(Value::String(s)) = map.get(key) {
                    return Some(s.clone());
                }
            }
            field_details(body).and_then(|fields| first_field_message(&fields))
        }
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}

fn field_details(body: &Value) -> Option<Value> {
    let Value::Object(map) = body else {
        return None;
    };

    for key in ["details", "error", "errors"] {
        if let Some(nested @ Value::Object(_)) = map.get(key) {
            return Some(nested.clone());
        }
    }

    // A bare DRF serializer error map: every value is a message or a list of them.
    let is_field_map = !map.is_empty()
        && !map.contains_key("detail")
        && map
            .values()
            .all(|v| matches!(v, Value::Array(_) | Value::String(_)));
    is_field_map.then(|| body.clone())
}

fn first_field_message(fields: &Value) -> Option<String> {
    let Value::Object(map) = fields else {
        return None;
    };
    // Errors not tied to a field read better first.
    if let Some(message) = map.get("non_field_errors").and_then(first_message) {
        return Some(message);
    }
    map.values().find_map(first_message)
}

fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        _ => None,
    }
}
