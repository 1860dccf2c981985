//! Bearer credential types.

use serde::{Deserialize, Serialize};

/// The persisted access/refresh token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived bearer credential.
    pub access: String,
    /// Longer-lived credential exchanged for a new access token.
    pub refresh: String,
}

impl AuthTokens {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }

    /// Apply a refresh response. The refresh token is kept unless the server rotated it.
    pub fn refreshed(&self, response: RefreshResponse) -> Self {
        Self {
            access: response.access,
            refresh: response.refresh.unwrap_or_else(|| self.refresh.clone()),
        }
    }
}

// Tokens must never end up in logs.
impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Body sent to the token refresh endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Body returned by the token refresh endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}
