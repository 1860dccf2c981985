//! Authenticated request pipeline.
//!
//! # Responsibilities
//! - Attach the stored access token as a bearer credential
//! - Retry transport failures with backoff (cold-starting host)
//! - Refresh the access token on 401, single-flight, and retry once
//! - Expire the session when the refresh token is rejected
//! - Normalize every failure into an [`ApiError`]
//!
//! # Request Flow
//! ```text
//! request(method, path, body)
//!     → load tokens from the TokenStore
//!     → send with retries (transport errors only)
//!     → 401 + refresh token?
//!         → RefreshCoordinator::enter
//!             Current  → retry with the stored token
//!             Waiter   → await leader's outcome, retry (re-enter if the leader was cancelled)
//!             Leader   → POST /auth/token/refresh/, persist, release waiters, retry
//!             SignedOut → tokens were cleared meanwhile, fail with SessionExpired
//!         → refresh failed: clear tokens, publish Expired, fail with SessionExpired
//!     → decode body or normalize error status
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use url::Url;

use crate::config::ClientConfig;
use crate::http::error::{ApiError, ErrorKind};
use crate::http::response::{into_typed, read_response};
use crate::observability::metrics;
use crate::resilience::{is_retryable, with_retries, RetryFailure, RetryPolicy};
use crate::session::events::{SessionEvent, SessionEvents};
use crate::session::refresh::{RefreshCoordinator, RefreshOutcome, Ticket};
use crate::session::store::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::session::tokens::{AuthTokens, RefreshRequest, RefreshResponse};

/// Path of the token refresh endpoint, relative to the base URL.
pub const REFRESH_PATH: &str = "/auth/token/refresh/";

/// Errors raised while constructing an [`ApiClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

struct Inner {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    retry: RetryPolicy,
    refresh: RefreshCoordinator,
    events: SessionEvents,
}

/// Client for the platform's REST API. Cheap to clone; clones share tokens,
/// the refresh coordinator and the event channel.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    store: Option<Arc<dyn TokenStore>>,
    retry: RetryPolicy,
    connect_timeout: Duration,
    request_timeout: Duration,
    no_proxy: bool,
}

impl ApiClientBuilder {
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Ignore proxy settings from the environment.
    pub fn no_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    pub fn build(self) -> Result<ApiClient, BuildError> {
        let parsed = Url::parse(&self.base_url).map_err(|e| BuildError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(BuildError::InvalidBaseUrl {
                url: self.base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut http = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(concat!("startup-platform/", env!("CARGO_PKG_VERSION")));
        if self.no_proxy {
            http = http.no_proxy();
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http: http.build()?,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                store,
                retry: self.retry,
                refresh: RefreshCoordinator::new(),
                events: SessionEvents::new(),
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            store: None,
            retry: RetryPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            no_proxy: false,
        }
    }

    /// Build a client from validated configuration. Tokens live in
    /// `session.token_file` when set, in memory otherwise.
    pub fn from_config(config: &ClientConfig) -> Result<Self, BuildError> {
        let store: Arc<dyn TokenStore> = match &config.session.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path)),
            None => Arc::new(MemoryTokenStore::new()),
        };

        Self::builder(config.api.base_url.clone())
            .token_store(store)
            .retry_policy(RetryPolicy::from_config(&config.retries))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .request_timeout(Duration::from_secs(config.timeouts.request_secs))
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Absolute URL for `path`. Absolute URLs (pagination links) pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn tokens(&self) -> Result<Option<AuthTokens>, ApiError> {
        Ok(self.inner.store.load()?)
    }

    pub fn set_tokens(&self, tokens: &AuthTokens) -> Result<(), ApiError> {
        Ok(self.inner.store.save(tokens)?)
    }

    pub fn clear_tokens(&self) -> Result<(), ApiError> {
        Ok(self.inner.store.clear()?)
    }

    /// True while a token refresh exchange is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Perform one authenticated API call.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.execute(method, path, body, true).await
    }

    /// Perform an API call without credentials and without refresh handling.
    pub async fn request_anonymous(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.execute(method, path, body, false).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        into_typed(self.request(Method::GET, path, None).await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        into_typed(self.request(Method::POST, path, Some(&body)).await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        into_typed(self.request(Method::PUT, path, Some(&body)).await?)
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        into_typed(self.request(Method::PATCH, path, Some(&body)).await?)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        into_typed(self.request(Method::DELETE, path, None).await?)
    }

    pub async fn get_anonymous<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        into_typed(self.request_anonymous(Method::GET, path, None).await?)
    }

    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = encode(body)?;
        into_typed(self.request_anonymous(Method::POST, path, Some(&body)).await?)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        let tokens = if authenticated {
            self.inner.store.load()?
        } else {
            None
        };
        let access = tokens.as_ref().map(|t| t.access.as_str());

        let response = self.send(&method, &url, body, access).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(tokens) = &tokens {
                tracing::debug!(method = %method, path, "Access token rejected");
                let access = self.refreshed_access(tokens).await?;
                let retried = self.send(&method, &url, body, Some(&access)).await?;
                return self.finish(&method, path, retried).await;
            }
        }

        self.finish(&method, path, response).await
    }

    /// Send one request, retrying transport failures per the retry policy.
    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let result = with_retries(
            &self.inner.retry,
            |attempt| {
                tracing::debug!(method = %method, url, attempt, "Sending request");
                let mut request = self.inner.http.request(method.clone(), url);
                if let Some(token) = bearer {
                    request = request.bearer_auth(token);
                }
                if let Some(body) = body {
                    request = request.json(body);
                }
                request.send()
            },
            |e| is_retryable(method, e),
        )
        .await;

        result.map_err(|RetryFailure { error, attempts }| {
            tracing::warn!(method = %method, url, attempts, error = %error, "Request failed");
            metrics::record_request(method.as_str(), 0);
            ApiError::network(&error, attempts)
        })
    }

    async fn finish(&self, method: &Method, path: &str, response: Response) -> Result<Value, ApiError> {
        let status = response.status();
        metrics::record_request(method.as_str(), status.as_u16());
        tracing::debug!(method = %method, path, status = status.as_u16(), "Response received");
        read_response(response).await
    }

    /// Obtain a fresh access token after `tokens.access` was rejected.
    async fn refreshed_access(&self, tokens: &AuthTokens) -> Result<String, ApiError> {
        let store = &self.inner.store;
        let current = || match store.load() {
            Ok(current) => current.map(|t| t.access),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored tokens");
                None
            }
        };

        let guard = loop {
            match self.inner.refresh.enter(&tokens.access, &current) {
                Ticket::Current(access) => return Ok(access),
                Ticket::SignedOut => return Err(ApiError::session_expired()),
                Ticket::Leader(guard) => break guard,
                Ticket::Waiter(waiter) => match waiter.outcome().await {
                    RefreshOutcome::Refreshed(access) => return Ok(access),
                    RefreshOutcome::Failed => return Err(ApiError::session_expired()),
                    RefreshOutcome::Abandoned => {
                        tracing::debug!("Refresh leader went away, re-entering");
                    }
                },
            }
        };

        match self.exchange_refresh(tokens).await {
            Ok(refreshed) => {
                metrics::record_token_refresh(true);
                // Persist before releasing waiters so later 401s see the new token.
                if let Err(e) = store.save(&refreshed) {
                    tracing::warn!(error = %e, "Failed to persist refreshed tokens");
                }
                let released = guard.finish(Some(refreshed.access.clone()));
                tracing::info!(waiters = released, "Access token refreshed");
                Ok(refreshed.access)
            }
            Err(e) => {
                metrics::record_token_refresh(false);
                tracing::warn!(error = %e, "Token refresh failed, ending session");
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "Failed to clear stored tokens");
                }
                self.inner.events.publish(SessionEvent::Expired);
                guard.finish(None);
                Err(ApiError::session_expired())
            }
        }
    }

    async fn exchange_refresh(&self, tokens: &AuthTokens) -> Result<AuthTokens, ApiError> {
        let body = encode(&RefreshRequest {
            refresh: &tokens.refresh,
        })?;
        let url = self.url(REFRESH_PATH);
        let response = self.send(&Method::POST, &url, Some(&body), None).await?;
        let value = read_response(response).await?;
        let refreshed: RefreshResponse = into_typed(value)?;
        Ok(tokens.refreshed(refreshed))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("retry", &self.inner.retry)
            .field("refresh", &self.inner.refresh)
            .finish()
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::new(ErrorKind::Decode, format!("Failed to encode request body: {e}")))
}
