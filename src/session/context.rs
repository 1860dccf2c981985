//! Signed-in session state.
//!
//! # Responsibilities
//! - Restore a session from persisted tokens at startup
//! - Sign in, register, sign out
//! - Cache the current user for role checks
//!
//! The cached user is only reported while tokens are stored, so a session the
//! pipeline expired reads as signed out without extra bookkeeping.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::http::{ApiClient, ApiError};
use crate::marketplace::types::{Interest, ProfileUpdate, RegisterRequest, Startup, User};
use crate::session::events::SessionEvent;

/// Authentication context over an [`ApiClient`].
#[derive(Debug)]
pub struct Session {
    client: ApiClient,
    user: RwLock<Option<User>>,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            user: RwLock::new(None),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.subscribe()
    }

    /// Whether tokens are stored. Storage errors read as signed out.
    pub fn is_authenticated(&self) -> bool {
        match self.client.tokens() {
            Ok(tokens) => tokens.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored tokens");
                false
            }
        }
    }

    pub fn current_user(&self) -> Option<User> {
        if !self.is_authenticated() {
            return None;
        }
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_user(&self, user: Option<User>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }

    /// Re-establish the session from stored tokens.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored tokens were
    /// rejected (they are cleared). Network failures keep the tokens and
    /// surface the error so the caller can offer a retry.
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        if self.client.tokens()?.is_none() {
            return Ok(None);
        }

        match self.client.me().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Session restored");
                self.set_user(Some(user.clone()));
                Ok(Some(user))
            }
            Err(e) if e.is_auth() => {
                tracing::info!(error = %e, "Stored session rejected");
                self.client.clear_tokens()?;
                self.set_user(None);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self.client.login(email, password).await?;
        self.signed_in(response.user)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        let response = self.client.register(request).await?;
        self.signed_in(response.user)
    }

    fn signed_in(&self, user: User) -> Result<User, ApiError> {
        self.set_user(Some(user.clone()));
        self.client
            .events()
            .publish(SessionEvent::LoggedIn { user_id: user.id });
        Ok(user)
    }

    /// Forget the stored tokens and the cached user.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.clear_tokens()?;
        self.set_user(None);
        self.client.events().publish(SessionEvent::LoggedOut);

        tracing::info!("Logged out");
        Ok(())
    }

    /// Update the signed-in user's profile and refresh the cached copy.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user = if update.is_empty() {
            self.client.me().await?
        } else {
            self.client.update_me(update).await?
        };
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Founders cannot hold interests; refuse before calling the server.
    fn ensure_may_hold_interest(&self) -> Result<(), ApiError> {
        match self.current_user() {
            Some(user) if user.is_founder() => Err(ApiError::invalid_field(
                "role",
                "Only talent users can express interest in startups.",
            )),
            _ => Ok(()),
        }
    }

    pub async fn express_interest(&self, startup_id: Uuid) -> Result<Interest, ApiError> {
        self.ensure_may_hold_interest()?;
        self.client.express_interest(startup_id).await
    }

    /// Toggle interest in `startup` based on what the server last reported.
    ///
    /// The decision trusts `startup.has_expressed_interest`. If that snapshot
    /// is stale the server refuses the duplicate express or withdraw, the call
    /// fails with a validation error and the interest state is unchanged;
    /// re-fetch the startup and toggle again.
    pub async fn toggle_interest(&self, startup: &Startup) -> Result<bool, ApiError> {
        self.ensure_may_hold_interest()?;
        let currently = startup.has_expressed_interest.unwrap_or(false);
        self.client.toggle_interest(startup.id, currently).await
    }
}
