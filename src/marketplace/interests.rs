//! Talent interest in startups.
//!
//! Interest is unique per (user, startup): expressing twice is rejected by
//! the server with a 400, withdrawing without interest likewise.

use reqwest::Method;
use uuid::Uuid;

use crate::http::{ApiClient, ApiError};
use crate::http::response::into_typed;
use crate::marketplace::startups::startup_path;
use crate::marketplace::types::{Interest, MessageBody, Page};

const MY_INTERESTS_PATH: &str = "/startups/my/interests/";

fn interest_path(startup_id: Uuid) -> String {
    format!("{}interest/", startup_path(startup_id))
}

fn interests_path(startup_id: Uuid) -> String {
    format!("{}interests/", startup_path(startup_id))
}

impl ApiClient {
    pub async fn express_interest(&self, startup_id: Uuid) -> Result<Interest, ApiError> {
        let interest = self
            .request(Method::POST, &interest_path(startup_id), None)
            .await
            .and_then(into_typed::<Interest>)?;

        tracing::info!(startup_id = %startup_id, "Interest expressed");
        Ok(interest)
    }

    pub async fn withdraw_interest(&self, startup_id: Uuid) -> Result<(), ApiError> {
        let value = self
            .request(Method::DELETE, &interest_path(startup_id), None)
            .await?;
        let body: Option<MessageBody> = into_typed(value)?;
        let server_message = body.and_then(|b| b.message).unwrap_or_default();
        tracing::info!(startup_id = %startup_id, server_message = %server_message, "Interest withdrawn");
        Ok(())
    }

    /// Flip the caller's interest. Returns whether the caller is interested afterwards.
    pub async fn toggle_interest(&self, startup_id: Uuid, currently_interested: bool) -> Result<bool, ApiError> {
        if currently_interested {
            self.withdraw_interest(startup_id).await?;
            Ok(false)
        } else {
            self.express_interest(startup_id).await?;
            Ok(true)
        }
    }

    /// Everyone interested in a startup. Owner only.
    pub async fn startup_interests(&self, startup_id: Uuid) -> Result<Page<Interest>, ApiError> {
        self.get(&interests_path(startup_id)).await
    }

    /// Startups the signed-in talent user is interested in.
    pub async fn my_interests(&self) -> Result<Page<Interest>, ApiError> {
        self.get(MY_INTERESTS_PATH).await
    }
}
