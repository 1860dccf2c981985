//! Startup CRUD. Only the owning founder may update or delete; the server
//! enforces that and answers 403 otherwise.

use reqwest::Method;
use uuid::Uuid;

use crate::http::{ApiClient, ApiError};
use crate::marketplace::types::{
    Page, Startup, StartupDraft, StartupEnvelope, StartupFilter, StartupUpdate,
};

const STARTUPS_PATH: &str = "/startups/";
const MY_STARTUPS_PATH: &str = "/startups/my/";

pub(crate) fn startup_path(id: Uuid) -> String {
    format!("{STARTUPS_PATH}{id}/")
}

impl ApiClient {
    pub async fn list_startups(&self, filter: &StartupFilter) -> Result<Page<Startup>, ApiError> {
        self.get(&format!("{STARTUPS_PATH}{}", filter.to_query())).await
    }

    /// Startups owned by the signed-in founder.
    pub async fn my_startups(&self) -> Result<Page<Startup>, ApiError> {
        self.get(MY_STARTUPS_PATH).await
    }

    /// Follow a pagination link returned in [`Page::next`] or [`Page::previous`].
    pub async fn startups_page(&self, link: &str) -> Result<Page<Startup>, ApiError> {
        self.get(link).await
    }

    pub async fn get_startup(&self, id: Uuid) -> Result<Startup, ApiError> {
        self.get(&startup_path(id)).await
    }

    pub async fn create_startup(&self, draft: &StartupDraft) -> Result<Startup, ApiError> {
        draft.validate()?;
        let envelope: StartupEnvelope = self.post(STARTUPS_PATH, draft).await?;

        tracing::info!(startup_id = %envelope.startup.id, "Startup created");
        Ok(envelope.startup)
    }

    pub async fn update_startup(&self, id: Uuid, update: &StartupUpdate) -> Result<Startup, ApiError> {
        update.validate()?;
        let envelope: StartupEnvelope = self.patch(&startup_path(id), update).await?;
        Ok(envelope.startup)
    }

    pub async fn delete_startup(&self, id: Uuid) -> Result<(), ApiError> {
        // 204 or a {message} body; either way nothing to return.
        self.request(Method::DELETE, &startup_path(id), None).await?;

        tracing::info!(startup_id = %id, "Startup deleted");
        Ok(())
    }
}
