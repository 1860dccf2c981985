//! API health probe.
//!
//! Hitting the health endpoint first wakes a sleeping host before the user's
//! real request; the pipeline's transport retries absorb the boot delay.

use crate::http::{ApiClient, ApiError};
use crate::marketplace::types::HealthStatus;

const HEALTH_PATH: &str = "/health/";

impl ApiClient {
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        let status: HealthStatus = self.get_anonymous(HEALTH_PATH).await?;
        if status.status != "ok" {
            tracing::warn!(status = %status.status, "API reports degraded health");
        }
        Ok(status)
    }
}
