//! Account endpoints: registration, login, the caller's profile, user discovery.

use uuid::Uuid;

use crate::http::{ApiClient, ApiError};
use crate::marketplace::types::{
    AuthResponse, LoginRequest, Page, ProfileUpdate, RegisterRequest, Role, User, UserEnvelope,
};

const REGISTER_PATH: &str = "/auth/register/";
const LOGIN_PATH: &str = "/auth/login/";
const ME_PATH: &str = "/auth/me/";
const USERS_PATH: &str = "/auth/users/";

impl ApiClient {
    /// Create an account and persist the returned tokens.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        request.validate()?;
        let response: AuthResponse = self.post_anonymous(REGISTER_PATH, request).await?;
        self.set_tokens(&response.tokens)?;

        tracing::info!(user_id = %response.user.id, role = %response.user.role, "Registered");
        Ok(response)
    }

    /// Exchange credentials for tokens and persist them.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let email = email.trim().to_lowercase();
        let response: AuthResponse = self
            .post_anonymous(LOGIN_PATH, &LoginRequest {
                email: &email,
                password,
            })
            .await?;
        self.set_tokens(&response.tokens)?;

        tracing::info!(user_id = %response.user.id, "Logged in");
        Ok(response)
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get(ME_PATH).await
    }

    /// Partially update the signed-in user's profile.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.patch(ME_PATH, update).await?;
        Ok(envelope.user)
    }

    pub async fn list_users(&self, role: Option<Role>, page: Option<u32>) -> Result<Page<User>, ApiError> {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(role) = role {
            query.append_pair("role", role.as_str());
        }
        if let Some(page) = page {
            query.append_pair("page", &page.to_string());
        }
        let query = query.finish();

        if query.is_empty() {
            self.get(USERS_PATH).await
        } else {
            self.get(&format!("{USERS_PATH}?{query}")).await
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.get(&format!("{USERS_PATH}{id}/")).await
    }
}
