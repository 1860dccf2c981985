//! Marketplace data model and request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::ApiError;
use crate::session::tokens::AuthTokens;

/// Which side of the marketplace a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Founder,
    Talent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Founder => "founder",
            Role::Talent => "talent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "founder" => Ok(Role::Founder),
            "talent" => Ok(Role::Talent),
            other => Err(format!("invalid role '{other}': must be \"founder\" or \"talent\"")),
        }
    }
}

/// A user together with their profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_founder(&self) -> bool {
        self.role == Role::Founder
    }

    pub fn is_talent(&self) -> bool {
        self.role == Role::Talent
    }

    /// Full name, or the email when no name was given.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

/// Response of the login and register endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: AuthTokens,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{user, message}` wrapper returned by profile updates.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: String,
    pub role: Role,
}

impl RegisterRequest {
    /// Checks the server would reject anyway, without a round trip.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::invalid_field("email", "This field may not be blank."));
        }
        if self.password != self.password_confirm {
            return Err(ApiError::invalid_field("password", "Passwords do not match."));
        }
        Ok(())
    }
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.bio.is_none()
            && self.skills.is_none()
            && self.avatar_url.is_none()
    }
}

/// A startup listed on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Startup {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub owner_id: Uuid,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub interest_count: u64,
    /// Whether the requesting user has expressed interest, when the server says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_expressed_interest: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Startup {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner_id == user.id
    }
}

/// `{startup, message}` wrapper returned by create and update.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StartupEnvelope {
    pub startup: Startup,
}

/// Fields for a new startup. The owner is always the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartupDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl StartupDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        validate_name(Some(&self.name))?;
        validate_website(self.website.as_deref())
    }
}

/// Partial startup update. Ownership never changes, so there is no owner field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl StartupUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_some() {
            validate_name(self.name.as_deref())?;
        }
        validate_website(self.website.as_deref())
    }
}

fn validate_name(name: Option<&str>) -> Result<(), ApiError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(()),
        _ => Err(ApiError::invalid_field("name", "Startup name cannot be empty.")),
    }
}

fn validate_website(website: Option<&str>) -> Result<(), ApiError> {
    match website {
        Some(url) if !url.is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) => {
            Err(ApiError::invalid_field(
                "website",
                "Website URL must start with http:// or https://",
            ))
        }
        _ => Ok(()),
    }
}

/// Query filters for the startup listing.
#[derive(Debug, Clone, Default)]
pub struct StartupFilter {
    pub industry: Option<String>,
    pub stage: Option<String>,
    pub owner_id: Option<Uuid>,
    pub page: Option<u32>,
}

impl StartupFilter {
    /// Encode as a query string, including the leading `?` when non-empty.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(industry) = &self.industry {
            query.append_pair("industry", industry);
        }
        if let Some(stage) = &self.stage {
            query.append_pair("stage", stage);
        }
        if let Some(owner_id) = &self.owner_id {
            query.append_pair("owner_id", &owner_id.to_string());
        }
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }

        let encoded = query.finish();
        if encoded.is_empty() {
            encoded
        } else {
            format!("?{encoded}")
        }
    }
}

/// A talent user's interest in a startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    pub startup_id: Uuid,
    #[serde(default)]
    pub startup_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `{message}` body returned by deletes and withdrawals.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "PageRepr<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// List endpoints answer either paginated or with a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageRepr<T> {
    Paginated {
        count: u64,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> From<PageRepr<T>> for Page<T> {
    fn from(repr: PageRepr<T>) -> Self {
        match repr {
            PageRepr::Paginated {
                count,
                next,
                previous,
                results,
            } => Page {
                count,
                next,
                previous,
                results,
            },
            PageRepr::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
