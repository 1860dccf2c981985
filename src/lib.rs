//! Startup Platform client library
//!
//! Typed access to the founder/talent marketplace API, built around an
//! authenticated request pipeline with single-flight token refresh and
//! retry for cold-starting hosts.

pub mod config;
pub mod http;
pub mod marketplace;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::schema::ClientConfig;
pub use http::{ApiClient, ApiError, ErrorKind};
pub use session::{AuthTokens, Session, SessionEvent, TokenStore};
