//! Marketplace API surface.
//!
//! # Data Flow
//! ```text
//! typed call (e.g. create_startup(&draft))
//!     → local validation (types.rs)
//!     → ApiClient pipeline (auth, retry, refresh)
//!     → response envelope unwrapped into the typed model
//! ```
//!
//! Each endpoint group adds methods to `ApiClient`:
//! - auth.rs: register, login, me, profile update, user discovery
//! - startups.rs: startup CRUD and owner-scoped listing
//! - interests.rs: interest toggle and listings
//! - health.rs: health probe

pub mod auth;
pub mod health;
pub mod interests;
pub mod startups;
pub mod types;

pub use types::{
    AuthResponse, HealthStatus, Interest, Page, ProfileUpdate, RegisterRequest, Role, Startup,
    StartupDraft, StartupFilter, StartupUpdate, User,
};
