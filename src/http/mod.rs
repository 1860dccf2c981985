//! HTTP subsystem.
//!
//! # Components
//! - `client.rs`: the authenticated request pipeline (`ApiClient`)
//! - `error.rs`: the normalized `ApiError` and its classification flags
//! - `response.rs`: success/error body decoding

pub mod client;
pub mod error;
pub mod response;

pub use client::{ApiClient, ApiClientBuilder, BuildError, REFRESH_PATH};
pub use error::{ApiError, ErrorKind};
