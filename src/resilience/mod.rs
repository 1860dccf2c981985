//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to the API:
//!     → reqwest timeouts (connect/request deadline set on the client)
//!     → On transport failure: retries.rs (check if retryable, wait, retry)
//!     → RetryPolicy::delay_after (exponential delay, capped, jittered)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every call has a deadline
//! - Retry budget is per request, bounded by `retries.max_attempts`

pub mod retries;

pub use retries::{is_retryable, with_retries, RetryFailure, RetryPolicy};
