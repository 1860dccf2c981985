//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! login/register (context.rs)
//!     → tokens.rs (AuthTokens) persisted through store.rs (TokenStore)
//!     → events.rs publishes LoggedIn
//!
//! 401 in the pipeline
//!     → refresh.rs (single-flight; waiters queued while refreshing)
//!     → store.rs (new pair saved, or cleared on failure)
//!     → events.rs publishes Expired on failure
//! ```
//!
//! # Design Decisions
//! - Storage is injected; nothing reads a global
//! - Refresh coordination lives in an object owned by the client, not in module state

pub mod context;
pub mod events;
pub mod refresh;
pub mod store;
pub mod tokens;

pub use context::Session;
pub use events::{SessionEvent, SessionEvents};
pub use refresh::{RefreshCoordinator, RefreshOutcome};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
pub use tokens::AuthTokens;
