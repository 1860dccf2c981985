//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → any metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Tokens never appear in log fields
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
