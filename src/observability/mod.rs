//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher.rs produces:
//!     → tracing events (pass at debug, rejection at warn)
//!     → metrics.rs (validation counters)
//!
//! Consumers:
//!     → logging.rs installs the subscriber (stdout, pretty or JSON)
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a global recorder; hosts choose the exporter
//! - Metric updates are no-ops until a recorder exists

pub mod logging;
pub mod metrics;
