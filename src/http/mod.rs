//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! axum Router (route matched, path params known)
//!     → middleware/validate.rs (route layer)
//!     → request.rs (params, query, body → RequestParts)
//!     → validation dispatcher (check, process)
//!         → 400 from the error responder, or
//!         → request.rs writes processed output back
//!     → handler (extract.rs reads processed parts)
//! ```

pub mod extract;
pub mod middleware;
pub mod request;

pub use extract::{ExtractError, ValidatedBody, ValidatedParams, ValidatedQuery};
pub use middleware::{run_validation, validation_middleware, ValidationLayer, ValidationService};
pub use request::ProcessedParts;
