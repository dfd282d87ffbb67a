//! Request validation subsystem.
//!
//! # Data Flow
//! ```text
//! RequestParts { params, query, body }
//!     → dispatcher.rs (walk configured parts in Params → Query → Body order)
//!     → schema.rs (non-throwing parse per part)
//!     → Process mode: overwrite the part with the parsed output
//!     → any failure recorded?
//!         yes → responder.rs (single 400 with every failing part)
//!         no  → next stage
//! ```
//!
//! # Design Decisions
//! - One aggregation algorithm; single-part dispatchers are the multi-part
//!   dispatcher with one schema configured
//! - Every configured part is checked, failures never short-circuit the walk
//! - Writes happen per part on that part's success, so a failing body does
//!   not roll back normalized params
//! - Schemas are opaque `Arc<dyn Schema>` values shared across requests

pub mod dispatcher;
pub mod issues;
pub mod part;
pub mod responder;
pub mod schema;

pub use dispatcher::{Mode, PartSchemas, RequestParts, RequestValidator};
pub use issues::{Issue, PathSegment, SchemaIssues};
pub use part::RequestPart;
pub use responder::{send_error, send_errors, ErrorListItem, ValidationRejection};
pub use schema::{
    FnSchema, JsonSchema, Schema, SchemaBuildError, SchemaExt, SharedSchema, Transform,
    TypedSchema,
};
