//! Request Validation Middleware Library
//!
//! Validates and optionally normalizes the path parameters, query string and
//! body of an axum request against independently supplied schemas, answering
//! `400 Bad Request` with every failing part when validation fails.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ axum Router ──▶ ValidationLayer ──────────────▶ handler
//!                                       │        (valid)               ▲
//!                                       │                              │
//!                                       ▼                              │
//!                              ┌──────────────────┐          ProcessedParts
//!                              │ RequestValidator │         (process mode)
//!                              │ params?  query?  │
//!                              │ body?    mode    │
//!                              └────────┬─────────┘
//!                                       │ (invalid)
//!                                       ▼
//!   400 [ {type, errors}, ... ] ◀── error responder
//! ```
//!
//! # Example
//!
//! ```ignore
//! use request_validation::{PartSchemas, RequestValidator, TypedSchema, ValidationLayer};
//!
//! let validator = RequestValidator::process_request(
//!     PartSchemas::new()
//!         .params(TypedSchema::<UserPath>::new())
//!         .body(TypedSchema::<UpdateUser>::new()),
//! );
//!
//! let app = Router::new()
//!     .route("/users/{id}", put(update_user))
//!     .route_layer(ValidationLayer::new(validator));
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod validation;

pub use config::ValidationConfig;
pub use http::{
    validation_middleware, ProcessedParts, ValidatedBody, ValidatedParams, ValidatedQuery,
    ValidationLayer,
};
pub use validation::{
    send_error, send_errors, ErrorListItem, FnSchema, Issue, JsonSchema, Mode, PartSchemas,
    RequestPart, RequestParts, RequestValidator, Schema, SchemaExt, SchemaIssues, TypedSchema,
    ValidationRejection,
};
