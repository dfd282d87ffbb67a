//! Middleware that plugs request validation into axum routes.

pub mod validate;

pub use validate::{run_validation, validation_middleware, ValidationLayer, ValidationService};
