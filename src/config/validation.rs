//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ValidationConfig → Result<(), Vec<ConfigValidationError>>

use thiserror::Error;

use crate::config::schema::ValidationConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A semantic problem in an otherwise well-formed config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("body_limit_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("unknown log level '{0}' (expected one of trace, debug, info, warn, error)")]
    UnknownLogLevel(String),
}

/// Check a config, collecting every problem found.
pub fn validate_config(config: &ValidationConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.body_limit_bytes == 0 {
        errors.push(ConfigValidationError::ZeroBodyLimit);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
