//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for request validation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum request body buffered for body validation, in bytes.
    pub body_limit_bytes: usize,

    /// Compile JSON Schemas in strict mode (reject undeclared object keys).
    pub strict_json_schemas: bool,

    /// Emit a warning event for every rejected request.
    pub log_rejections: bool,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            body_limit_bytes: 2 * 1024 * 1024, // 2MB
            strict_json_schemas: false,
            log_rejections: true,
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// One JSON object per event for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Record validation counters through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}
