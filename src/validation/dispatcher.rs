//! Validation dispatcher.
//!
//! # Responsibilities
//! - Hold up to one schema per request part plus the validate/process mode
//! - Walk configured parts in declaration order and parse each one
//! - Write normalized output back in process mode
//! - Collect failures into one rejection
//!
//! # Design Decisions
//! - Stateless: a validator is built at route registration and shared by
//!   every request on that route
//! - Unconfigured parts are never read, written or reported
//! - No fail-fast; a single response lists every invalid part

use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::ValidationConfig;
use crate::observability::metrics;
use crate::validation::part::RequestPart;
use crate::validation::responder::{ErrorListItem, ValidationRejection};
use crate::validation::schema::{Schema, SharedSchema};

/// What a validator does with successfully parsed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Check only; the request is never modified.
    #[default]
    Validate,
    /// Check, then replace each valid part with the schema output.
    Process,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Validate => "validate",
            Mode::Process => "process",
        }
    }
}

/// Optional schema per request part.
#[derive(Clone, Default)]
pub struct PartSchemas {
    pub params: Option<SharedSchema>,
    pub query: Option<SharedSchema>,
    pub body: Option<SharedSchema>,
}

impl PartSchemas {
    /// No schemas configured.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(mut self, schema: impl Schema + 'static) -> Self {
        self.params = Some(std::sync::Arc::new(schema));
        self
    }

    pub fn query(mut self, schema: impl Schema + 'static) -> Self {
        self.query = Some(std::sync::Arc::new(schema));
        self
    }

    pub fn body(mut self, schema: impl Schema + 'static) -> Self {
        self.body = Some(std::sync::Arc::new(schema));
        self
    }

    /// Attach an already shared schema to `part`.
    pub fn with(mut self, part: RequestPart, schema: SharedSchema) -> Self {
        match part {
            RequestPart::Params => self.params = Some(schema),
            RequestPart::Query => self.query = Some(schema),
            RequestPart::Body => self.body = Some(schema),
        }
        self
    }

    pub fn get(&self, part: RequestPart) -> Option<&SharedSchema> {
        match part {
            RequestPart::Params => self.params.as_ref(),
            RequestPart::Query => self.query.as_ref(),
            RequestPart::Body => self.body.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_none() && self.query.is_none() && self.body.is_none()
    }

    /// Configured parts with their schemas, in validation order.
    pub fn configured(&self) -> impl Iterator<Item = (RequestPart, &SharedSchema)> {
        RequestPart::ALL
            .into_iter()
            .filter_map(move |part| self.get(part).map(|schema| (part, schema)))
    }
}

impl fmt::Debug for PartSchemas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartSchemas")
            .field("params", &self.params.is_some())
            .field("query", &self.query.is_some())
            .field("body", &self.body.is_some())
            .finish()
    }
}

/// The three validatable slices of a request, as JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestParts {
    pub params: Value,
    pub query: Value,
    pub body: Value,
}

impl RequestParts {
    pub fn new(params: Value, query: Value, body: Value) -> Self {
        Self {
            params,
            query,
            body,
        }
    }

    pub fn get(&self, part: RequestPart) -> &Value {
        match part {
            RequestPart::Params => &self.params,
            RequestPart::Query => &self.query,
            RequestPart::Body => &self.body,
        }
    }

    pub fn set(&mut self, part: RequestPart, value: Value) {
        match part {
            RequestPart::Params => self.params = value,
            RequestPart::Query => self.query = value,
            RequestPart::Body => self.body = value,
        }
    }
}

/// Per-route request validator.
#[derive(Clone, Debug)]
pub struct RequestValidator {
    schemas: PartSchemas,
    mode: Mode,
    body_limit_bytes: usize,
    log_rejections: bool,
    metrics_enabled: bool,
}

impl RequestValidator {
    /// Build a validator over any subset of parts.
    pub fn new(schemas: PartSchemas, mode: Mode) -> Self {
        let defaults = ValidationConfig::default();
        Self {
            schemas,
            mode,
            body_limit_bytes: defaults.body_limit_bytes,
            log_rejections: defaults.log_rejections,
            metrics_enabled: defaults.observability.metrics_enabled,
        }
    }

    /// Build a validator for exactly one part.
    pub fn single(part: RequestPart, schema: impl Schema + 'static, mode: Mode) -> Self {
        Self::new(PartSchemas::new().with(part, std::sync::Arc::new(schema)), mode)
    }

    pub fn validate_request(schemas: PartSchemas) -> Self {
        Self::new(schemas, Mode::Validate)
    }

    pub fn process_request(schemas: PartSchemas) -> Self {
        Self::new(schemas, Mode::Process)
    }

    pub fn validate_params(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Params, schema, Mode::Validate)
    }

    pub fn validate_query(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Query, schema, Mode::Validate)
    }

    pub fn validate_body(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Body, schema, Mode::Validate)
    }

    pub fn process_params(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Params, schema, Mode::Process)
    }

    pub fn process_query(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Query, schema, Mode::Process)
    }

    pub fn process_body(schema: impl Schema + 'static) -> Self {
        Self::single(RequestPart::Body, schema, Mode::Process)
    }

    /// Apply runtime settings from configuration.
    pub fn with_config(mut self, config: &ValidationConfig) -> Self {
        self.body_limit_bytes = config.body_limit_bytes;
        self.log_rejections = config.log_rejections;
        self.metrics_enabled = config.observability.metrics_enabled;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn schemas(&self) -> &PartSchemas {
        &self.schemas
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_bytes
    }

    /// Whether a schema is configured for `part`.
    pub fn covers(&self, part: RequestPart) -> bool {
        self.schemas.get(part).is_some()
    }

    /// Validate `request`, writing normalized output back in process mode.
    pub fn check(&self, request: &mut RequestParts) -> Result<(), ValidationRejection> {
        self.check_with_unreadable(request, Vec::new())
    }

    /// Run `next` if `request` is valid, otherwise build the 400 response.
    pub fn handle<F>(&self, request: &mut RequestParts, next: F) -> Response
    where
        F: FnOnce(&mut RequestParts) -> Response,
    {
        match self.check(request) {
            Ok(()) => next(request),
            Err(rejection) => rejection.into_response(),
        }
    }

    /// Like [`check`](Self::check), but with some parts already known to be
    /// unusable (e.g. a body that is not JSON). Those parts are reported in
    /// their usual slot instead of being parsed.
    pub(crate) fn check_with_unreadable(
        &self,
        request: &mut RequestParts,
        mut unreadable: Vec<ErrorListItem>,
    ) -> Result<(), ValidationRejection> {
        let mut errors = Vec::new();

        for (part, schema) in self.schemas.configured() {
            let outcome = match unreadable.iter().position(|item| item.part == part) {
                Some(pos) => Err(unreadable.swap_remove(pos).errors),
                None => schema.parse(request.get(part)),
            };

            match outcome {
                Ok(output) => {
                    if self.mode == Mode::Process {
                        request.set(part, output);
                    }
                }
                Err(issues) => errors.push(ErrorListItem::new(part, issues)),
            }
        }

        if self.metrics_enabled {
            metrics::record_outcome(self.mode, errors.is_empty());
            for item in &errors {
                metrics::record_failure(item.part);
            }
        }

        if errors.is_empty() {
            tracing::debug!(mode = self.mode.as_str(), "Request passed validation");
            return Ok(());
        }

        if self.log_rejections {
            let failed_parts: Vec<&str> = errors.iter().map(|item| item.part.as_str()).collect();
            tracing::warn!(
                mode = self.mode.as_str(),
                failed_parts = ?failed_parts,
                "Request rejected by validation"
            );
        }

        Err(ValidationRejection::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::issues::{Issue, SchemaIssues};
    use crate::validation::schema::FnSchema;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Accepts objects whose `K` is a string; output keeps only `K`.
    fn k_string() -> impl Schema + 'static {
        FnSchema::new(|input: &Value| match input.get("K") {
            Some(Value::String(k)) => Ok(json!({ "K": k })),
            _ => Err(SchemaIssues::single(
                Issue::new("invalid_type", "expected string").at("K"),
            )),
        })
    }

    fn counting(calls: Arc<AtomicUsize>) -> impl Schema + 'static {
        FnSchema::new(move |input: &Value| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(input.clone())
        })
    }

    fn request(params: Value, query: Value, body: Value) -> RequestParts {
        RequestParts::new(params, query, body)
    }

    #[test]
    fn test_single_part_validate_passes_without_mutation() {
        let validator = RequestValidator::validate_body(k_string());
        let mut req = request(json!({}), json!({}), json!({ "K": "x", "Extra": 1 }));
        let before = req.clone();

        assert!(validator.check(&mut req).is_ok());
        assert_eq!(req, before);
    }

    #[test]
    fn test_single_part_failure_reports_one_item() {
        let validator = RequestValidator::validate_body(k_string());
        let mut req = request(json!({}), json!({}), json!({ "K": 12345 }));

        let rejection = validator.check(&mut req).unwrap_err();
        assert_eq!(rejection.parts(), vec![RequestPart::Body]);
    }

    #[test]
    fn test_single_part_process_overwrites() {
        let validator = RequestValidator::process_query(k_string());
        let mut req = request(json!({ "id": "1" }), json!({ "K": "x", "Extra": "y" }), json!(null));

        assert!(validator.check(&mut req).is_ok());
        assert_eq!(req.query, json!({ "K": "x" }));
        assert_eq!(req.params, json!({ "id": "1" }));
        assert_eq!(req.body, json!(null));
    }

    #[test]
    fn test_all_failures_aggregated_in_declared_order() {
        let validator = RequestValidator::validate_request(
            PartSchemas::new()
                .body(k_string())
                .query(k_string())
                .params(k_string()),
        );
        let mut req = request(json!({ "K": 1 }), json!({ "K": 2 }), json!({ "K": 3 }));

        let rejection = validator.check(&mut req).unwrap_err();
        assert_eq!(
            rejection.parts(),
            vec![RequestPart::Params, RequestPart::Query, RequestPart::Body]
        );
    }

    #[test]
    fn test_later_parts_checked_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let validator = RequestValidator::validate_request(
            PartSchemas::new()
                .params(k_string())
                .body(counting(calls.clone())),
        );
        let mut req = request(json!({ "K": 1 }), json!({}), json!({}));

        assert!(validator.check(&mut req).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate_mode_partial_failure_leaves_request_untouched() {
        let validator =
            RequestValidator::validate_request(PartSchemas::new().params(k_string()).body(k_string()));
        let mut req = request(json!({ "K": 1234 }), json!({}), json!({ "K": "ok", "Extra": 1 }));
        let before = req.clone();

        let rejection = validator.check(&mut req).unwrap_err();
        assert_eq!(rejection.parts(), vec![RequestPart::Params]);
        assert_eq!(req, before);
    }

    #[test]
    fn test_process_mode_partial_failure_still_writes_valid_parts() {
        let validator =
            RequestValidator::process_request(PartSchemas::new().params(k_string()).body(k_string()));
        let mut req = request(json!({ "K": 1234 }), json!({ "q": "1" }), json!({ "K": "ok", "Extra": 1 }));

        let rejection = validator.check(&mut req).unwrap_err();
        assert_eq!(rejection.parts(), vec![RequestPart::Params]);
        assert_eq!(req.params, json!({ "K": 1234 }));
        assert_eq!(req.query, json!({ "q": "1" }));
        assert_eq!(req.body, json!({ "K": "ok" }));
    }

    #[test]
    fn test_no_schemas_is_pass_through() {
        let validator = RequestValidator::process_request(PartSchemas::new());
        let mut req = request(json!(1), json!("anything"), json!([true]));
        let before = req.clone();

        let next_calls = AtomicUsize::new(0);
        let response = validator.handle(&mut req, |_| {
            next_calls.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK.into_response()
        });

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(next_calls.load(Ordering::SeqCst), 1);
        assert_eq!(req, before);
    }

    #[test]
    fn test_handle_skips_next_on_failure() {
        let validator = RequestValidator::validate_params(k_string());
        let mut req = request(json!({}), json!({}), json!({}));

        let next_calls = AtomicUsize::new(0);
        let response = validator.handle(&mut req, |_| {
            next_calls.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK.into_response()
        });

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(next_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handle_passes_processed_request_to_next() {
        let validator = RequestValidator::process_body(k_string());
        let mut req = request(json!({}), json!({}), json!({ "K": "x", "Extra": "y" }));

        let response = validator.handle(&mut req, |req| {
            assert_eq!(req.body, json!({ "K": "x" }));
            StatusCode::NO_CONTENT.into_response()
        });
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_unreadable_part_keeps_order() {
        let validator =
            RequestValidator::validate_request(PartSchemas::new().params(k_string()).body(k_string()));
        let mut req = request(json!({ "K": 1 }), json!({}), json!(null));

        let rejection = validator
            .check_with_unreadable(
                &mut req,
                vec![ErrorListItem::new(
                    RequestPart::Body,
                    SchemaIssues::single(Issue::new("invalid_json", "bad json")),
                )],
            )
            .unwrap_err();

        assert_eq!(rejection.parts(), vec![RequestPart::Params, RequestPart::Body]);
        assert_eq!(rejection.items()[1].errors.issues()[0].code, "invalid_json");
    }

    #[test]
    fn test_with_config() {
        let mut config = ValidationConfig::default();
        config.body_limit_bytes = 16;
        let validator = RequestValidator::validate_body(k_string()).with_config(&config);

        assert_eq!(validator.body_limit_bytes(), 16);
        assert_eq!(validator.mode(), Mode::Validate);
        assert!(validator.covers(RequestPart::Body));
        assert!(!validator.covers(RequestPart::Query));
    }
}
