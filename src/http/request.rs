//! Reading validatable parts out of an axum request and writing processed
//! output back into it.
//!
//! # Responsibilities
//! - Path parameters → JSON object of strings; undecodable segments fail
//! - Query string → JSON object, repeated keys become arrays
//! - Body → buffered (bounded) and parsed as JSON, only when validated
//! - Process mode: replace the body with normalized JSON and attach
//!   [`ProcessedParts`] for typed extractors
//!
//! # Design Decisions
//! - Parts without a schema are never read, so their bytes pass through
//!   untouched
//! - An empty body is `null`, not a failure; the schema decides
//! - Unreadable input is reported as a failure of that part, never as a
//!   separate error class

use axum::body::{Body, Bytes};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequestParts, Query, RawPathParams};
use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Uri};
use serde_json::{Map, Value};

use crate::validation::{Issue, RequestPart, SchemaIssues};

/// Normalized parts produced by a process-mode validator.
///
/// Inserted into request extensions; `None` for parts the validator does not
/// cover.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedParts {
    pub params: Option<Value>,
    pub query: Option<Value>,
    pub body: Option<Value>,
}

impl ProcessedParts {
    pub fn get(&self, part: RequestPart) -> Option<&Value> {
        match part {
            RequestPart::Params => self.params.as_ref(),
            RequestPart::Query => self.query.as_ref(),
            RequestPart::Body => self.body.as_ref(),
        }
    }
}

/// Path parameters of the matched route.
///
/// A segment that does not decode to UTF-8 is an `invalid_params` failure;
/// a request that never went through a router is `missing_params`.
pub(crate) async fn params_value(parts: &mut Parts) -> Result<Value, SchemaIssues> {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => Ok(Value::Object(
            params
                .iter()
                .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
                .collect(),
        )),
        Err(RawPathParamsRejection::InvalidUtf8InPathParam(rejection)) => {
            Err(Issue::new("invalid_params", rejection.body_text()).into())
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "No path parameters available");
            Err(Issue::new("missing_params", rejection.body_text()).into())
        }
    }
}

/// Decoded query string.
pub(crate) fn query_value(uri: &Uri) -> Result<Value, SchemaIssues> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
        .map_err(|rejection| Issue::new("invalid_query", rejection.body_text()))?;

    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    Ok(Value::Object(map))
}

/// Buffer the body, refusing anything declared or streamed past `limit`.
pub(crate) async fn read_body(
    headers: &HeaderMap,
    body: Body,
    limit: usize,
) -> Result<Bytes, SchemaIssues> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > limit {
            return Err(Issue::new(
                "too_large",
                format!("body of {length} bytes exceeds the {limit} byte limit"),
            )
            .into());
        }
    }

    axum::body::to_bytes(body, limit)
        .await
        .map_err(|err| Issue::new("body_unreadable", err.to_string()).into())
}

/// Parse buffered body bytes as JSON.
pub(crate) fn body_value(bytes: &Bytes) -> Result<Value, SchemaIssues> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|err| Issue::new("invalid_json", err.to_string()).into())
}

/// Serialize a processed body and fix up the framing headers.
pub(crate) fn replace_body(headers: &mut HeaderMap, value: &Value) -> Option<Body> {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize processed body");
            return None;
        }
    };

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.remove(header::TRANSFER_ENCODING);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    Some(Body::from(bytes))
}
