//! Typed extractors for processed request parts.
//!
//! A process-mode validator leaves its normalized output in
//! [`ProcessedParts`]; these extractors deserialize one part of it into the
//! handler's type.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::request::ProcessedParts;
use crate::validation::{send_error, ErrorListItem, Issue, RequestPart, SchemaIssues};

/// Processed path parameters.
#[derive(Debug, Clone)]
pub struct ValidatedParams<T>(pub T);

/// Processed query string.
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

/// Processed body.
#[derive(Debug, Clone)]
pub struct ValidatedBody<T>(pub T);

/// Rejection for the validated extractors.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No process-mode validator covered this part on the route.
    #[error("no processed {0} on this request")]
    NotProcessed(RequestPart),

    /// The processed value does not fit the handler's type.
    #[error("processed {part} does not match the expected type: {source}")]
    Mismatch {
        part: RequestPart,
        #[source]
        source: serde_json::Error,
    },
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        match self {
            ExtractError::NotProcessed(part) => {
                tracing::error!(
                    part = part.as_str(),
                    "Validated extractor used without a process-mode validator"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Request was not processed").into_response()
            }
            ExtractError::Mismatch { part, source } => send_error(ErrorListItem::new(
                part,
                SchemaIssues::single(Issue::new("invalid_type", source.to_string())),
            )),
        }
    }
}

fn processed<T: DeserializeOwned>(parts: &Parts, part: RequestPart) -> Result<T, ExtractError> {
    let value = parts
        .extensions
        .get::<ProcessedParts>()
        .and_then(|processed| processed.get(part))
        .ok_or(ExtractError::NotProcessed(part))?;

    serde_json::from_value(value.clone()).map_err(|source| ExtractError::Mismatch { part, source })
}

impl<T, S> FromRequestParts<S> for ValidatedParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        processed(parts, RequestPart::Params).map(ValidatedParams)
    }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        processed(parts, RequestPart::Query).map(ValidatedQuery)
    }
}

impl<T, S> FromRequestParts<S> for ValidatedBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ExtractError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        processed(parts, RequestPart::Body).map(ValidatedBody)
    }
}
