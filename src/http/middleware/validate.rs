//! Validation middleware.
//! Runs a [`RequestValidator`] in front of a route's handler.
//!
//! Two equivalent entry points:
//! - [`ValidationLayer`], a tower layer for `Router::route_layer`
//! - [`validation_middleware`], for `axum::middleware::from_fn_with_state`
//!
//! Both must sit behind the router (route layer) so matched path parameters
//! are visible.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::http::request::{
    body_value, params_value, query_value, read_body, replace_body, ProcessedParts,
};
use crate::validation::{ErrorListItem, Mode, RequestPart, RequestParts, RequestValidator};

/// Validate `request`, returning it (possibly processed) or the 400 response.
pub async fn run_validation(
    validator: &RequestValidator,
    request: Request<Body>,
) -> Result<Request<Body>, Response> {
    if validator.schemas().is_empty() {
        return Ok(request);
    }

    let (mut parts, body) = request.into_parts();
    let mut unreadable = Vec::new();

    let params = if validator.covers(RequestPart::Params) {
        params_value(&mut parts).await.unwrap_or_else(|issues| {
            unreadable.push(ErrorListItem::new(RequestPart::Params, issues));
            Value::Null
        })
    } else {
        Value::Null
    };

    let query = if validator.covers(RequestPart::Query) {
        query_value(&parts.uri).unwrap_or_else(|issues| {
            unreadable.push(ErrorListItem::new(RequestPart::Query, issues));
            Value::Null
        })
    } else {
        Value::Null
    };

    // Only a validated body is buffered; anything else streams through.
    let (body_json, body) = if validator.covers(RequestPart::Body) {
        match read_body(&parts.headers, body, validator.body_limit_bytes()).await {
            Ok(bytes) => {
                let value = body_value(&bytes).unwrap_or_else(|issues| {
                    unreadable.push(ErrorListItem::new(RequestPart::Body, issues));
                    Value::Null
                });
                (value, Body::from(bytes))
            }
            Err(issues) => {
                unreadable.push(ErrorListItem::new(RequestPart::Body, issues));
                (Value::Null, Body::empty())
            }
        }
    } else {
        (Value::Null, body)
    };

    let mut fields = RequestParts::new(params, query, body_json);
    validator
        .check_with_unreadable(&mut fields, unreadable)
        .map_err(IntoResponse::into_response)?;

    if validator.mode() == Mode::Validate {
        return Ok(Request::from_parts(parts, body));
    }

    let processed = ProcessedParts {
        params: validator.covers(RequestPart::Params).then_some(fields.params),
        query: validator.covers(RequestPart::Query).then_some(fields.query),
        body: validator.covers(RequestPart::Body).then_some(fields.body),
    };

    let body = match &processed.body {
        Some(value) => replace_body(&mut parts.headers, value).unwrap_or(body),
        None => body,
    };

    parts.extensions.insert(processed);
    Ok(Request::from_parts(parts, body))
}

/// Middleware function form.
///
/// ```ignore
/// let validator = RequestValidator::validate_body(TypedSchema::<NewUser>::new());
/// Router::new()
///     .route("/users", post(create_user))
///     .route_layer(axum::middleware::from_fn_with_state(validator, validation_middleware));
/// ```
pub async fn validation_middleware(
    State(validator): State<RequestValidator>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match run_validation(&validator, request).await {
        Ok(request) => next.run(request).await,
        Err(response) => response,
    }
}

/// Tower layer running a [`RequestValidator`] before the inner service.
#[derive(Clone, Debug)]
pub struct ValidationLayer {
    validator: RequestValidator,
}

impl ValidationLayer {
    pub fn new(validator: RequestValidator) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Service produced by [`ValidationLayer`].
#[derive(Clone, Debug)]
pub struct ValidationService<S> {
    inner: S,
    validator: RequestValidator,
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

impl<S> Service<Request<Body>> for ValidationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        // Take the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = self.validator.clone();

        Box::pin(async move {
            match run_validation(&validator, request).await {
                Ok(request) => inner.call(request).await,
                Err(response) => Ok(response),
            }
        })
    }
}
