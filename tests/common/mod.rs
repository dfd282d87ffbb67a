//! Shared utilities for integration tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    routing::any,
    Json, Router,
};
use request_validation::{JsonSchema, ProcessedParts};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

/// `{ K: string }` with `K` required.
#[allow(dead_code)]
pub fn k_schema() -> JsonSchema {
    JsonSchema::new(json!({
        "type": "object",
        "properties": { "K": { "type": "string" } },
        "required": ["K"]
    }))
    .unwrap()
}

/// `{ RequestBodyKey: string }` with the key required.
#[allow(dead_code)]
pub fn request_body_key_schema() -> JsonSchema {
    JsonSchema::new(json!({
        "type": "object",
        "properties": { "RequestBodyKey": { "type": "string" } },
        "required": ["RequestBodyKey"]
    }))
    .unwrap()
}

/// Handler that counts calls and echoes what it received.
///
/// Response: `{ "processed": {params, query, body} | null, "raw_body": "..." }`.
pub fn echo_handler(
    calls: Arc<AtomicUsize>,
) -> impl Fn(Request<Body>) -> std::pin::Pin<Box<dyn std::future::Future<Output = Json<Value>> + Send>>
       + Clone
       + Send
       + Sync
       + 'static {
    move |request: Request<Body>| {
        let calls = calls.clone();
        Box::pin(async move {
            calls.fetch_add(1, Ordering::SeqCst);

            let processed = request.extensions().get::<ProcessedParts>().cloned();
            let content_type = request
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
                .await
                .unwrap();

            let processed = processed.map(|p| {
                json!({ "params": p.params, "query": p.query, "body": p.body })
            });

            Json(json!({
                "processed": processed,
                "raw_body": String::from_utf8_lossy(&bytes),
                "content_type": content_type,
            }))
        })
    }
}

/// A router with one echo route on `path`, any method, traced.
pub fn echo_router<L>(path: &str, layer: L, calls: Arc<AtomicUsize>) -> Router
where
    L: tower::Layer<axum::routing::Route> + Clone + Send + Sync + 'static,
    L::Service: tower::Service<Request<Body>, Response = Response, Error = std::convert::Infallible>
        + Clone
        + Send
        + Sync
        + 'static,
    <L::Service as tower::Service<Request<Body>>>::Future: Send + 'static,
{
    Router::new()
        .route(path, any(echo_handler(calls)))
        .route_layer(layer)
        .layer(TraceLayer::new_for_http())
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request through the router and decode the JSON response.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
    };
    (status, value)
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
