//! Error responder.
//!
//! The only place that knows the wire shape of a validation failure:
//!
//! ```text
//! HTTP/1.1 400 Bad Request
//! content-type: application/json
//!
//! [ { "type": "Params", "errors": [ { "path": ["id"], "code": "type", "message": "..." } ] },
//!   { "type": "Body",   "errors": [ ... ] } ]
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::issues::SchemaIssues;
use crate::validation::part::RequestPart;

/// A failing part paired with what its schema reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorListItem {
    #[serde(rename = "type")]
    pub part: RequestPart,
    pub errors: SchemaIssues,
}

impl ErrorListItem {
    pub fn new(part: RequestPart, errors: SchemaIssues) -> Self {
        Self { part, errors }
    }
}

/// Respond 400 with every failing part, in the order given.
pub fn send_errors(items: Vec<ErrorListItem>) -> Response {
    (StatusCode::BAD_REQUEST, Json(items)).into_response()
}

/// Respond 400 for a single failing part.
pub fn send_error(item: ErrorListItem) -> Response {
    send_errors(vec![item])
}

/// Outcome of a failed validation pass; renders through [`send_errors`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRejection {
    items: Vec<ErrorListItem>,
}

impl ValidationRejection {
    pub fn new(items: Vec<ErrorListItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ErrorListItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ErrorListItem> {
        self.items
    }

    /// Failing parts in report order.
    pub fn parts(&self) -> Vec<RequestPart> {
        self.items.iter().map(|item| item.part).collect()
    }
}

impl fmt::Display for ValidationRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request validation failed")?;
        for (i, item) in self.items.iter().enumerate() {
            let sep = if i == 0 { ": " } else { ", " };
            write!(f, "{}{} ({})", sep, item.part, item.errors)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationRejection {}

impl IntoResponse for ValidationRejection {
    fn into_response(self) -> Response {
        send_errors(self.items)
    }
}
