//! Named request parts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three request slices a schema can be attached to.
///
/// The declaration order is the order in which parts are validated and
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestPart {
    /// Path parameters captured by the router.
    Params,
    /// Decoded query string.
    Query,
    /// Parsed request body.
    Body,
}

impl RequestPart {
    /// All parts in validation order.
    pub const ALL: [RequestPart; 3] = [RequestPart::Params, RequestPart::Query, RequestPart::Body];

    /// Wire name of the part.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPart::Params => "Params",
            RequestPart::Query => "Query",
            RequestPart::Body => "Body",
        }
    }
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
