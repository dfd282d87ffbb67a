//! Structured validation failures produced by schemas.
//!
//! A [`SchemaIssues`] value is what a schema hands back when input does not
//! match. The dispatcher never looks inside it; it is serialized as-is into
//! the `errors` field of the 400 payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step in the location of an offending value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array position.
    Index(usize),
    /// Object key.
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single field-level complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Location of the offending value, empty for the root.
    pub path: Vec<PathSegment>,
    /// Machine-readable reason (e.g. `type`, `required`, `invalid_json`).
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Create an issue located at the root of the input.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Append a path segment.
    pub fn at(mut self, segment: impl Into<PathSegment>) -> Self {
        self.path.push(segment.into());
        self
    }

    /// Replace the path with the segments of a JSON pointer (`/a/0/b`).
    pub fn at_pointer(mut self, pointer: &str) -> Self {
        self.path = parse_pointer(pointer);
        self
    }
}

/// Every violation a schema found in one input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaIssues {
    issues: Vec<Issue>,
}

impl SchemaIssues {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl From<Issue> for SchemaIssues {
    fn from(issue: Issue) -> Self {
        Self::single(issue)
    }
}

impl FromIterator<Issue> for SchemaIssues {
    fn from_iter<I: IntoIterator<Item = Issue>>(iter: I) -> Self {
        Self {
            issues: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for SchemaIssues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

impl fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.first() {
            None => write!(f, "invalid input"),
            Some(first) if self.issues.len() == 1 => write!(f, "{}", first.message),
            Some(first) => write!(
                f,
                "{} (and {} more issue(s))",
                first.message,
                self.issues.len() - 1
            ),
        }
    }
}

impl std::error::Error for SchemaIssues {}

/// Split a JSON pointer into path segments, undoing `~1` and `~0` escapes.
fn parse_pointer(pointer: &str) -> Vec<PathSegment> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| {
            let token = raw.replace("~1", "/").replace("~0", "~");
            match token.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(token),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pointer_parsing() {
        let issue = Issue::new("type", "bad").at_pointer("/items/0/a~1b");
        assert_eq!(
            issue.path,
            vec![
                PathSegment::Key("items".into()),
                PathSegment::Index(0),
                PathSegment::Key("a/b".into()),
            ]
        );

        let root = Issue::new("type", "bad").at_pointer("");
        assert!(root.path.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let issues = SchemaIssues::single(Issue::new("type", "expected string").at("K").at(2));
        assert_eq!(
            serde_json::to_value(&issues).unwrap(),
            json!([{ "path": ["K", 2], "code": "type", "message": "expected string" }])
        );
    }

    #[test]
    fn test_display() {
        let mut issues = SchemaIssues::single(Issue::new("type", "first"));
        assert_eq!(issues.to_string(), "first");

        issues.push(Issue::new("required", "second"));
        assert_eq!(issues.to_string(), "first (and 1 more issue(s))");
    }
}
