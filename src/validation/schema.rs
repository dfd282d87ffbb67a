//! The schema capability and its adapters.
//!
//! # Responsibilities
//! - Define the single operation the dispatcher needs from a schema
//! - Adapt JSON Schema documents, serde types and closures to it
//! - Allow any schema to be followed by an output transform
//!
//! # Design Decisions
//! - `parse` never fails by panicking; a mismatch is a returned value
//! - Plain and transforming schemas share one trait, so the dispatcher
//!   cannot tell them apart
//! - Schemas are immutable after construction and shared via `Arc`

use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ValidationConfig;
use crate::validation::issues::{Issue, SchemaIssues};

/// Validation and normalization rule for one request part.
pub trait Schema: Send + Sync {
    /// Check `input`, returning the normalized value or every violation found.
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues>;
}

/// Schema handle stored by validators.
pub type SharedSchema = Arc<dyn Schema>;

impl<S: Schema + ?Sized> Schema for Arc<S> {
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        (**self).parse(input)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        (**self).parse(input)
    }
}

/// Combinators available on every schema.
pub trait SchemaExt: Schema + Sized + 'static {
    /// Map the successful output of this schema.
    fn transform<F>(self, f: F) -> Transform<Self, F>
    where
        F: Fn(Value) -> Value + Send + Sync,
    {
        Transform { inner: self, f }
    }

    /// Erase the concrete type for storage in a validator.
    fn shared(self) -> SharedSchema {
        Arc::new(self)
    }
}

impl<S: Schema + Sized + 'static> SchemaExt for S {}

/// Errors raised while building a schema adapter.
#[derive(Debug, Error)]
pub enum SchemaBuildError {
    /// The schema document could not be read.
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    /// The schema document is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The schema document is not a valid JSON Schema.
    #[error("failed to compile schema: {0}")]
    Compile(String),
}

/// A compiled JSON Schema document.
///
/// Successful input is returned unchanged unless pruning is enabled, in which
/// case object keys not declared under `properties` are dropped.
pub struct JsonSchema {
    validator: Validator,
    document: Value,
    prune_undeclared: bool,
}

impl JsonSchema {
    /// Compile a schema document.
    pub fn new(document: Value) -> Result<Self, SchemaBuildError> {
        Self::with_options(document, false)
    }

    /// Compile a schema document, optionally rejecting undeclared object keys.
    ///
    /// Strict mode adds `additionalProperties: false` to every object schema
    /// that does not set it explicitly.
    pub fn with_options(mut document: Value, strict: bool) -> Result<Self, SchemaBuildError> {
        if strict {
            apply_strict_mode(&mut document);
        }

        let validator = jsonschema::validator_for(&document)
            .map_err(|err| SchemaBuildError::Compile(err.to_string()))?;

        Ok(Self {
            validator,
            document,
            prune_undeclared: false,
        })
    }

    /// Compile a schema document using the configured strictness.
    pub fn with_config(document: Value, config: &ValidationConfig) -> Result<Self, SchemaBuildError> {
        Self::with_options(document, config.strict_json_schemas)
    }

    /// Compile a schema from JSON text.
    pub fn from_json(text: &str, strict: bool) -> Result<Self, SchemaBuildError> {
        let document: Value = serde_json::from_str(text)?;
        Self::with_options(document, strict)
    }

    /// Load and compile a schema file.
    pub fn from_file(path: &Path, strict: bool) -> Result<Self, SchemaBuildError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text, strict)
    }

    /// Drop undeclared object keys from successful output.
    pub fn prune_undeclared(mut self) -> Self {
        self.prune_undeclared = true;
        self
    }

    /// The (possibly strict-mode rewritten) schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("document", &self.document)
            .field("prune_undeclared", &self.prune_undeclared)
            .finish()
    }
}

impl Schema for JsonSchema {
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        let issues: SchemaIssues = self
            .validator
            .iter_errors(input)
            .map(|err| {
                let schema_path = err.schema_path.to_string();
                let code = match err.kind {
                    ValidationErrorKind::FalseSchema { .. } => "false_schema",
                    _ => match schema_path.rsplit('/').next().unwrap_or_default() {
                        "" => "invalid",
                        keyword => keyword,
                    },
                };
                Issue::new(code, err.to_string()).at_pointer(&err.instance_path.to_string())
            })
            .collect();

        if !issues.is_empty() {
            return Err(issues);
        }

        let mut output = input.clone();
        if self.prune_undeclared {
            prune(&self.document, &mut output);
        }
        Ok(output)
    }
}

/// Schema backed by a serde type.
///
/// Input is deserialized into `T` and serialized back, so unknown fields are
/// stripped and `#[serde(default)]` values filled in.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + Serialize,
{
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        let typed: T = serde_json::from_value(input.clone())
            .map_err(|err| SchemaIssues::single(Issue::new(serde_code(&err), err.to_string())))?;

        serde_json::to_value(&typed)
            .map_err(|err| SchemaIssues::single(Issue::new("serialize", err.to_string())))
    }
}

fn serde_code(err: &serde_json::Error) -> &'static str {
    let message = err.to_string();
    if message.starts_with("missing field") {
        "required"
    } else if message.starts_with("unknown field") {
        "unrecognized_keys"
    } else if message.starts_with("invalid type") {
        "invalid_type"
    } else {
        "invalid"
    }
}

/// Schema backed by a closure.
pub struct FnSchema<F> {
    f: F,
}

impl<F> FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaIssues> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, SchemaIssues> + Send + Sync,
{
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        (self.f)(input)
    }
}

/// A schema followed by a transform of its successful output.
pub struct Transform<S, F> {
    inner: S,
    f: F,
}

impl<S, F> Schema for Transform<S, F>
where
    S: Schema,
    F: Fn(Value) -> Value + Send + Sync,
{
    fn parse(&self, input: &Value) -> Result<Value, SchemaIssues> {
        self.inner.parse(input).map(&self.f)
    }
}

const SUBSCHEMA_MAPS: [&str; 4] = ["properties", "patternProperties", "$defs", "definitions"];
const SUBSCHEMA_SINGLE: [&str; 7] = ["items", "additionalItems", "contains", "not", "if", "then", "else"];
const SUBSCHEMA_ARRAYS: [&str; 4] = ["prefixItems", "allOf", "anyOf", "oneOf"];

fn apply_strict_mode(schema: &mut Value) {
    let Value::Object(map) = schema else {
        return;
    };

    if declares_object(map) && !map.contains_key("additionalProperties") {
        map.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    for key in SUBSCHEMA_MAPS {
        if let Some(Value::Object(children)) = map.get_mut(key) {
            children.values_mut().for_each(apply_strict_mode);
        }
    }
    for key in SUBSCHEMA_SINGLE {
        if let Some(child) = map.get_mut(key) {
            apply_strict_mode(child);
        }
    }
    for key in SUBSCHEMA_ARRAYS {
        if let Some(Value::Array(children)) = map.get_mut(key) {
            children.iter_mut().for_each(apply_strict_mode);
        }
    }
}

fn declares_object(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => map.contains_key("properties") || map.contains_key("required"),
    }
}

/// Remove keys that `schema.properties` does not declare, following
/// `properties` and `items` into nested values.
fn prune(schema: &Value, value: &mut Value) {
    match value {
        Value::Object(fields) => {
            let Some(Value::Object(declared)) = schema.get("properties") else {
                return;
            };
            fields.retain(|key, _| declared.contains_key(key));
            for (key, child) in fields.iter_mut() {
                if let Some(child_schema) = declared.get(key) {
                    prune(child_schema, child);
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items") {
                for item in items.iter_mut() {
                    prune(item_schema, item);
                }
            }
        }
        _ => {}
    }
}
