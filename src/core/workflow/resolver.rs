#![allow(clippy::result_large_err)]

//! Substitution of externally sourced values into document string fields.
//!
//! Two sources are supported. A flat property map replaces any string that
//! matches one of its keys verbatim. An [`InitContext`] document is queried
//! with JSONPath when a string starts with the `$$` marker: the first `$` is
//! dropped and the rest (`$.a.b`) is the query. Lookup failures are logged and
//! the original text is kept.

use crate::core::config::ResolverSettings;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use serde_json_path::JsonPath;
use std::fs;
use std::io::Read;
use std::path::Path;

pub const CONTEXT_MARKER: &str = "$$";

#[derive(Debug, thiserror::Error)]
enum ResolveError {
    #[error("invalid path query `{query}`: {reason}")]
    InvalidQuery { query: String, reason: String },
    #[error("path query `{query}` did not select exactly one value: {reason}")]
    NoSingleMatch { query: String, reason: String },
    #[error("path query `{query}` selected a non-scalar value")]
    NotScalar { query: String },
}

/// Document queried by `$$` references, built from JSON or flat properties.
#[derive(Debug, Clone, PartialEq)]
pub struct InitContext {
    document: Value,
    workflow_name: Option<String>,
}

impl InitContext {
    pub fn from_value(document: Value) -> Self {
        Self {
            document,
            workflow_name: None,
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let document = serde_json::from_str(text).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Failed to parse context document: {}", e),
            )
            .with_code("WF-CONTEXT-001")
        })?;
        Ok(Self::from_value(document))
    }

    /// Nest dotted keys: `a.b.c=1` becomes `{"a":{"b":{"c":"1"}}}`.
    pub fn from_properties<K, V, I>(properties: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(String, String)> = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut root = Map::new();
        for (key, value) in entries {
            insert_dotted(&mut root, &key, value);
        }
        Self::from_value(Value::Object(root))
    }

    /// Like [`InitContext::from_properties`], keeping only the keys that belong
    /// to `workflow_name` (the key itself or anything under `workflow_name.`).
    pub fn from_properties_for_workflow<K, V, I>(properties: I, workflow_name: &str) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let prefix = format!("{}.", workflow_name);
        let scoped = properties
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, _): &(String, String)| key == workflow_name || key.starts_with(&prefix));
        let mut context = Self::from_properties(scoped);
        context.workflow_name = Some(workflow_name.to_string());
        context
    }

    /// Read Java-style `.properties` text.
    pub fn from_properties_reader<R: Read>(
        reader: R,
        workflow_name: Option<&str>,
    ) -> Result<Self, AppError> {
        let properties = java_properties::read(reader).map_err(|e| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("Failed to read properties: {}", e),
            )
            .with_code("WF-CONTEXT-001")
        })?;
        Ok(match workflow_name {
            Some(name) => Self::from_properties_for_workflow(properties, name),
            None => Self::from_properties(properties),
        })
    }

    /// Load a context file: `.properties` files are nested by key, anything
    /// else is read as a JSON or YAML document.
    pub fn from_path(path: &Path, workflow_name: Option<&str>) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read context file {}: {}", path.display(), e),
            )
            .with_code("WF-IO-001")
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("properties") => Self::from_properties_reader(text.as_bytes(), workflow_name),
            Some("yaml") | Some("yml") => {
                let document: Value = serde_yaml::from_str(&text).map_err(|e| {
                    AppError::new(
                        ErrorCategory::SerializationError,
                        format!("Failed to parse context file {}: {}", path.display(), e),
                    )
                    .with_code("WF-CONTEXT-001")
                })?;
                Ok(Self::from_value(document))
            }
            _ => Self::from_json_str(&text),
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn workflow_name(&self) -> Option<&str> {
        self.workflow_name.as_deref()
    }

    fn query(&self, query: &str) -> Result<String, ResolveError> {
        let path = JsonPath::parse(query).map_err(|e| ResolveError::InvalidQuery {
            query: query.to_string(),
            reason: e.to_string(),
        })?;
        let node = path
            .query(&self.document)
            .exactly_one()
            .map_err(|e| ResolveError::NoSingleMatch {
                query: query.to_string(),
                reason: e.to_string(),
            })?;
        match node {
            Value::String(text) => Ok(text.clone()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            _ => Err(ResolveError::NotScalar {
                query: query.to_string(),
            }),
        }
    }
}

fn insert_dotted(root: &mut Map<String, Value>, key: &str, value: String) {
    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }

    match current.get(leaf) {
        Some(Value::Object(_)) => {}
        _ => {
            current.insert(leaf.to_string(), Value::String(value));
        }
    }
}

/// Rewrites string fields from a property map and/or a context document.
#[derive(Debug, Clone, Default)]
pub struct ValueResolver {
    properties: Option<IndexMap<String, String>>,
    context: Option<InitContext>,
}

impl ValueResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties<K, V, I>(mut self, properties: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.properties = Some(
            properties
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    pub fn with_context(mut self, context: InitContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Build a resolver from the configured properties and context files.
    pub fn from_settings(settings: &ResolverSettings) -> Result<Self, AppError> {
        let mut resolver = Self::new();
        if let Some(path) = &settings.properties_file {
            let file = fs::File::open(path).map_err(|e| {
                AppError::new(
                    ErrorCategory::IoError,
                    format!("Failed to read properties file {}: {}", path.display(), e),
                )
                .with_code("WF-IO-001")
            })?;
            let properties = java_properties::read(file).map_err(|e| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("Failed to parse properties file {}: {}", path.display(), e),
                )
                .with_code("WF-CONTEXT-001")
            })?;
            let mut entries: Vec<(String, String)> = properties.into_iter().collect();
            entries.sort();
            resolver = resolver.with_properties(entries);
        }
        if let Some(path) = &settings.context_file {
            let context = InitContext::from_path(path, settings.workflow_name.as_deref())?;
            resolver = resolver.with_context(context);
        }
        Ok(resolver)
    }

    pub fn is_passthrough(&self) -> bool {
        self.properties.is_none() && self.context.is_none()
    }

    pub fn context(&self) -> Option<&InitContext> {
        self.context.as_ref()
    }

    /// Resolve a single token. Never fails; unresolvable tokens come back unchanged.
    pub fn resolve(&self, token: &str) -> String {
        let trimmed = token.trim();
        if let Some(context) = &self.context {
            if trimmed.starts_with(CONTEXT_MARKER) {
                let query = &trimmed[1..];
                return match context.query(query) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        tracing::warn!(token, error = %err, "unable to resolve context reference");
                        token.to_string()
                    }
                };
            }
        }

        if let Some(properties) = &self.properties {
            if let Some(resolved) = properties.get(token) {
                return resolved.clone();
            }
        }

        token.to_string()
    }

    /// Resolve every string leaf of a document tree in place. Object keys are
    /// left as they are.
    pub fn resolve_tree(&self, value: &mut Value) {
        if self.is_passthrough() {
            return;
        }
        match value {
            Value::String(text) => {
                let resolved = self.resolve(text);
                if resolved != *text {
                    tracing::debug!(from = %text, to = %resolved, "resolved value");
                    *text = resolved;
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.resolve_tree(item);
                }
            }
            Value::Object(map) => {
                for (_, item) in map.iter_mut() {
                    self.resolve_tree(item);
                }
            }
            _ => {}
        }
    }
}
