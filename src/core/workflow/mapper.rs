#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::{DocumentFormat, ErrorCategory};
use crate::core::workflow::model::Workflow;
use crate::core::workflow::resolver::ValueResolver;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Converts workflow documents between text and the typed model.
///
/// Reading parses the text into a generic tree, runs the value resolver over
/// its string leaves, and then materializes the model through the state and
/// choice dispatchers.
#[derive(Debug, Clone, Default)]
pub struct WorkflowMapper {
    resolver: ValueResolver,
}

impl WorkflowMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: ValueResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ValueResolver {
        &self.resolver
    }

    pub fn read_json(&self, text: &str) -> Result<Workflow, AppError> {
        let tree = parse_tree(text, DocumentFormat::Json)?;
        self.read_value(tree)
    }

    pub fn read_yaml(&self, text: &str) -> Result<Workflow, AppError> {
        let tree = parse_tree(text, DocumentFormat::Yaml)?;
        self.read_value(tree)
    }

    pub fn read_str(&self, text: &str, format: DocumentFormat) -> Result<Workflow, AppError> {
        match format {
            DocumentFormat::Json => self.read_json(text),
            DocumentFormat::Yaml => self.read_yaml(text),
        }
    }

    pub fn read_value(&self, mut tree: Value) -> Result<Workflow, AppError> {
        self.resolver.resolve_tree(&mut tree);
        serde_json::from_value(tree).map_err(|e| {
            AppError::with_source(
                ErrorCategory::SerializationError,
                "Document does not describe a workflow",
                Box::new(e),
            )
            .with_code("WF-PARSE-002")
        })
    }

    /// Read a workflow file, picking the format from its extension.
    /// Returns the model together with the raw text for schema validation.
    pub fn read_path(&self, path: &Path) -> Result<(Workflow, String), AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCategory::IoError,
                format!("Failed to read workflow file {}", path.display()),
                Box::new(e),
            )
            .with_code("WF-IO-001")
        })?;
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension)
            .unwrap_or_default();
        tracing::debug!(path = %path.display(), %format, "reading workflow");
        let workflow = self.read_str(&text, format).map_err(|mut err| {
            err.add_context("path", &path.display().to_string());
            err
        })?;
        Ok((workflow, text))
    }

    pub fn write_json(&self, workflow: &Workflow) -> Result<String, AppError> {
        serde_json::to_string_pretty(workflow).map_err(write_error)
    }

    pub fn write_yaml(&self, workflow: &Workflow) -> Result<String, AppError> {
        serde_yaml::to_string(workflow).map_err(write_error)
    }

    pub fn write_str(&self, workflow: &Workflow, format: DocumentFormat) -> Result<String, AppError> {
        match format {
            DocumentFormat::Json => self.write_json(workflow),
            DocumentFormat::Yaml => self.write_yaml(workflow),
        }
    }

    /// Normalized generic tree of the workflow, as it would be written.
    pub fn to_value(&self, workflow: &Workflow) -> Result<Value, AppError> {
        serde_json::to_value(workflow).map_err(write_error)
    }
}

/// Parse document text into a generic tree without touching the model.
pub fn parse_tree(text: &str, format: DocumentFormat) -> Result<Value, AppError> {
    let parsed = match format {
        DocumentFormat::Json => serde_json::from_str::<Value>(text).map_err(|e| e.to_string()),
        DocumentFormat::Yaml => serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("Failed to parse {} document: {}", format, reason),
        )
        .with_code("WF-PARSE-001")
    })
}

fn write_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> AppError {
    AppError::with_source(
        ErrorCategory::SerializationError,
        "Failed to write workflow",
        Box::new(e),
    )
    .with_code("WF-WRITE-001")
}
