//! Workflow validation: schema checks on the raw document plus structural
//! rules over the materialized model. Problems are accumulated and returned,
//! never raised.

use crate::core::config::ValidationSettings;
use crate::core::workflow::model::Workflow;
use crate::core::workflow::schema::SchemaValidator;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub mod rules;
pub use rules::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorType {
    SchemaValidation,
    WorkflowValidation,
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorType::SchemaValidation => write!(f, "SCHEMA_VALIDATION"),
            ValidationErrorType::WorkflowValidation => write!(f, "WORKFLOW_VALIDATION"),
        }
    }
}

/// A single reported validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ValidationErrorType,
    pub message: String,
}

impl ValidationError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorType::SchemaValidation,
            message: message.into(),
        }
    }

    pub fn workflow(message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorType::WorkflowValidation,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Pretty JSON array of `{type, message}` objects.
pub fn render_validation_errors(errors: &[ValidationError]) -> String {
    serde_json::to_string_pretty(errors).unwrap_or_else(|_| "[]".to_string())
}

/// Runs schema and structural validation with a fixed configuration.
/// Each call works on its own error list, so one validator can be reused.
pub struct WorkflowValidator {
    settings: ValidationSettings,
    schema: Result<SchemaValidator, String>,
    rules: Vec<Box<dyn WorkflowRule>>,
}

impl WorkflowValidator {
    pub fn new() -> Self {
        Self::with_settings(ValidationSettings::default())
    }

    pub fn with_settings(settings: ValidationSettings) -> Self {
        let schema = SchemaValidator::bundled().map_err(|err| {
            tracing::error!(code = %err.code, error = %err.message, "workflow schema unavailable");
            err.message
        });
        Self {
            settings,
            schema,
            rules: built_in_rules(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.settings.enabled = enabled;
        self
    }

    pub fn with_schema_validation(mut self, schema_validation: bool) -> Self {
        self.settings.schema_validation = schema_validation;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.settings.strict_mode = strict_mode;
        self
    }

    pub fn settings(&self) -> ValidationSettings {
        self.settings
    }

    /// Validate a raw document and/or a materialized workflow. Schema errors
    /// come first, followed by structural errors in rule order.
    pub fn validate(&self, workflow: Option<&Workflow>, raw: Option<&str>) -> Vec<ValidationError> {
        if !self.settings.enabled {
            return Vec::new();
        }

        let mut errors = Vec::new();
        if self.settings.schema_validation {
            if let Some(raw) = raw {
                errors.extend(self.schema_errors(raw));
            }
        }

        if let Some(workflow) = workflow {
            for rule in &self.rules {
                errors.extend(rule.check(workflow, &self.settings));
            }
        }

        tracing::debug!(count = errors.len(), "validation finished");
        errors
    }

    pub fn validate_workflow(&self, workflow: &Workflow) -> Vec<ValidationError> {
        self.validate(Some(workflow), None)
    }

    pub fn validate_json(&self, raw: &str) -> Vec<ValidationError> {
        self.validate(None, Some(raw))
    }

    fn schema_errors(&self, raw: &str) -> Vec<ValidationError> {
        let schema = match &self.schema {
            Ok(schema) => schema,
            Err(reason) => {
                return vec![ValidationError::schema(format!(
                    "#: workflow schema unavailable: {}",
                    reason
                ))]
            }
        };

        let instance = match read_document(raw) {
            Ok(instance) => instance,
            Err(reason) => {
                tracing::error!(error = %reason, "unable to read document for schema validation");
                return vec![ValidationError::schema(format!(
                    "#: unable to read document: {}",
                    reason
                ))];
            }
        };

        schema
            .violations(&instance)
            .into_iter()
            .map(ValidationError::schema)
            .collect()
    }
}

impl Default for WorkflowValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkflowValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowValidator")
            .field("settings", &self.settings)
            .field("schema_available", &self.schema.is_ok())
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn read_document(raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<Value>(raw)
            .map_err(|_| json_err.to_string())
            .and_then(|value| {
                if value.is_object() {
                    Ok(value)
                } else {
                    Err(json_err.to_string())
                }
            }),
    }
}
