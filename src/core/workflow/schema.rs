#![allow(clippy::result_large_err)]

//! Structural checks of raw workflow documents against the bundled JSON Schema.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::choice::Operator;
use crate::core::workflow::model::ActionMode;
use crate::core::workflow::state::{EndStatus, StateType};
use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, ValidationError as SchemaViolation, Validator};
use serde_json::Value;
use std::fmt;

pub const WORKFLOW_SCHEMA: &str = include_str!("../../../schema/workflow.json");

pub const FORMAT_STATE_TYPE: &str = "validstatetype";
pub const FORMAT_ACTION_MODE: &str = "validactionmode";
pub const FORMAT_OPERATOR: &str = "validoperator";
pub const FORMAT_STATUS: &str = "validstatus";

fn is_state_type(value: &str) -> bool {
    StateType::from_discriminator(value).is_some()
}

fn is_action_mode(value: &str) -> bool {
    ActionMode::VALUES.contains(&value)
}

fn is_operator(value: &str) -> bool {
    Operator::VALUES.contains(&value)
}

fn is_status(value: &str) -> bool {
    EndStatus::VALUES.contains(&value)
}

/// Compiled workflow schema with the enumeration formats registered.
pub struct SchemaValidator {
    validator: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile the schema shipped with the crate.
    pub fn bundled() -> Result<Self, AppError> {
        let schema: Value = serde_json::from_str(WORKFLOW_SCHEMA).map_err(|e| {
            AppError::new(
                ErrorCategory::InternalError,
                format!("bundled workflow schema is not JSON: {}", e),
            )
            .with_code("WF-SCHEMA-001")
        })?;
        Self::from_schema(&schema)
    }

    pub fn from_schema(schema: &Value) -> Result<Self, AppError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .with_format(FORMAT_STATE_TYPE, is_state_type)
            .with_format(FORMAT_ACTION_MODE, is_action_mode)
            .with_format(FORMAT_OPERATOR, is_operator)
            .with_format(FORMAT_STATUS, is_status)
            .should_validate_formats(true)
            .build(schema)
            .map_err(|e| {
                AppError::new(
                    ErrorCategory::InternalError,
                    format!("workflow schema does not compile: {}", e),
                )
                .with_code("WF-SCHEMA-001")
            })?;
        Ok(Self { validator })
    }

    /// Every violation in `#<pointer>: <message>` form. More than one
    /// violation is preceded by a `#: <n> schema violations found` summary.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        let rendered: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|violation| render_violation(&violation))
            .collect();

        if rendered.len() > 1 {
            let mut out = Vec::with_capacity(rendered.len() + 1);
            out.push(format!("#: {} schema violations found", rendered.len()));
            out.extend(rendered);
            out
        } else {
            rendered
        }
    }
}

fn render_violation(violation: &SchemaViolation<'_>) -> String {
    let pointer = format!("#{}", violation.instance_path);
    let message = match &violation.kind {
        ValidationErrorKind::Required { property } => {
            let name = match property {
                Value::String(name) => name.clone(),
                other => other.to_string(),
            };
            format!("required key [{}] not found", name)
        }
        ValidationErrorKind::Format { format } => {
            let value = match violation.instance.as_ref() {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            match format.as_str() {
                FORMAT_STATE_TYPE => format!("Invalid state type: {}", value),
                FORMAT_ACTION_MODE => format!("Invalid action mode: {}", value),
                FORMAT_OPERATOR => format!("Invalid operator: {}", value),
                FORMAT_STATUS => format!("Invalid status: {}", value),
                _ => violation.to_string(),
            }
        }
        _ => violation.to_string(),
    };
    format!("{}: {}", pointer, message)
}
