#![allow(clippy::result_large_err)]

use super::WorkflowSettings;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "swf.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a directory (dir/swf.toml)
    /// Environment variables override config file values
    pub fn load_from_dir(dir: &Path) -> Result<WorkflowSettings, AppError> {
        Self::load(&dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Load settings from a specific file, falling back to defaults when it is absent,
    /// then apply environment overrides
    pub fn load(path: &Path) -> Result<WorkflowSettings, AppError> {
        let mut settings = Self::load_from_file(path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Load settings from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<WorkflowSettings>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
            .with_code("WF-IO-001")
        })?;

        let settings: WorkflowSettings = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("WF-CONFIG-001")
        })?;

        Ok(Some(settings))
    }

    /// Apply environment variable overrides to the settings
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(settings: &mut WorkflowSettings) {
        if let Some(enabled) = env_bool("SWF_VALIDATION_ENABLED") {
            settings.validation.enabled = enabled;
        }

        if let Some(schema_validation) = env_bool("SWF_SCHEMA_VALIDATION") {
            settings.validation.schema_validation = schema_validation;
        }

        if let Some(strict_mode) = env_bool("SWF_STRICT_MODE") {
            settings.validation.strict_mode = strict_mode;
        }

        if let Ok(properties_file) = env::var("SWF_PROPERTIES_FILE") {
            settings.resolver.properties_file = Some(PathBuf::from(properties_file));
        }

        if let Ok(context_file) = env::var("SWF_CONTEXT_FILE") {
            settings.resolver.context_file = Some(PathBuf::from(context_file));
        }

        if let Ok(workflow_name) = env::var("SWF_WORKFLOW_NAME") {
            settings.resolver.workflow_name = Some(workflow_name);
        }

        if let Ok(level) = env::var("SWF_LOG_LEVEL") {
            if !level.trim().is_empty() {
                settings.logging.default_level = level;
            }
        }

        if let Some(format) = env::var("SWF_LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            settings.logging.format = format;
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|value| value.trim().parse::<bool>().ok())
}
