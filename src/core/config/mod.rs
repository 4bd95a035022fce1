pub mod loader;

pub use loader::{ConfigLoader, DEFAULT_CONFIG_FILE};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings loaded from swf.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WorkflowSettings {
    /// Validation switches
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Value substitution sources
    #[serde(default)]
    pub resolver: ResolverSettings,

    /// Logging defaults for the binary
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Validation configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationSettings {
    /// Master switch; when false validation reports nothing
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Validate raw documents against the bundled schema
    #[serde(default = "default_true")]
    pub schema_validation: bool,

    /// Require exactly one end state
    #[serde(default)]
    pub strict_mode: bool,
}

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Flat properties file used for verbatim key substitution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties_file: Option<PathBuf>,

    /// JSON or properties document queried by `$$` references
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_file: Option<PathBuf>,

    /// Restrict a properties context to keys under this workflow name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default tracing directive when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub default_level: String,

    /// Line format written to stderr
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "invalid logging.format '{}'; supported values are text, json",
                value
            )),
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            schema_validation: true,
            strict_mode: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_level: default_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_level() -> String {
    "info".to_string()
}
