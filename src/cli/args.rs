use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::core::types::DocumentFormat;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Settings file (default: ./swf.toml)
    #[arg(long, global = true, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,

    /// Java-style properties file used for verbatim value substitution
    #[arg(long, global = true, value_name = "FILE", help_heading = "Value Substitution")]
    pub properties: Option<PathBuf>,

    /// JSON, YAML or properties document queried by `$$` references
    #[arg(long, global = true, value_name = "FILE", help_heading = "Value Substitution")]
    pub context: Option<PathBuf>,

    /// Keep only context properties under this workflow name
    #[arg(long, global = true, value_name = "NAME", help_heading = "Value Substitution")]
    pub workflow_name: Option<String>,

    /// Raise log output to debug
    #[arg(long, short, global = true, help_heading = "Output Options")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    Json,
    Yaml,
}

impl From<TargetFormat> for DocumentFormat {
    fn from(format: TargetFormat) -> Self {
        match format {
            TargetFormat::Json => DocumentFormat::Json,
            TargetFormat::Yaml => DocumentFormat::Yaml,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Workflow definition (.json, .yaml or .yml)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Require exactly one end state
    #[arg(long)]
    pub strict: bool,

    /// Skip JSON Schema checks of the raw document
    #[arg(long)]
    pub no_schema: bool,

    /// Output format for reported errors
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Workflow definition (.json, .yaml or .yml)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Format to write to stdout
    #[arg(long, value_enum)]
    pub to: TargetFormat,
}

#[derive(Args, Debug, Clone)]
pub struct TriggersArgs {
    /// Workflow definition (.json, .yaml or .yml)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}
