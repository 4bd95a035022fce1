//! Serverless workflow definitions: the document model, lossless JSON/YAML
//! mapping with value substitution, and schema plus structural validation.

pub mod cli;
pub mod core;
pub mod logging;

pub use crate::core::workflow::{
    State, Workflow, WorkflowController, WorkflowMapper, WorkflowValidator,
};

/// Current crate version string exposed for CLI and tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, anyhow::Error>;
