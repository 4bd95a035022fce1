pub mod config;
pub mod error;
pub mod types;
pub mod workflow;

pub use config::{ConfigLoader, WorkflowSettings};
pub use error::AppError;
pub use types::*;
pub use workflow::*;
