pub mod cli;
pub mod config;
mod error;
pub mod package;
pub mod prompt;
pub mod repo;
pub mod schema_guard;
pub mod shell;
pub mod tagging;
pub mod types;
pub mod workflow;

pub use error::{DeployError, ExecutionFailure, Result};
pub use workflow::{Deployment, Workflow};

#[cfg(test)]
pub mod test_helpers;
