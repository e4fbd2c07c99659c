//! Error types for lambda-release.
//!
//! Every step of the release workflow has an externally visible side effect,
//! so nothing is recovered locally: errors propagate to `main`, which logs
//! them and exits with a non-zero status.

use std::fmt;

use thiserror::Error;

/// How an external command failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFailure {
    /// The command ran but exited unsuccessfully. `code` is `None` when the
    /// child was terminated by a signal.
    ExitStatus { code: Option<i32>, stderr: String },
    /// The command could not be launched at all.
    Spawn(String),
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitStatus {
                code: Some(code),
                stderr,
            } if stderr.is_empty() => write!(f, "exited with status {code}"),
            Self::ExitStatus {
                code: Some(code),
                stderr,
            } => write!(f, "exited with status {code}: {stderr}"),
            Self::ExitStatus { code: None, .. } => {
                write!(f, "terminated by signal")
            }
            Self::Spawn(reason) => write!(f, "failed to launch: {reason}"),
        }
    }
}

/// Main error type for release operations.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Command `{command}` {failure}")]
    Execution {
        command: String,
        failure: ExecutionFailure,
    },

    #[error("Unexpected repository state: {0}")]
    Parse(String),

    #[error(
        "Tag verification failed: expected `{expected}` on the current commit, found {}",
        describe_found(.expected, .found)
    )]
    TagVerification {
        expected: String,
        found: Option<String>,
    },

    #[error("Aborted by user")]
    UserDeclined,

    #[error("Working tree has uncommitted changes: commit or stash them first")]
    DirtyWorkingTree,

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

fn describe_found(expected: &str, found: &Option<String>) -> String {
    match found {
        Some(tag) if tag == expected => {
            format!("`{tag}` already present before tagging")
        }
        Some(tag) => format!("`{tag}`"),
        None => "none".to_string(),
    }
}

/// Result type alias using DeployError
pub type Result<T> = std::result::Result<T, DeployError>;

impl DeployError {
    /// Create an execution error for a command that exited unsuccessfully
    pub fn exit_status(
        command: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Execution {
            command: command.into(),
            failure: ExecutionFailure::ExitStatus {
                code,
                stderr: stderr.into(),
            },
        }
    }

    /// Create an execution error for a command that could not be launched
    pub fn spawn(command: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Execution {
            command: command.into(),
            failure: ExecutionFailure::Spawn(reason.to_string()),
        }
    }

    /// Create a tag verification error
    pub fn tag_verification(
        expected: impl Into<String>,
        found: Option<String>,
    ) -> Self {
        Self::TagVerification {
            expected: expected.into(),
            found,
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for DeployError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
