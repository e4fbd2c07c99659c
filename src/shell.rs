//! External command execution.
//!
//! Commands run through `sh -c` inside the configured working directory with
//! the caller's environment plus a forced `LC_ALL`, so tools produce the same
//! text regardless of the host locale.
use async_trait::async_trait;
use log::*;
use std::{path::PathBuf, process::Stdio};
use tokio::process::Command;

#[cfg(test)]
use mockall::automock;

use crate::{DeployError, Result, config::DeployConfig};

/// Runs a shell command to completion and returns its standard output.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ShellExecutor: Send + Sync {
    /// Fails with [`DeployError::Execution`] when the command cannot be
    /// launched or exits unsuccessfully.
    async fn run(&self, command: &str) -> Result<String>;
}

/// [`ShellExecutor`] backed by the system shell.
pub struct SystemShell {
    workdir: PathBuf,
    locale: String,
}

impl SystemShell {
    pub fn new(config: &DeployConfig) -> Self {
        Self {
            workdir: config.workdir.clone(),
            locale: config.locale.clone(),
        }
    }
}

#[async_trait]
impl ShellExecutor for SystemShell {
    async fn run(&self, command: &str) -> Result<String> {
        debug!("running: {command}");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.workdir)
            .env("LC_ALL", &self.locale)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| DeployError::spawn(command, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeployError::exit_status(
                command,
                output.status.code(),
                stderr.trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Wraps `value` in single quotes for safe interpolation into `sh -c`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
