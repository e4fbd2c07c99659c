//! Packaging and upload of the function code.
//!
//! The pipeline is strictly sequential and not idempotent: any failing step
//! stops everything after it. Only the removal of a stale archive before
//! packaging is allowed to fail.
use log::*;

use crate::{
    Result,
    config::DeployConfig,
    shell::{ShellExecutor, quote},
    types::DeploymentTarget,
};

/// Builds the deployment archive and uploads it through the shell.
pub struct Packager<'a> {
    shell: &'a dyn ShellExecutor,
    config: &'a DeployConfig,
}

impl<'a> Packager<'a> {
    pub fn new(shell: &'a dyn ShellExecutor, config: &'a DeployConfig) -> Self {
        Self { shell, config }
    }

    /// Installs production dependencies, archives the working directory,
    /// replaces the code of `target` with the archive and removes it again.
    pub async fn deploy(&self, target: &DeploymentTarget) -> Result<()> {
        let artifact = quote(&self.config.artifact);

        if let Err(err) = self.shell.run(&format!("rm {artifact}")).await {
            debug!("no stale artifact removed: {err}");
        }

        info!("Installing packages...");
        self.shell.run(&self.config.install_command).await?;

        info!("Zipping...");
        self.shell.run(&format!("zip -r {artifact} ./*")).await?;

        info!("Uploading...");
        self.shell.run(&self.upload_command(target)).await?;

        self.shell.run(&format!("rm {artifact}")).await?;

        Ok(())
    }

    fn upload_command(&self, target: &DeploymentTarget) -> String {
        let zip_file =
            format!("fileb://{}", self.config.artifact_path().display());
        format!(
            "aws --region {} lambda update-function-code --function-name {} --zip-file {}",
            quote(&target.region),
            quote(&target.function_name),
            quote(&zip_file),
        )
    }
}
