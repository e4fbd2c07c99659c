//! The release-safety workflow.
//!
//! Drives one deployment from start to finish:
//!
//! 1. Confirm the deployment with the user
//! 2. Require a clean working tree
//! 3. Create and verify the release tag
//! 4. Gate on schema changes since the previous release
//! 5. Package and upload the function code
//!
//! Steps 2 and 3 are skipped when `skip_tagging` is configured. Every step
//! runs to completion before the next starts, and any failure or declined
//! prompt stops the run before the upload.
use chrono::{DateTime, Local};
use derive_builder::Builder;
use log::*;
use std::rc::Rc;

use crate::{
    DeployError, Result,
    config::DeployConfig,
    package::Packager,
    prompt::{DefaultAnswer, Prompter},
    repo::Vcs,
    schema_guard::{SchemaCheck, check_schema_changes},
    shell::ShellExecutor,
    tagging::TagSequencer,
    types::{DeploymentTarget, Environment, ReleaseTag, RepositoryStatus},
};

#[derive(Builder)]
#[builder(pattern = "owned", build_fn(private, name = "_build"))]
pub struct WorkflowParams {
    pub config: Rc<DeployConfig>,
    pub env: Environment,
    pub target: DeploymentTarget,
    /// Release time used for the tag name.
    #[builder(default = "Local::now()")]
    pub started_at: DateTime<Local>,
    pub vcs: Box<dyn Vcs>,
    pub shell: Box<dyn ShellExecutor>,
    pub prompter: Box<dyn Prompter>,
}

impl WorkflowParamsBuilder {
    pub fn build(self) -> Result<Workflow> {
        let params = self._build().map_err(|e| {
            DeployError::invalid_config(format!(
                "Failed to build release workflow: {}",
                e
            ))
        })?;
        Ok(Workflow::new(params))
    }
}

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Tag created for this release, `None` when tagging was skipped.
    pub tag: Option<ReleaseTag>,
    pub schema: SchemaCheck,
}

pub struct Workflow {
    config: Rc<DeployConfig>,
    env: Environment,
    target: DeploymentTarget,
    started_at: DateTime<Local>,
    vcs: Box<dyn Vcs>,
    shell: Box<dyn ShellExecutor>,
    prompter: Box<dyn Prompter>,
}

impl Workflow {
    pub fn builder() -> WorkflowParamsBuilder {
        WorkflowParamsBuilder::default()
    }

    pub fn new(params: WorkflowParams) -> Self {
        Self {
            config: params.config,
            env: params.env,
            target: params.target,
            started_at: params.started_at,
            vcs: params.vcs,
            shell: params.shell,
            prompter: params.prompter,
        }
    }

    pub async fn run(&mut self) -> Result<Deployment> {
        self.confirm_intent().await?;

        let tag = if self.config.skip_tagging {
            info!("skipping branch check and release tagging");
            None
        } else {
            Some(self.tag_release()?)
        };

        let schema = check_schema_changes(
            self.vcs.as_ref(),
            self.prompter.as_mut(),
            &self.config.tag_prefix,
            &self.config.schema_path,
            self.env,
        )
        .await?;

        Packager::new(self.shell.as_ref(), &self.config)
            .deploy(&self.target)
            .await?;

        Ok(Deployment { tag, schema })
    }

    async fn confirm_intent(&mut self) -> Result<()> {
        let default = match self.env {
            Environment::Production => DefaultAnswer::No,
            Environment::Development => DefaultAnswer::Yes,
        };

        let prompt = format!(
            "Deploy {} to {} in {}?",
            self.target.function_name, self.env, self.target.region
        );

        if self.prompter.confirm(&prompt, default).await? {
            Ok(())
        } else {
            Err(DeployError::UserDeclined)
        }
    }

    fn repository_status(&self) -> Result<RepositoryStatus> {
        Ok(RepositoryStatus {
            branch: self.vcs.current_branch()?,
            is_clean: self.vcs.is_clean()?,
        })
    }

    fn tag_release(&self) -> Result<ReleaseTag> {
        let status = self.repository_status()?;
        info!("releasing from branch {}", status.branch);

        if !status.is_clean {
            return Err(DeployError::DirtyWorkingTree);
        }

        TagSequencer::new(&self.config.tag_prefix, self.env)
            .create_verified(self.vcs.as_ref(), &self.started_at)
    }
}
