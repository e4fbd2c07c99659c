//! Common test utilities for workflow tests.

use chrono::{DateTime, Local, TimeZone};
use std::{path::PathBuf, rc::Rc};

use crate::{
    config::DeployConfig,
    prompt::{DefaultAnswer, MockPrompter},
    repo::{MockVcs, Vcs},
    shell::MockShellExecutor,
    types::{DeploymentTarget, Environment},
    workflow::Workflow,
};

pub const TAG: &str = "BE-dev-05-03-2026-9-7";
pub const PROD_TAG: &str = "BE-PROD-05-03-2026-9-7";

pub fn started_at() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 3, 5, 9, 7, 40).unwrap()
}

pub fn target() -> DeploymentTarget {
    DeploymentTarget {
        region: "eu-central-1".into(),
        function_name: "orders-api".into(),
    }
}

pub fn test_config() -> DeployConfig {
    DeployConfig {
        workdir: PathBuf::from("/srv/app"),
        ..DeployConfig::default()
    }
}

/// Creates a Workflow over the given collaborators.
///
/// # Example
/// ```ignore
/// let mut vcs = MockVcs::new();
/// vcs.expect_is_clean().returning(|| Ok(true));
/// let workflow = create_test_workflow(vcs, shell, prompter, Environment::Development, test_config());
/// ```
pub fn create_test_workflow(
    vcs: impl Vcs + 'static,
    shell: MockShellExecutor,
    prompter: MockPrompter,
    env: Environment,
    config: DeployConfig,
) -> Workflow {
    Workflow::builder()
        .config(Rc::new(config))
        .env(env)
        .target(target())
        .started_at(started_at())
        .vcs(Box::new(vcs))
        .shell(Box::new(shell))
        .prompter(Box::new(prompter))
        .build()
        .unwrap()
}

/// Shell that accepts every packaging command.
pub fn accepting_shell() -> MockShellExecutor {
    let mut shell = MockShellExecutor::new();
    shell.expect_run().times(5).returning(|_| Ok(String::new()));
    shell
}

/// Shell that must never be used.
pub fn unused_shell() -> MockShellExecutor {
    let mut shell = MockShellExecutor::new();
    shell.expect_run().times(0);
    shell
}

/// Prompter that answers the intent prompt with `intent` and any
/// "Continue?" prompt with `proceed`.
pub fn prompter(intent: bool, proceed: Option<bool>) -> MockPrompter {
    let mut prompter = MockPrompter::new();
    prompter
        .expect_confirm()
        .withf(|prompt, _| prompt.starts_with("Deploy "))
        .times(1)
        .returning(move |_, _| Ok(intent));

    match proceed {
        Some(answer) => {
            prompter
                .expect_confirm()
                .withf(|prompt, default| {
                    prompt == "Continue?" && *default == DefaultAnswer::No
                })
                .times(1)
                .returning(move |_, _| Ok(answer));
        }
        None => {
            prompter
                .expect_confirm()
                .withf(|prompt, _| prompt == "Continue?")
                .times(0);
        }
    }

    prompter
}

/// Vcs on a clean branch that tags successfully. `existing` are the tags
/// before the run; the new tag is appended once created.
pub fn tagging_vcs(existing: &[&str], new_tag: &'static str) -> MockVcs {
    let before: Vec<String> = existing.iter().map(|s| s.to_string()).collect();
    let mut after = before.clone();
    after.push(new_tag.to_string());

    let mut vcs = MockVcs::new();
    vcs.expect_current_branch()
        .returning(|| Ok("main".to_string()));
    vcs.expect_is_clean().returning(|| Ok(true));

    let mut seq = mockall::Sequence::new();
    vcs.expect_list_tags()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move || Ok(before.clone()));
    vcs.expect_create_tag()
        .withf(move |name, _| name == new_tag)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    vcs.expect_tags_at_head()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move || Ok(vec![new_tag.to_string()]));
    vcs.expect_list_tags()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move || Ok(after.clone()));

    vcs
}
