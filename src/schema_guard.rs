//! Confirmation gate for schema changes between releases.
//!
//! Schema changes cannot be rolled back like code, so any change under the
//! schema path since the previous release of the same environment, or a
//! missing previous release, must be confirmed explicitly. Both prompts
//! default to aborting.
use log::*;

use crate::{
    DeployError, Result,
    prompt::{DefaultAnswer, Prompter},
    repo::Vcs,
    types::{EnvTagMatcher, Environment, TagPair},
};

/// What the guard found before letting the deployment continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// Nothing under the schema path changed between the two releases.
    Unchanged(TagPair),
    /// The schema changed and the user confirmed.
    ChangeConfirmed(TagPair),
    /// Fewer than two releases exist, so there was nothing to compare
    /// against, and the user confirmed.
    BaselineConfirmed,
}

/// Compares the schema path between the two newest release tags of `env`.
///
/// Tags are read at call time, so when the workflow has just tagged the
/// current commit the comparison is between this release and the previous
/// one.
pub async fn check_schema_changes(
    vcs: &dyn Vcs,
    prompter: &mut dyn Prompter,
    tag_prefix: &str,
    schema_path: &str,
    env: Environment,
) -> Result<SchemaCheck> {
    let matcher = EnvTagMatcher::new(tag_prefix, env)?;
    let tags = vcs.list_tags()?;

    let Some(pair) = TagPair::latest(&tags, &matcher) else {
        warn!("ATTENTION: {schema_path} schema not yet created for {env}");
        warn!("Please take the required actions!");
        confirm_or_abort(prompter).await?;
        return Ok(SchemaCheck::BaselineConfirmed);
    };

    debug!(
        "comparing {schema_path} between {} and {}",
        pair.previous, pair.newest
    );

    let stat = vcs.diff_stat(schema_path, &pair.previous, &pair.newest)?;
    if stat.trim().is_empty() {
        info!("no schema changes since {}", pair.previous);
        return Ok(SchemaCheck::Unchanged(pair));
    }

    info!("Changes of {schema_path} schema since last release:\n");
    println!("{stat}");
    warn!("ATTENTION: {schema_path} schema changed");
    warn!("Please take the required actions!");
    confirm_or_abort(prompter).await?;

    Ok(SchemaCheck::ChangeConfirmed(pair))
}

async fn confirm_or_abort(prompter: &mut dyn Prompter) -> Result<()> {
    if prompter.confirm("Continue?", DefaultAnswer::No).await? {
        Ok(())
    } else {
        Err(DeployError::UserDeclined)
    }
}
