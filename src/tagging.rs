//! Release tag creation and verification.
use chrono::{DateTime, Local};
use log::*;

use crate::{
    DeployError, Result,
    repo::Vcs,
    types::{Environment, ReleaseTag},
};

/// Computes, creates and verifies the release tag for one run.
pub struct TagSequencer<'a> {
    prefix: &'a str,
    env: Environment,
}

impl<'a> TagSequencer<'a> {
    pub fn new(prefix: &'a str, env: Environment) -> Self {
        Self { prefix, env }
    }

    /// Name of the tag for a release started at `now`.
    pub fn next_tag(&self, now: &DateTime<Local>) -> ReleaseTag {
        ReleaseTag::at(self.prefix, self.env, now)
    }

    /// Creates the tag for `now` on the current commit and confirms it
    /// landed there. An existing tag with the same name, for example from a
    /// second run within the same minute, fails verification and is never
    /// overwritten.
    pub fn create_verified(
        &self,
        vcs: &dyn Vcs,
        now: &DateTime<Local>,
    ) -> Result<ReleaseTag> {
        let tag = self.next_tag(now);

        if vcs.list_tags()?.iter().any(|t| *t == tag.name) {
            let existing = Some(tag.name.clone());
            return Err(DeployError::tag_verification(tag.name, existing));
        }

        let message = format!("{} release {}", self.env, tag);
        vcs.create_tag(&tag.name, &message)?;

        let on_head = vcs.tags_at_head()?;
        if !on_head.contains(&tag.name) {
            return Err(DeployError::tag_verification(
                tag.name,
                on_head.last().cloned(),
            ));
        }

        info!("verified tag {tag} on current commit");
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{GitRepository, MockVcs};
    use crate::test_helpers::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 5, 9, 7, 12).unwrap()
    }

    #[test]
    fn computes_tag_from_time_and_environment() {
        let sequencer = TagSequencer::new("BE", Environment::Development);
        assert_eq!(sequencer.next_tag(&now()).name, "BE-dev-05-03-2026-9-7");

        let sequencer = TagSequencer::new("BE", Environment::Production);
        assert_eq!(sequencer.next_tag(&now()).name, "BE-PROD-05-03-2026-9-7");
    }

    #[test]
    fn creates_and_verifies_tag() {
        let mut vcs = MockVcs::new();
        vcs.expect_list_tags()
            .returning(|| Ok(vec!["BE-dev-04-03-2026-18-0".into()]));
        vcs.expect_create_tag()
            .withf(|name, message| {
                name == "BE-dev-05-03-2026-9-7"
                    && message == "development release BE-dev-05-03-2026-9-7"
            })
            .times(1)
            .returning(|_, _| Ok(()));
        vcs.expect_tags_at_head()
            .times(1)
            .returning(|| Ok(vec!["BE-dev-05-03-2026-9-7".into()]));

        let sequencer = TagSequencer::new("BE", Environment::Development);
        let tag = sequencer.create_verified(&vcs, &now()).unwrap();
        assert_eq!(tag.name, "BE-dev-05-03-2026-9-7");
    }

    #[test]
    fn missing_tag_on_head_fails_verification() {
        let mut vcs = MockVcs::new();
        vcs.expect_list_tags().returning(|| Ok(vec![]));
        vcs.expect_create_tag().times(1).returning(|_, _| Ok(()));
        vcs.expect_tags_at_head()
            .returning(|| Ok(vec!["BE-dev-04-03-2026-18-0".into()]));

        let sequencer = TagSequencer::new("BE", Environment::Development);
        let err = sequencer.create_verified(&vcs, &now()).unwrap_err();

        match err {
            DeployError::TagVerification { expected, found } => {
                assert_eq!(expected, "BE-dev-05-03-2026-9-7");
                assert_eq!(found.as_deref(), Some("BE-dev-04-03-2026-18-0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn no_tag_on_head_fails_verification() {
        let mut vcs = MockVcs::new();
        vcs.expect_list_tags().returning(|| Ok(vec![]));
        vcs.expect_create_tag().returning(|_, _| Ok(()));
        vcs.expect_tags_at_head().returning(|| Ok(vec![]));

        let sequencer = TagSequencer::new("BE", Environment::Production);
        let err = sequencer.create_verified(&vcs, &now()).unwrap_err();
        assert!(matches!(
            err,
            DeployError::TagVerification { found: None, .. }
        ));
    }

    #[test]
    fn duplicate_tag_fails_without_creating() {
        let mut vcs = MockVcs::new();
        vcs.expect_list_tags()
            .returning(|| Ok(vec!["BE-dev-05-03-2026-9-7".into()]));
        vcs.expect_create_tag().times(0);
        vcs.expect_tags_at_head().times(0);

        let sequencer = TagSequencer::new("BE", Environment::Development);
        let err = sequencer.create_verified(&vcs, &now()).unwrap_err();
        match err {
            DeployError::TagVerification { expected, found } => {
                assert_eq!(expected, "BE-dev-05-03-2026-9-7");
                assert_eq!(found.as_deref(), Some("BE-dev-05-03-2026-9-7"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_failure_propagates() {
        let mut vcs = MockVcs::new();
        vcs.expect_list_tags().returning(|| Ok(vec![]));
        vcs.expect_create_tag().returning(|_, _| {
            Err(DeployError::GitError(git2::Error::from_str(
                "hook rejected tag",
            )))
        });
        vcs.expect_tags_at_head().times(0);

        let sequencer = TagSequencer::new("BE", Environment::Development);
        let err = sequencer.create_verified(&vcs, &now()).unwrap_err();
        assert!(matches!(err, DeployError::GitError(_)));
    }

    #[test]
    fn tags_real_repository() {
        let dir = TempDir::new().unwrap();
        let repo = init_repo(dir.path());
        commit_file(&repo, "index.js", "one", 1_000);

        let git = GitRepository::open(dir.path()).unwrap();
        let sequencer = TagSequencer::new("BE", Environment::Development);

        let tag = sequencer.create_verified(&git, &now()).unwrap();
        assert_eq!(git.tags_at_head().unwrap(), vec![tag.name.clone()]);

        // same minute again
        let err = sequencer.create_verified(&git, &now()).unwrap_err();
        assert!(matches!(
            err,
            DeployError::TagVerification { found: Some(_), .. }
        ));
    }
}
