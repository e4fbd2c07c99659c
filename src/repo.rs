//! Repository state inspection and tagging.
//!
//! The release workflow only needs a handful of facts about the local
//! repository: the current branch, whether the working tree is clean, the
//! release tags in creation order, and whether a path changed between two
//! tags. They are read through `git2` rather than by parsing `git` output.
use git2::{
    DiffOptions, DiffStatsFormat, ErrorCode, ObjectType, Signature,
    StatusOptions,
};
use log::*;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::{DeployError, Result};

/// Tagger identity used when the repository has no `user.name` or
/// `user.email` configured.
const FALLBACK_TAGGER_NAME: &str = "lambda-release";
const FALLBACK_TAGGER_EMAIL: &str = "lambda-release@localhost";

/// Width passed to libgit2 when rendering `--stat` output.
const DIFF_STAT_WIDTH: usize = 80;

/// Version-control operations used by the release workflow.
#[cfg_attr(test, automock)]
pub trait Vcs {
    /// Name of the checked out branch. Fails with [`DeployError::Parse`]
    /// when HEAD is detached.
    fn current_branch(&self) -> Result<String>;

    /// True when there is nothing to commit: no staged, unstaged or
    /// untracked changes.
    fn is_clean(&self) -> Result<bool>;

    /// All tag names, oldest first by creation date.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Summary of changes under `path` between `from` and `to`, in
    /// `git diff --stat` form. Empty when nothing under `path` changed.
    fn diff_stat(&self, path: &str, from: &str, to: &str) -> Result<String>;

    /// Creates an annotated tag on HEAD. Never overwrites an existing tag.
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Tags pointing at the HEAD commit, oldest first.
    fn tags_at_head(&self) -> Result<Vec<String>>;
}

/// [`Vcs`] implementation for a local git repository.
pub struct GitRepository {
    repo: git2::Repository,
}

impl GitRepository {
    /// Opens the repository rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        debug!("opening git repository at {}", path.display());
        let repo = git2::Repository::open(path)?;
        Ok(Self { repo })
    }

    fn tagger(&self) -> Result<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(err) => {
                debug!("no git identity configured ({err}), using fallback");
                Ok(Signature::now(
                    FALLBACK_TAGGER_NAME,
                    FALLBACK_TAGGER_EMAIL,
                )?)
            }
        }
    }

    /// Creation time of a tag: the tagger date for annotated tags, the
    /// commit date for lightweight ones. Lightweight tags on a tree or blob
    /// have no date and sort first.
    fn created_at(&self, reference: &git2::Reference) -> i64 {
        if let Ok(tag) = reference.peel_to_tag()
            && let Some(tagger) = tag.tagger()
        {
            return tagger.when().seconds();
        }

        match reference.peel_to_commit() {
            Ok(commit) => commit.time().seconds(),
            Err(err) => {
                debug!("tag has no commit date: {err}");
                0
            }
        }
    }

    /// Tag references paired with their names, oldest first. Ties are
    /// broken by name.
    fn sorted_tag_refs(&self) -> Result<Vec<(String, git2::Reference<'_>)>> {
        let names = self.repo.tag_names(None)?;
        let mut tags = vec![];

        for name in names.iter().flatten() {
            let reference =
                self.repo.find_reference(&format!("refs/tags/{name}"))?;
            let created = self.created_at(&reference);
            tags.push((created, name.to_string(), reference));
        }

        tags.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

        Ok(tags
            .into_iter()
            .map(|(_, name, reference)| (name, reference))
            .collect())
    }
}

impl Vcs for GitRepository {
    fn current_branch(&self) -> Result<String> {
        let head = match self.repo.head() {
            Ok(head) => head,
            // a fresh repository still has a branch, just no commits on it
            Err(err) if err.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                return head
                    .symbolic_target()
                    .and_then(|t| t.strip_prefix("refs/heads/"))
                    .map(String::from)
                    .ok_or_else(|| {
                        DeployError::Parse("HEAD does not name a branch".into())
                    });
            }
            Err(err) => return Err(err.into()),
        };

        if !head.is_branch() {
            return Err(DeployError::Parse(
                "HEAD is detached: check out a branch first".into(),
            ));
        }

        head.shorthand().map(String::from).ok_or_else(|| {
            DeployError::Parse("branch name is not valid UTF-8".into())
        })
    }

    fn is_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;

        for entry in statuses.iter() {
            debug!(
                "uncommitted change: {} ({:?})",
                entry.path().unwrap_or("<non-utf8 path>"),
                entry.status()
            );
        }

        Ok(statuses.is_empty())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self
            .sorted_tag_refs()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn diff_stat(&self, path: &str, from: &str, to: &str) -> Result<String> {
        let old_tree = self.repo.revparse_single(from)?.peel_to_tree()?;
        let new_tree = self.repo.revparse_single(to)?.peel_to_tree()?;

        let mut opts = DiffOptions::new();
        opts.pathspec(path);

        let diff = self.repo.diff_tree_to_tree(
            Some(&old_tree),
            Some(&new_tree),
            Some(&mut opts),
        )?;

        let stats = diff.stats()?;
        if stats.files_changed() == 0 {
            return Ok(String::new());
        }

        let buf = stats.to_buf(DiffStatsFormat::FULL, DIFF_STAT_WIDTH)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        info!("creating tag: {name}");
        let head = self.repo.head()?.peel_to_commit()?;
        let tagger = self.tagger()?;
        self.repo
            .tag(name, head.as_object(), &tagger, message, false)?;
        Ok(())
    }

    fn tags_at_head(&self) -> Result<Vec<String>> {
        let head = self.repo.head()?.peel(ObjectType::Commit)?.id();
        let mut tags = vec![];

        for (name, reference) in self.sorted_tag_refs()? {
            // tags on trees or blobs can never point at HEAD
            if let Ok(commit) = reference.peel_to_commit()
                && commit.id() == head
            {
                tags.push(name);
            }
        }

        Ok(tags)
    }
}
