//! Common test helper functions shared across test modules.
//!
//! Builds throwaway git repositories with fixed timestamps so tag ordering
//! is deterministic.
use git2::{Oid, Repository, Signature, Time};
use std::{fs, path::Path};

use crate::config::DeployConfig;

/// Initializes an empty repository with a local identity configured.
pub fn init_repo(path: &Path) -> Repository {
    let repo = Repository::init(path).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

fn signature_at(seconds: i64) -> Signature<'static> {
    Signature::new("Test User", "test@example.com", &Time::new(seconds, 0))
        .unwrap()
}

/// Writes `content` to `file` and commits it on HEAD at `seconds`.
pub fn commit_file(
    repo: &Repository,
    file: &str,
    content: &str,
    seconds: i64,
) -> Oid {
    let workdir = repo.workdir().unwrap();
    let full_path = workdir.join(file);
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&full_path, content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = signature_at(seconds);
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs = parents.iter().collect::<Vec<_>>();

    repo.commit(Some("HEAD"), &sig, &sig, file, &tree, &parent_refs)
        .unwrap()
}

/// Creates an annotated tag on HEAD with tagger date `seconds`.
pub fn annotated_tag(repo: &Repository, name: &str, seconds: i64) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag(name, head.as_object(), &signature_at(seconds), name, false)
        .unwrap();
}

/// Creates a lightweight tag on HEAD.
pub fn lightweight_tag(repo: &Repository, name: &str) {
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    repo.tag_lightweight(name, head.as_object(), false).unwrap();
}

/// Creates a DeployConfig rooted at `workdir` with default settings.
pub fn create_test_config(workdir: &Path) -> DeployConfig {
    DeployConfig {
        workdir: workdir.to_path_buf(),
        ..DeployConfig::default()
    }
}
