//! Shared fixtures for integration tests.
//!
//! Source repositories are built directly with git2 so tests do not depend
//! on a git binary being installed.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

pub const REGULAR: i32 = 0o100644;
pub const EXECUTABLE: i32 = 0o100755;
pub const SYMLINK: i32 = 0o120000;

/// A bare source repository that checkouts fetch from.
pub struct SourceRepo {
    dir: TempDir,
    repo: Repository,
}

impl SourceRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let repo = Repository::init_bare(dir.path()).expect("failed to init source repo");
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The URL handed to checkout-sha.
    pub fn url(&self) -> String {
        self.dir.path().to_str().expect("utf-8 temp path").to_string()
    }

    /// Commit `files` on top of `refname` and return the commit SHA.
    ///
    /// Each file is `(path, contents, mode)`; paths may contain `/`.
    pub fn commit(&self, refname: &str, files: &[(&str, &str, i32)], message: &str) -> String {
        let entries: Vec<(String, Vec<u8>, i32)> = files
            .iter()
            .map(|(p, c, m)| (p.to_string(), c.as_bytes().to_vec(), *m))
            .collect();
        let tree_id = build_tree(&self.repo, &entries);
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("Test User", "test@example.com").unwrap();
        let parent = self
            .repo
            .find_reference(refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some(refname), &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }

    /// Delete `refname`, leaving its commits reachable from no ref.
    pub fn delete_ref(&self, refname: &str) {
        self.repo.find_reference(refname).unwrap().delete().unwrap();
    }
}

fn build_tree(repo: &Repository, files: &[(String, Vec<u8>, i32)]) -> Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    let mut dirs: BTreeMap<String, Vec<(String, Vec<u8>, i32)>> = BTreeMap::new();

    for (path, contents, mode) in files {
        match path.split_once('/') {
            Some((dir, rest)) => dirs.entry(dir.to_string()).or_default().push((
                rest.to_string(),
                contents.clone(),
                *mode,
            )),
            None => {
                let blob = repo.blob(contents).unwrap();
                builder.insert(path, blob, *mode).unwrap();
            }
        }
    }

    for (dir, entries) in dirs {
        let subtree = build_tree(repo, &entries);
        builder.insert(&dir, subtree, 0o040000).unwrap();
    }

    builder.write().unwrap()
}

/// Files of the standard first commit.
pub const FIRST: &[(&str, &str, i32)] = &[
    ("README.md", "# Test Repo\n", REGULAR),
    ("src/lib.rs", "pub fn one() -> u32 { 1 }\n", REGULAR),
];

/// Files of the standard second commit.
pub const SECOND: &[(&str, &str, i32)] = &[
    ("README.md", "# Test Repo\n\nUpdated.\n", REGULAR),
    ("src/lib.rs", "pub fn one() -> u32 { 1 }\n", REGULAR),
    ("src/two.rs", "pub fn two() -> u32 { 2 }\n", REGULAR),
];

/// A source repo with two commits on `main`; returns `(repo, first, second)`.
pub fn two_commit_repo() -> (SourceRepo, String, String) {
    let source = SourceRepo::new();
    let first = source.commit("refs/heads/main", FIRST, "first");
    let second = source.commit("refs/heads/main", SECOND, "second");
    (source, first, second)
}
