//! git::interface
//!
//! Fetch a single commit and check it out into the selected worktree.
//!
//! # Flow
//!
//! 1. Validate options and resolve credentials
//! 2. Open (or create) the repository for the selected [`Storage`]
//! 3. Fetch the commit by id with depth 1; if the remote will not serve it,
//!    fetch all branches and tags instead
//! 4. Check out the commit into the [`Worktree`]
//! 5. Optionally remove the `.git` directory
//!
//! A `.git` directory created by a checkout that then fails is removed
//! again, so a failed run leaves no half-initialized repository behind.
//!
//! # Error Handling
//!
//! Failures are categorized into [`CheckoutError`] variants so the CLI can
//! report them distinctly:
//! - [`CheckoutError::Options`]: invalid or incomplete options
//! - [`CheckoutError::Auth`]: credentials could not be built
//! - [`CheckoutError::Fetch`]: the remote could not be reached or refused us
//! - [`CheckoutError::CommitNotFound`]: the remote does not have the commit

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::auth::{remote_callbacks, AuthError, AuthMethod};
use super::backend::{Storage, Worktree};
use super::memfs::{FileMode, MemFs};
use crate::core::options::{Options, OptionsError};
use crate::core::types::{Sha, StorageMode};

/// Refspecs fetched when the commit cannot be fetched by id.
const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// Errors from a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The remote could not be fetched from.
    #[error("failed to fetch {repo}: {message}")]
    Fetch {
        /// The repository URL
        repo: String,
        /// The error reported by git
        message: String,
    },

    /// The commit is not present on the remote.
    #[error("commit {sha} not found in {repo}")]
    CommitNotFound {
        /// The requested commit
        sha: Sha,
        /// The repository URL
        repo: String,
    },

    /// Filesystem error outside of git.
    #[error("failed to remove '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl CheckoutError {
    fn from_git2(err: git2::Error, context: &str) -> Self {
        CheckoutError::Internal {
            message: format!("{}: {}", context, err.message()),
        }
    }
}

impl From<git2::Error> for CheckoutError {
    fn from(err: git2::Error) -> Self {
        CheckoutError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Summary of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReport {
    /// The repository URL
    pub repo: String,
    /// The checked out commit
    pub sha: Sha,
    /// The storage mode used
    pub storage: StorageMode,
    /// The worktree root for `fs` checkouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Number of files in the checked out tree
    pub file_count: usize,
    /// Files held in memory for `mem` checkouts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    /// Whether `.git` was removed after checkout
    pub dot_git_removed: bool,
}

/// Check out the commit described by `opts`.
///
/// Options are validated first; the storage mode must already be set.
/// For the `mem` mode the files end up in the options' in-memory worktree.
///
/// # Errors
///
/// See [`CheckoutError`].
///
/// # Example
///
/// ```ignore
/// use checkout_sha::core::options::Options;
/// use checkout_sha::core::types::StorageMode;
///
/// let mut opts = Options::default();
/// opts.bind_args(&["https://example.com/repo.git".into(), sha.into()])?;
/// opts.directory = "out".into();
/// opts.set_storage_mode(StorageMode::Filesystem)?;
/// let report = checkout_sha::git::checkout(&mut opts)?;
/// ```
pub fn checkout(opts: &mut Options) -> Result<CheckoutReport, CheckoutError> {
    opts.validate()?;

    let sha = Sha::new(opts.sha.as_str()).map_err(OptionsError::from)?;
    let auth = opts.auth()?;
    let repo_url = opts.repo.clone();
    let remove_dot_git = opts.remove_dot_git;

    let (storage, worktree) = opts
        .backend_mut()
        .ok_or(OptionsError::StorageNotInitialized)?;

    tracing::info!(
        repo = %repo_url,
        sha = %sha,
        storage = %storage.mode(),
        auth = auth.as_ref().map(AuthMethod::kind).unwrap_or("none"),
        "checking out commit"
    );

    let created_git_dir = storage.git_dir().filter(|dir| !dir.exists());

    let file_count = match fetch_and_checkout(storage, worktree, &repo_url, &sha, auth.as_ref()) {
        Ok(count) => count,
        Err(err) => {
            if let Some(git_dir) = created_git_dir {
                discard_git_dir(git_dir);
            }
            return Err(err);
        }
    };

    let mut report = CheckoutReport {
        repo: repo_url,
        sha,
        storage: storage.mode(),
        directory: worktree.root().map(PathBuf::from),
        file_count,
        files: Vec::new(),
        dot_git_removed: false,
    };

    match (&*storage, &*worktree) {
        (Storage::Filesystem { git_dir }, Worktree::Os { .. }) if remove_dot_git => {
            tracing::debug!(path = %git_dir.display(), "removing git directory");
            std::fs::remove_dir_all(git_dir).map_err(|source| CheckoutError::Io {
                path: git_dir.clone(),
                source,
            })?;
            report.dot_git_removed = true;
        }
        (Storage::Memory, Worktree::Memory(fs)) => {
            if remove_dot_git {
                tracing::debug!("memory storage has no git directory to remove");
            }
            report.files = fs.paths().map(str::to_string).collect();
        }
        _ => {}
    }

    Ok(report)
}

fn fetch_and_checkout(
    storage: &Storage,
    worktree: &mut Worktree,
    url: &str,
    sha: &Sha,
    auth: Option<&AuthMethod>,
) -> Result<usize, CheckoutError> {
    let opened = storage.open()?;
    let repo = &opened.repo;
    let oid = fetch_commit(repo, url, sha, auth)?;

    match worktree {
        Worktree::Os { .. } => checkout_to_disk(repo, oid),
        Worktree::Memory(fs) => checkout_to_memory(repo, oid, fs),
    }
}

/// Remove a `.git` directory left by a failed checkout.
fn discard_git_dir(git_dir: &Path) {
    tracing::debug!(path = %git_dir.display(), "removing git directory of failed checkout");
    if let Err(e) = std::fs::remove_dir_all(git_dir) {
        tracing::warn!(path = %git_dir.display(), error = %e, "failed to remove git directory");
    }
}

/// Fetch from `url` until `sha` is present locally.
///
/// The commit is first requested by id with depth 1, which needs a server
/// that allows unadvertised objects in `want` (such as GitHub, or git with
/// `uploadpack.allowAnySHA1InWant`). Local and dumb transports only serve
/// advertised objects and do not support shallow fetches; there the commit
/// is found by fetching every branch and tag, so a commit that is on no
/// ref cannot be checked out from them.
fn fetch_commit(
    repo: &git2::Repository,
    url: &str,
    sha: &Sha,
    auth: Option<&AuthMethod>,
) -> Result<git2::Oid, CheckoutError> {
    let oid = git2::Oid::from_str(sha.as_str())
        .map_err(|e| CheckoutError::from_git2(e, sha.as_str()))?;

    if repo.find_commit(oid).is_ok() {
        tracing::debug!(sha = %sha, "commit already present");
        return Ok(oid);
    }

    tracing::debug!(sha = %sha, "fetching commit by id");
    let mut fetch_opts = fetch_options(auth);
    fetch_opts.depth(1);
    if let Err(e) = fetch(repo, url, &[sha.as_str()], fetch_opts) {
        tracing::debug!(error = %e, "fetch by id failed");
    }

    if repo.find_commit(oid).is_ok() {
        return Ok(oid);
    }

    tracing::debug!(url, refspecs = ?FETCH_REFSPECS, "fetching refs");
    fetch(repo, url, &FETCH_REFSPECS, fetch_options(auth))?;

    repo.find_commit(oid)
        .map(|commit| commit.id())
        .map_err(|_| CheckoutError::CommitNotFound {
            sha: sha.clone(),
            repo: url.to_string(),
        })
}

/// Fetch `refspecs` from `url` with a fresh anonymous remote.
fn fetch(
    repo: &git2::Repository,
    url: &str,
    refspecs: &[&str],
    mut fetch_opts: git2::FetchOptions<'_>,
) -> Result<(), CheckoutError> {
    let fetch_error = |e: git2::Error| CheckoutError::Fetch {
        repo: url.to_string(),
        message: e.message().to_string(),
    };

    let mut remote = repo.remote_anonymous(url).map_err(fetch_error)?;
    remote
        .fetch(refspecs, Some(&mut fetch_opts), None)
        .map_err(fetch_error)
}

fn fetch_options(auth: Option<&AuthMethod>) -> git2::FetchOptions<'_> {
    let mut fetch_opts = git2::FetchOptions::new();
    fetch_opts.remote_callbacks(remote_callbacks(auth));
    fetch_opts.download_tags(git2::AutotagOption::None);
    fetch_opts
}

/// Force the worktree to match `oid`, then detach HEAD there.
///
/// The tree is checked out before HEAD moves so files tracked by a previous
/// checkout but absent from this commit are removed.
fn checkout_to_disk(repo: &git2::Repository, oid: git2::Oid) -> Result<usize, CheckoutError> {
    let commit = repo.find_commit(oid)?;

    let mut builder = git2::build::CheckoutBuilder::new();
    builder.force();
    repo.checkout_tree(commit.as_object(), Some(&mut builder))
        .map_err(|e| CheckoutError::from_git2(e, "checkout"))?;

    repo.set_head_detached(commit.id())
        .map_err(|e| CheckoutError::from_git2(e, "HEAD"))?;

    let count = count_files(&commit.tree()?)?;
    tracing::debug!(sha = %oid, files = count, "worktree updated");
    Ok(count)
}

/// Copy every file in the commit's tree into `fs`.
fn checkout_to_memory(
    repo: &git2::Repository,
    oid: git2::Oid,
    fs: &mut MemFs,
) -> Result<usize, CheckoutError> {
    let tree = repo.find_commit(oid)?.tree()?;
    fs.clear();

    let mut failure = None;
    let walked = tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
        let Some(mode) = FileMode::from_git(entry.filemode()) else {
            return git2::TreeWalkResult::Ok;
        };
        match repo.find_blob(entry.id()) {
            Ok(blob) => {
                let name = String::from_utf8_lossy(entry.name_bytes());
                fs.write(format!("{root}{name}"), blob.content().to_vec(), mode);
                git2::TreeWalkResult::Ok
            }
            Err(e) => {
                failure = Some(e);
                git2::TreeWalkResult::Abort
            }
        }
    });

    if let Some(e) = failure {
        return Err(CheckoutError::from_git2(e, "reading blob"));
    }
    walked.map_err(|e| CheckoutError::from_git2(e, "walking tree"))?;

    tracing::debug!(sha = %oid, files = fs.len(), "tree materialized in memory");
    Ok(fs.len())
}

fn count_files(tree: &git2::Tree<'_>) -> Result<usize, CheckoutError> {
    let mut count = 0;
    tree.walk(git2::TreeWalkMode::PreOrder, |_, entry| {
        if FileMode::from_git(entry.filemode()).is_some() {
            count += 1;
        }
        git2::TreeWalkResult::Ok
    })
    .map_err(|e| CheckoutError::from_git2(e, "walking tree"))?;
    Ok(count)
}
