//! git::backend
//!
//! Storage and worktree selections made by the `fs` and `mem` modes.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::memfs::MemFs;
use crate::core::types::StorageMode;

/// Name of the git directory inside a worktree.
pub const GIT_DIR_NAME: &str = ".git";

/// Where fetched objects are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    /// Object store on disk at `git_dir`.
    Filesystem { git_dir: PathBuf },
    /// Ephemeral object store, discarded when the checkout finishes.
    Memory,
}

impl Storage {
    pub fn mode(&self) -> StorageMode {
        match self {
            Storage::Filesystem { .. } => StorageMode::Filesystem,
            Storage::Memory => StorageMode::Memory,
        }
    }

    /// The on-disk git directory, for filesystem storage.
    pub fn git_dir(&self) -> Option<&Path> {
        match self {
            Storage::Filesystem { git_dir } => Some(git_dir),
            Storage::Memory => None,
        }
    }

    /// Open the repository backing this storage, creating it if needed.
    ///
    /// For [`Storage::Memory`] the repository is bare and lives in a
    /// temporary directory owned by the returned handle.
    pub(crate) fn open(&self) -> Result<OpenRepo, git2::Error> {
        match self {
            Storage::Filesystem { git_dir } => {
                let root = git_dir.parent().unwrap_or(git_dir);
                let repo = match git2::Repository::open(root) {
                    Ok(repo) => repo,
                    Err(_) => git2::Repository::init(root)?,
                };
                Ok(OpenRepo {
                    repo,
                    _scratch: None,
                })
            }
            Storage::Memory => {
                let scratch = TempDir::new()
                    .map_err(|e| git2::Error::from_str(&format!("failed to create scratch dir: {e}")))?;
                let repo = git2::Repository::init_bare(scratch.path())?;
                Ok(OpenRepo {
                    repo,
                    _scratch: Some(scratch),
                })
            }
        }
    }
}

/// A repository handle that keeps its scratch space alive.
pub(crate) struct OpenRepo {
    // Field order matters: the repository is dropped before its directory.
    pub(crate) repo: git2::Repository,
    _scratch: Option<TempDir>,
}

/// Where the commit's files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Worktree {
    /// The operating system filesystem rooted at `root`.
    Os { root: PathBuf },
    /// An in-memory filesystem.
    Memory(MemFs),
}

impl Worktree {
    /// Root directory for on-disk worktrees.
    pub fn root(&self) -> Option<&Path> {
        match self {
            Worktree::Os { root } => Some(root),
            Worktree::Memory(_) => None,
        }
    }

    /// The in-memory filesystem, if this is a memory worktree.
    pub fn as_memory(&self) -> Option<&MemFs> {
        match self {
            Worktree::Memory(fs) => Some(fs),
            Worktree::Os { .. } => None,
        }
    }
}
