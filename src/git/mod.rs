//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Fetching, object storage and
//! checkout are delegated to the `git2` crate; no other module should import
//! `git2`.
//!
//! # Responsibilities
//!
//! - Storage backends (`fs` on disk, `mem` ephemeral) and their worktrees
//! - Credentials for SSH key and basic/token auth
//! - Fetching a single commit and checking it out
//!
//! # Example
//!
//! ```ignore
//! use checkout_sha::core::options::Options;
//! use checkout_sha::core::types::StorageMode;
//! use checkout_sha::git;
//!
//! let mut opts = Options::default();
//! opts.bind_args(&args)?;
//! opts.directory = "checkout".into();
//! opts.set_storage_mode(StorageMode::Memory)?;
//!
//! let report = git::checkout(&mut opts)?;
//! println!("{} files", report.file_count);
//! ```

mod auth;
mod backend;
mod interface;
mod memfs;

pub use auth::{ssh_user_from_url, AuthError, AuthMethod, DEFAULT_SSH_USER, TOKEN_USER};
pub use backend::{Storage, Worktree, GIT_DIR_NAME};
pub use interface::{checkout, CheckoutError, CheckoutReport};
pub use memfs::{FileMode, MemFile, MemFs};
