//! core::options
//!
//! Checkout options: binding arguments and flags, selecting storage, and
//! validating the result.
//!
//! # Lifecycle
//!
//! 1. [`Options::bind_args`] takes the repository URL and commit SHA
//! 2. [`Options::bind_flags`] takes directory, auth and `--rm-dotgit`
//! 3. [`Options::set_storage_mode`] picks the storage and worktree
//! 4. [`Options::validate`] checks everything before any network access
//!
//! # Example
//!
//! ```
//! use checkout_sha::core::options::{Flags, Options};
//! use checkout_sha::core::types::StorageMode;
//!
//! let mut opts = Options::default();
//! opts.bind_args(&[
//!     "https://example.com/repo.git".to_string(),
//!     "0123456789abcdef0123456789abcdef01234567".to_string(),
//! ])
//! .unwrap();
//! opts.bind_flags(&Flags {
//!     directory: "checkout".into(),
//!     username: Some("token".into()),
//!     password: Some("secret".into()),
//!     ..Flags::default()
//! });
//! opts.set_storage_mode(StorageMode::Memory).unwrap();
//!
//! assert!(opts.validate().is_ok());
//! ```

use std::path::PathBuf;

use thiserror::Error;

use super::types::{Sha, StorageMode, TypeError};
use crate::git::{ssh_user_from_url, AuthError, AuthMethod, MemFs, Storage, Worktree};
use crate::git::{DEFAULT_SSH_USER, GIT_DIR_NAME};

/// Errors from binding or validating options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// A single option has a bad value.
    #[error("{key:?} is invalid: {message}")]
    Invalid {
        /// The flag or argument name
        key: &'static str,
        /// What is wrong with it
        message: String,
    },

    #[error("cannot specify both basic auth and ssh auth options")]
    ConflictingAuth,

    #[error("missing arguments: must specify both repo and sha arguments")]
    MissingArguments,

    #[error("filesystem storage not initialized")]
    StorageNotInitialized,

    #[error("must initialize directory before setting storage mode")]
    DirectoryRequired,

    #[error("invalid directory: {0}")]
    InvalidDirectory(#[source] std::io::Error),

    #[error(transparent)]
    Type(#[from] TypeError),
}

fn invalid(key: &'static str, message: impl Into<String>) -> OptionsError {
    OptionsError::Invalid {
        key,
        message: message.into(),
    }
}

/// HTTP basic auth credentials (username/password or token).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BasicAuthOptions {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthOptions")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// SSH private key credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SshAuthOptions {
    pub key_path: PathBuf,
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for SshAuthOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshAuthOptions")
            .field("key_path", &self.key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Flag values bound into [`Options`].
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub directory: PathBuf,
    pub username: Option<String>,
    pub password: Option<String>,
    pub key_path: Option<PathBuf>,
    pub key_passphrase: Option<String>,
    pub rm_dotgit: bool,
}

/// Everything needed to check out one commit.
#[derive(Debug, Default)]
pub struct Options {
    /// Repository URL
    pub repo: String,
    /// Commit SHA as given; checked by [`Options::validate`]
    pub sha: String,
    /// Target directory
    pub directory: PathBuf,
    /// Delete `.git` after checkout
    pub remove_dot_git: bool,
    pub basic_auth: Option<BasicAuthOptions>,
    pub ssh_auth: Option<SshAuthOptions>,

    storage: Option<Storage>,
    worktree: Option<Worktree>,
}

impl Options {
    /// Bind the positional arguments: repository URL, then SHA.
    ///
    /// # Errors
    ///
    /// Returns [`OptionsError::MissingArguments`] unless exactly two
    /// arguments are given.
    pub fn bind_args(&mut self, args: &[String]) -> Result<(), OptionsError> {
        let [repo, sha] = args else {
            return Err(OptionsError::MissingArguments);
        };
        self.repo = repo.clone();
        self.sha = sha.clone();
        Ok(())
    }

    /// Bind flag values.
    ///
    /// A non-empty username or password enables basic auth; a non-empty key
    /// path or passphrase enables SSH auth. Conflicts are reported by
    /// [`Options::validate`], not here.
    pub fn bind_flags(&mut self, flags: &Flags) {
        self.directory = flags.directory.clone();

        if let Some(username) = non_empty(&flags.username) {
            self.basic_auth.get_or_insert_with(Default::default).username = username.to_string();
        }
        if let Some(password) = non_empty(&flags.password) {
            self.basic_auth.get_or_insert_with(Default::default).password = password.to_string();
        }

        if let Some(key_path) = flags.key_path.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            self.ssh_auth.get_or_insert_with(Default::default).key_path = key_path.clone();
        }
        if let Some(passphrase) = non_empty(&flags.key_passphrase) {
            self.ssh_auth.get_or_insert_with(Default::default).passphrase =
                Some(passphrase.to_string());
        }

        self.remove_dot_git = flags.rm_dotgit;
    }

    /// Select the storage backend and worktree.
    ///
    /// # Errors
    ///
    /// - [`OptionsError::DirectoryRequired`] if no directory is bound
    /// - [`OptionsError::InvalidDirectory`] if it cannot be made absolute
    pub fn set_storage_mode(&mut self, mode: StorageMode) -> Result<(), OptionsError> {
        if self.directory.as_os_str().is_empty() {
            return Err(OptionsError::DirectoryRequired);
        }

        tracing::debug!(storage_mode = %mode, "initializing working tree and storage");

        let (storage, worktree) = match mode {
            StorageMode::Filesystem => {
                let root =
                    std::path::absolute(&self.directory).map_err(OptionsError::InvalidDirectory)?;
                let storage = Storage::Filesystem {
                    git_dir: root.join(GIT_DIR_NAME),
                };
                (storage, Worktree::Os { root })
            }
            StorageMode::Memory => (Storage::Memory, Worktree::Memory(MemFs::new())),
        };

        self.storage = Some(storage);
        self.worktree = Some(worktree);
        Ok(())
    }

    /// Check the options are complete and consistent.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.repo.is_empty() {
            return Err(invalid("repo", "it is required"));
        }

        if !Sha::is_valid(&self.sha) {
            return Err(invalid("sha", "must be full 40 hexadecimal character SHA1"));
        }

        if self.basic_auth.is_some() && self.ssh_auth.is_some() {
            return Err(OptionsError::ConflictingAuth);
        }

        if let Some(basic) = &self.basic_auth {
            if basic.username.is_empty() {
                return Err(invalid(
                    "username",
                    "required if password specified (if using token, set username to \"token\")",
                ));
            }
            if basic.password.is_empty() {
                return Err(invalid("password", "required if username specified"));
            }
        }

        if let Some(ssh) = &self.ssh_auth {
            if ssh.key_path.as_os_str().is_empty() {
                return Err(invalid("key-path", "required if ssh options set"));
            }
        }

        if self.storage.is_none() || self.worktree.is_none() {
            return Err(OptionsError::StorageNotInitialized);
        }

        Ok(())
    }

    /// Build the credentials for the configured auth mode.
    ///
    /// SSH takes precedence over basic auth; `validate` rejects having both.
    /// Returns `None` when no auth is configured.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyUnreadable`] if the SSH key cannot be read.
    pub fn auth(&self) -> Result<Option<AuthMethod>, AuthError> {
        if let Some(ssh) = &self.ssh_auth {
            let user =
                ssh_user_from_url(&self.repo).unwrap_or_else(|| DEFAULT_SSH_USER.to_string());
            let auth = AuthMethod::ssh_key(user, &ssh.key_path, ssh.passphrase.clone())?;
            return Ok(Some(auth));
        }

        if let Some(basic) = &self.basic_auth {
            return Ok(Some(AuthMethod::basic(
                basic.username.clone(),
                basic.password.clone(),
            )));
        }

        Ok(None)
    }

    /// The selected worktree, once a storage mode is set.
    pub fn worktree(&self) -> Option<&Worktree> {
        self.worktree.as_ref()
    }

    /// The selected storage, once a storage mode is set.
    pub fn storage(&self) -> Option<&Storage> {
        self.storage.as_ref()
    }

    pub(crate) fn backend_mut(&mut self) -> Option<(&Storage, &mut Worktree)> {
        match (&self.storage, &mut self.worktree) {
            (Some(storage), Some(worktree)) => Some((storage, worktree)),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    fn args(repo: &str, sha: &str) -> Vec<String> {
        vec![repo.to_string(), sha.to_string()]
    }

    /// Options that pass validation with no auth and memory storage.
    fn valid_options() -> Options {
        let mut opts = Options::default();
        opts.bind_args(&args("https://example.com/repo.git", SHA))
            .unwrap();
        opts.directory = PathBuf::from("checkout");
        opts.set_storage_mode(StorageMode::Memory).unwrap();
        opts
    }

    fn message(err: OptionsError) -> String {
        err.to_string()
    }

    mod bind_args {
        use super::*;

        #[test]
        fn binds_repo_and_sha() {
            let mut opts = Options::default();
            opts.bind_args(&args("git@host:repo.git", SHA)).unwrap();
            assert_eq!(opts.repo, "git@host:repo.git");
            assert_eq!(opts.sha, SHA);
        }

        #[test]
        fn too_few_arguments() {
            let mut opts = Options::default();
            let err = opts.bind_args(&["repo".to_string()]).unwrap_err();
            assert_eq!(
                message(err),
                "missing arguments: must specify both repo and sha arguments"
            );
        }

        #[test]
        fn too_many_arguments() {
            let mut opts = Options::default();
            let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
            assert!(matches!(
                opts.bind_args(&three),
                Err(OptionsError::MissingArguments)
            ));
        }

        #[test]
        fn no_arguments() {
            let mut opts = Options::default();
            assert!(opts.bind_args(&[]).is_err());
        }
    }

    mod bind_flags {
        use super::*;

        #[test]
        fn empty_flags_enable_no_auth() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                directory: PathBuf::from("out"),
                username: Some(String::new()),
                key_passphrase: Some(String::new()),
                ..Flags::default()
            });
            assert_eq!(opts.directory, PathBuf::from("out"));
            assert!(opts.basic_auth.is_none());
            assert!(opts.ssh_auth.is_none());
            assert!(!opts.remove_dot_git);
        }

        #[test]
        fn username_alone_creates_basic_auth() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                username: Some("alice".into()),
                ..Flags::default()
            });
            assert_eq!(
                opts.basic_auth,
                Some(BasicAuthOptions {
                    username: "alice".into(),
                    password: String::new(),
                })
            );
        }

        #[test]
        fn password_alone_creates_basic_auth() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                password: Some("pw".into()),
                ..Flags::default()
            });
            let basic = opts.basic_auth.unwrap();
            assert!(basic.username.is_empty());
            assert_eq!(basic.password, "pw");
        }

        #[test]
        fn key_flags_create_ssh_auth() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                key_path: Some(PathBuf::from("/keys/id_rsa")),
                key_passphrase: Some("phrase".into()),
                ..Flags::default()
            });
            assert_eq!(
                opts.ssh_auth,
                Some(SshAuthOptions {
                    key_path: PathBuf::from("/keys/id_rsa"),
                    passphrase: Some("phrase".into()),
                })
            );
        }

        #[test]
        fn passphrase_alone_creates_ssh_auth() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                key_passphrase: Some("phrase".into()),
                ..Flags::default()
            });
            let ssh = opts.ssh_auth.unwrap();
            assert!(ssh.key_path.as_os_str().is_empty());
        }

        #[test]
        fn rm_dotgit_is_bound() {
            let mut opts = Options::default();
            opts.bind_flags(&Flags {
                rm_dotgit: true,
                ..Flags::default()
            });
            assert!(opts.remove_dot_git);
        }
    }

    mod set_storage_mode {
        use super::*;

        #[test]
        fn requires_directory() {
            let mut opts = Options::default();
            let err = opts.set_storage_mode(StorageMode::Memory).unwrap_err();
            assert_eq!(
                message(err),
                "must initialize directory before setting storage mode"
            );
            assert!(opts.storage().is_none());
        }

        #[test]
        fn filesystem_uses_absolute_directory() {
            let mut opts = Options {
                directory: PathBuf::from("relative/dir"),
                ..Options::default()
            };
            opts.set_storage_mode(StorageMode::Filesystem).unwrap();

            let root = opts.worktree().and_then(Worktree::root).unwrap();
            assert!(root.is_absolute());
            assert!(root.ends_with("relative/dir"));
            assert_eq!(
                opts.storage(),
                Some(&Storage::Filesystem {
                    git_dir: root.join(".git"),
                })
            );
        }

        #[test]
        fn memory_uses_memfs() {
            let opts = valid_options();
            assert_eq!(opts.storage(), Some(&Storage::Memory));
            assert!(opts.worktree().unwrap().as_memory().unwrap().is_empty());
        }

        #[test]
        fn switching_modes_replaces_backend() {
            let mut opts = valid_options();
            opts.set_storage_mode(StorageMode::Filesystem).unwrap();
            assert_eq!(
                opts.storage().map(Storage::mode),
                Some(StorageMode::Filesystem)
            );
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn valid_without_auth() {
            assert!(valid_options().validate().is_ok());
        }

        #[test]
        fn repo_required() {
            let mut opts = valid_options();
            opts.repo.clear();
            assert_eq!(
                message(opts.validate().unwrap_err()),
                "\"repo\" is invalid: it is required"
            );
        }

        #[test]
        fn sha_must_be_forty_hex() {
            let too_long = format!("{SHA}a");
            let non_hex = "z".repeat(40);
            for bad in ["", "abc123", &SHA[..39], too_long.as_str(), non_hex.as_str()] {
                let mut opts = valid_options();
                opts.sha = bad.to_string();
                assert_eq!(
                    message(opts.validate().unwrap_err()),
                    "\"sha\" is invalid: must be full 40 hexadecimal character SHA1",
                    "sha {bad:?} should be rejected"
                );
            }
        }

        #[test]
        fn uppercase_sha_accepted() {
            let mut opts = valid_options();
            opts.sha = SHA.to_uppercase();
            assert!(opts.validate().is_ok());
        }

        #[test]
        fn repo_checked_before_sha() {
            let mut opts = valid_options();
            opts.repo.clear();
            opts.sha = "bad".into();
            assert!(message(opts.validate().unwrap_err()).starts_with("\"repo\""));
        }

        #[test]
        fn both_auth_modes_rejected() {
            let mut opts = valid_options();
            opts.basic_auth = Some(BasicAuthOptions {
                username: "u".into(),
                password: "p".into(),
            });
            opts.ssh_auth = Some(SshAuthOptions {
                key_path: PathBuf::from("/k"),
                passphrase: None,
            });
            assert!(matches!(
                opts.validate(),
                Err(OptionsError::ConflictingAuth)
            ));
        }

        #[test]
        fn basic_requires_username() {
            let mut opts = valid_options();
            opts.basic_auth = Some(BasicAuthOptions {
                username: String::new(),
                password: "p".into(),
            });
            assert_eq!(
                message(opts.validate().unwrap_err()),
                "\"username\" is invalid: required if password specified (if using token, set username to \"token\")"
            );
        }

        #[test]
        fn basic_requires_password() {
            let mut opts = valid_options();
            opts.basic_auth = Some(BasicAuthOptions {
                username: "u".into(),
                password: String::new(),
            });
            assert_eq!(
                message(opts.validate().unwrap_err()),
                "\"password\" is invalid: required if username specified"
            );
        }

        #[test]
        fn ssh_requires_key_path() {
            let mut opts = valid_options();
            opts.ssh_auth = Some(SshAuthOptions {
                key_path: PathBuf::new(),
                passphrase: Some("phrase".into()),
            });
            assert_eq!(
                message(opts.validate().unwrap_err()),
                "\"key-path\" is invalid: required if ssh options set"
            );
        }

        #[test]
        fn storage_required() {
            let mut opts = Options::default();
            opts.bind_args(&args("repo", SHA)).unwrap();
            assert_eq!(
                message(opts.validate().unwrap_err()),
                "filesystem storage not initialized"
            );
        }
    }

    mod auth {
        use super::*;

        fn with_key(repo: &str) -> (tempfile::TempDir, Options) {
            let dir = tempfile::TempDir::new().unwrap();
            let key = dir.path().join("id_ed25519");
            std::fs::write(&key, "key").unwrap();
            let mut opts = valid_options();
            opts.repo = repo.to_string();
            opts.ssh_auth = Some(SshAuthOptions {
                key_path: key,
                passphrase: None,
            });
            (dir, opts)
        }

        #[test]
        fn none_when_no_auth() {
            assert!(valid_options().auth().unwrap().is_none());
        }

        #[test]
        fn ssh_defaults_user_to_git() {
            let (_dir, opts) = with_key("ssh://example.com/repo.git");
            let auth = opts.auth().unwrap().unwrap();
            assert_eq!(auth.username(), "git");
            assert_eq!(auth.kind(), "ssh");
        }

        #[test]
        fn ssh_user_from_scp_url() {
            let (_dir, opts) = with_key("deploy@example.com:org/repo.git");
            assert_eq!(opts.auth().unwrap().unwrap().username(), "deploy");
        }

        #[test]
        fn ssh_missing_key_is_error() {
            let mut opts = valid_options();
            opts.ssh_auth = Some(SshAuthOptions {
                key_path: PathBuf::from("/nonexistent/checkout-sha/key"),
                passphrase: None,
            });
            assert!(opts.auth().is_err());
        }

        #[test]
        fn basic_auth_passes_credentials() {
            let mut opts = valid_options();
            opts.basic_auth = Some(BasicAuthOptions {
                username: "alice".into(),
                password: "pw".into(),
            });
            assert_eq!(
                opts.auth().unwrap(),
                Some(AuthMethod::Basic {
                    username: "alice".into(),
                    password: "pw".into(),
                })
            );
        }

        #[test]
        fn debug_output_hides_secrets() {
            let opts = Options {
                basic_auth: Some(BasicAuthOptions {
                    username: "alice".into(),
                    password: "hunter2".into(),
                }),
                ..Options::default()
            };
            assert!(!format!("{opts:?}").contains("hunter2"));
        }
    }
}
