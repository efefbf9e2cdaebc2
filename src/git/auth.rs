//! git::auth
//!
//! Credentials handed to git2 when talking to the remote.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default SSH user when the URL does not name one.
pub const DEFAULT_SSH_USER: &str = "git";

/// Username used for token auth when none is given.
///
/// Token auth ignores the username, but libgit2 rejects an empty one.
pub const TOKEN_USER: &str = "token";

/// Number of times git2 may ask for credentials before we give up.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Errors from building credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The SSH private key could not be read.
    #[error("failed to load ssh key '{path}': {source}")]
    KeyUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A resolved authentication method.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Public key auth with a private key file.
    SshKey {
        username: String,
        key_path: PathBuf,
        passphrase: Option<String>,
    },
    /// HTTP basic auth (username/password or token).
    Basic { username: String, password: String },
}

impl std::fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::SshKey {
                username, key_path, ..
            } => f
                .debug_struct("SshKey")
                .field("username", username)
                .field("key_path", key_path)
                .field("passphrase", &"<redacted>")
                .finish(),
            AuthMethod::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

impl AuthMethod {
    /// Build SSH key auth, checking the key file can be read.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyUnreadable`] if the key file cannot be read.
    pub fn ssh_key(
        username: impl Into<String>,
        key_path: &Path,
        passphrase: Option<String>,
    ) -> Result<Self, AuthError> {
        std::fs::File::open(key_path).map_err(|source| AuthError::KeyUnreadable {
            path: key_path.to_path_buf(),
            source,
        })?;

        Ok(AuthMethod::SshKey {
            username: username.into(),
            key_path: key_path.to_path_buf(),
            passphrase: passphrase.filter(|p| !p.is_empty()),
        })
    }

    /// Build basic auth. An empty username becomes [`TOKEN_USER`].
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        let username = if username.is_empty() {
            TOKEN_USER.to_string()
        } else {
            username
        };
        AuthMethod::Basic {
            username,
            password: password.into(),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::SshKey { .. } => "ssh",
            AuthMethod::Basic { .. } => "basic",
        }
    }

    /// The username presented to the remote.
    pub fn username(&self) -> &str {
        match self {
            AuthMethod::SshKey { username, .. } | AuthMethod::Basic { username, .. } => username,
        }
    }

    fn credentials(&self, allowed: git2::CredentialType) -> Result<git2::Cred, git2::Error> {
        match self {
            AuthMethod::SshKey { username, .. }
                if allowed.contains(git2::CredentialType::USERNAME)
                    && !allowed.contains(git2::CredentialType::SSH_KEY) =>
            {
                git2::Cred::username(username)
            }
            AuthMethod::SshKey {
                username,
                key_path,
                passphrase,
            } => git2::Cred::ssh_key(username, None, key_path, passphrase.as_deref()),
            AuthMethod::Basic { username, password } => {
                git2::Cred::userpass_plaintext(username, password)
            }
        }
    }
}

/// Build remote callbacks that answer credential requests with `auth`.
pub(crate) fn remote_callbacks(auth: Option<&AuthMethod>) -> git2::RemoteCallbacks<'_> {
    let mut callbacks = git2::RemoteCallbacks::new();
    if let Some(auth) = auth {
        callbacks.credentials(credential_handler(auth));
    }
    callbacks
}

/// Credential callback that answers with `auth` until the remote has
/// rejected it [`MAX_CREDENTIAL_ATTEMPTS`] times.
fn credential_handler(
    auth: &AuthMethod,
) -> impl FnMut(&str, Option<&str>, git2::CredentialType) -> Result<git2::Cred, git2::Error> + '_ {
    let mut attempts = 0;
    move |url, _username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "{} authentication rejected by {url}",
                auth.kind()
            )));
        }
        tracing::debug!(auth = auth.kind(), url, attempt = attempts, "supplying credentials");
        auth.credentials(allowed)
    }
}

/// Extract the user named in an SSH URL.
///
/// Handles `ssh://user@host/path` and scp-like `user@host:path`. Returns
/// `None` when no user is present.
///
/// # Example
///
/// ```
/// use checkout_sha::git::ssh_user_from_url;
///
/// assert_eq!(ssh_user_from_url("deploy@example.com:org/repo.git").as_deref(), Some("deploy"));
/// assert_eq!(ssh_user_from_url("ssh://ci@example.com/org/repo.git").as_deref(), Some("ci"));
/// assert_eq!(ssh_user_from_url("example.com:org/repo.git"), None);
/// ```
pub fn ssh_user_from_url(url: &str) -> Option<String> {
    let authority = match url.split_once("://") {
        Some((_, rest)) => rest.split('/').next().unwrap_or(rest),
        None => {
            // scp-like syntax: the host part ends at the first ':' and never
            // contains a '/'.
            let (host, _) = url.split_once(':')?;
            if host.contains('/') {
                return None;
            }
            host
        }
    };

    let (userinfo, _) = authority.rsplit_once('@')?;
    let user = userinfo.split(':').next().unwrap_or(userinfo);
    if user.is_empty() {
        None
    } else {
        Some(user.to_string())
    }
}
