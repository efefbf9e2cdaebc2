//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing: present values must not be
//! empty, and unknown keys are rejected at parse time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::StorageMode;

/// User configuration.
///
/// Every value is a default that the matching command-line flag overrides.
///
/// # Example
///
/// ```toml
/// directory = "checkouts/current"
/// storage = "fs"
/// rm_dotgit = true
///
/// [auth]
/// username = "token"
/// key_path = "~/.ssh/id_ed25519"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Default checkout directory
    pub directory: Option<PathBuf>,

    /// Default storage mode (`fs` or `mem`)
    pub storage: Option<StorageMode>,

    /// Remove `.git` after checkout by default
    pub rm_dotgit: Option<bool>,

    /// Auth defaults
    pub auth: Option<AuthDefaults>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.directory {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "directory cannot be empty".into(),
                ));
            }
        }

        if let Some(auth) = &self.auth {
            auth.validate()?;
        }

        Ok(())
    }
}

/// Auth defaults.
///
/// Passwords and passphrases are not accepted here; pass them as flags or
/// environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthDefaults {
    /// Basic auth username
    pub username: Option<String>,

    /// SSH private key path; a leading `~/` is expanded
    pub key_path: Option<PathBuf>,
}

impl AuthDefaults {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.username.as_deref() == Some("") {
            return Err(ConfigError::InvalidValue(
                "auth.username cannot be empty".into(),
            ));
        }
        if self
            .key_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::InvalidValue(
                "auth.key_path cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
