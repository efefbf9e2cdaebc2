//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Sha`] - Full 40 character Git commit identifier
//! - [`StorageMode`] - Where objects and the worktree live (`fs` or `mem`)
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented.
//!
//! # Examples
//!
//! ```
//! use checkout_sha::core::types::{Sha, StorageMode};
//!
//! let sha = Sha::new("0123456789abcdef0123456789abcdef01234567").unwrap();
//! assert_eq!(sha.short(7), "0123456");
//!
//! let mode: StorageMode = "mem".parse().unwrap();
//! assert_eq!(mode, StorageMode::Memory);
//!
//! assert!(Sha::new("abc123").is_err());
//! assert!("tape".parse::<StorageMode>().is_err());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid sha: {0}")]
    InvalidSha(String),

    #[error("{0:?} is an invalid storage mode")]
    InvalidStorageMode(String),
}

/// A full SHA-1 commit identifier.
///
/// Only the full 40 character form is accepted; abbreviated SHAs are
/// ambiguous and cannot be fetched by id. The value is normalized to
/// lowercase.
///
/// # Example
///
/// ```
/// use checkout_sha::core::types::Sha;
///
/// let sha = Sha::new("ABCDEF0123456789ABCDEF0123456789ABCDEF01").unwrap();
/// assert_eq!(sha.as_str(), "abcdef0123456789abcdef0123456789abcdef01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha(String);

impl Sha {
    /// Length of a hex encoded SHA-1.
    pub const LEN: usize = 40;

    /// Create a new validated SHA.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSha` unless the input is exactly 40
    /// hexadecimal characters.
    pub fn new(sha: impl Into<String>) -> Result<Self, TypeError> {
        let sha = sha.into();
        Self::validate(&sha)?;
        Ok(Self(sha.to_ascii_lowercase()))
    }

    /// Check whether a string is a full hexadecimal SHA-1.
    pub fn is_valid(sha: &str) -> bool {
        Self::validate(sha).is_ok()
    }

    fn validate(sha: &str) -> Result<(), TypeError> {
        if sha.len() != Self::LEN {
            return Err(TypeError::InvalidSha(format!(
                "expected {} hex characters, got {}",
                Self::LEN,
                sha.len()
            )));
        }
        if !sha.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidSha("sha must be hexadecimal".into()));
        }
        Ok(())
    }

    /// Get an abbreviated form of the SHA.
    ///
    /// Returns the first `len` characters, or the full SHA if `len` is
    /// larger.
    pub fn short(&self, len: usize) -> &str {
        let end = len.min(self.0.len());
        &self.0[..end]
    }

    /// Get the SHA as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sha {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Sha> for String {
    fn from(sha: Sha) -> Self {
        sha.0
    }
}

impl AsRef<str> for Sha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where fetched objects and the checked out tree are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageMode {
    /// Objects under `<dir>/.git`, files written to `<dir>`.
    #[default]
    Filesystem,
    /// Objects and files held in memory for the lifetime of the process.
    Memory,
}

impl StorageMode {
    /// The flag value for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Filesystem => "fs",
            StorageMode::Memory => "mem",
        }
    }
}

impl FromStr for StorageMode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fs" => Ok(StorageMode::Filesystem),
            "mem" => Ok(StorageMode::Memory),
            other => Err(TypeError::InvalidStorageMode(other.to_string())),
        }
    }
}

impl TryFrom<String> for StorageMode {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StorageMode> for String {
    fn from(mode: StorageMode) -> Self {
        mode.as_str().to_string()
    }
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod sha {
        use super::*;

        const VALID: &str = "0123456789abcdef0123456789abcdef01234567";

        #[test]
        fn valid_sha_accepted() {
            let sha = Sha::new(VALID).unwrap();
            assert_eq!(sha.as_str(), VALID);
        }

        #[test]
        fn uppercase_normalized() {
            let sha = Sha::new(VALID.to_uppercase()).unwrap();
            assert_eq!(sha.as_str(), VALID);
        }

        #[test]
        fn mixed_case_accepted() {
            assert!(Sha::new("0123456789ABCDEF0123456789abcdef01234567").is_ok());
        }

        #[test]
        fn short_sha_rejected() {
            assert!(Sha::new("0123456").is_err());
        }

        #[test]
        fn sha256_length_rejected() {
            assert!(Sha::new("a".repeat(64)).is_err());
        }

        #[test]
        fn one_too_long_rejected() {
            assert!(Sha::new(format!("{VALID}0")).is_err());
        }

        #[test]
        fn non_hex_rejected() {
            let err = Sha::new("g123456789abcdef0123456789abcdef01234567").unwrap_err();
            assert_eq!(err, TypeError::InvalidSha("sha must be hexadecimal".into()));
        }

        #[test]
        fn empty_rejected() {
            assert!(!Sha::is_valid(""));
        }

        #[test]
        fn short_clamps_to_length() {
            let sha = Sha::new(VALID).unwrap();
            assert_eq!(sha.short(7), "0123456");
            assert_eq!(sha.short(100), VALID);
        }

        #[test]
        fn serde_roundtrip_validates() {
            let json = format!("\"{VALID}\"");
            let sha: Sha = serde_json::from_str(&json).unwrap();
            assert_eq!(sha.as_str(), VALID);
            assert!(serde_json::from_str::<Sha>("\"nope\"").is_err());
        }
    }

    mod storage_mode {
        use super::*;

        #[test]
        fn parses_known_modes() {
            assert_eq!("fs".parse::<StorageMode>(), Ok(StorageMode::Filesystem));
            assert_eq!("mem".parse::<StorageMode>(), Ok(StorageMode::Memory));
        }

        #[test]
        fn unknown_mode_message() {
            let err = "disk".parse::<StorageMode>().unwrap_err();
            assert_eq!(err.to_string(), "\"disk\" is an invalid storage mode");
        }

        #[test]
        fn mode_names_are_case_sensitive() {
            assert!("FS".parse::<StorageMode>().is_err());
        }

        #[test]
        fn display_matches_flag_value() {
            assert_eq!(StorageMode::Filesystem.to_string(), "fs");
            assert_eq!(StorageMode::Memory.to_string(), "mem");
        }

        #[test]
        fn default_is_filesystem() {
            assert_eq!(StorageMode::default(), StorageMode::Filesystem);
        }
    }
}
