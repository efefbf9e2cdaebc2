//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$CHECKOUT_SHA_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/checkout-sha/config.toml`
//! 3. `~/.checkout-sha/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use checkout_sha::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Directory: {}", config.directory().display());
//! println!("Storage: {}", config.storage());
//! ```

pub mod schema;

pub use schema::{AuthDefaults, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::StorageMode;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CHECKOUT_SHA_CONFIG";

/// Directory used when neither flag nor config names one.
pub const DEFAULT_DIRECTORY: &str = ".";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: FileConfig,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated. A missing config file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let paths = candidate_paths(|key| std::env::var(key).ok(), dirs::home_dir());
        match paths.into_iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");

        Ok(Self { file })
    }

    /// Configuration built from already parsed values.
    pub fn from_file(file: FileConfig) -> Self {
        Self { file }
    }

    /// Checkout directory (default: current directory).
    pub fn directory(&self) -> PathBuf {
        self.file
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIRECTORY))
    }

    /// Storage mode (default: `fs`).
    pub fn storage(&self) -> StorageMode {
        self.file.storage.unwrap_or_default()
    }

    /// Whether to remove `.git` after checkout (default: false).
    pub fn rm_dotgit(&self) -> bool {
        self.file.rm_dotgit.unwrap_or(false)
    }

    /// Default basic auth username.
    pub fn username(&self) -> Option<&str> {
        self.file.auth.as_ref()?.username.as_deref()
    }

    /// Default SSH key path with `~/` expanded.
    pub fn key_path(&self) -> Option<PathBuf> {
        let path = self.file.auth.as_ref()?.key_path.as_ref()?;
        Some(expand_home(path, dirs::home_dir()))
    }
}

/// Config file locations in search order.
fn candidate_paths(
    env: impl Fn(&str) -> Option<String>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = env(CONFIG_ENV).filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    if let Some(xdg_home) = env("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(xdg_home).join("checkout-sha/config.toml"));
    }
    if let Some(home) = home {
        paths.push(home.join(".checkout-sha/config.toml"));
    }

    paths
}

fn expand_home(path: &Path, home: Option<PathBuf>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
