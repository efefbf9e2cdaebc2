//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Flags
//!
//! - `--directory` / `-d`: Checkout directory
//! - `--storage`: `fs` (default) or `mem`
//! - `--username` / `-u`, `--password` / `-p`: Basic or token auth
//! - `--key-path` / `-k`, `--key-passphrase`: SSH key auth
//! - `--rm-dotgit`: Remove `.git` after checkout
//! - `--debug`, `--quiet` / `-q`, `--json`: Output control

use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::core::config::Config;
use crate::core::options::Flags;
use crate::core::types::StorageMode;

/// Check out a single commit of a remote Git repository
#[derive(Parser, Debug)]
#[command(name = "checkout-sha")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Check out a public repository into ./src
    checkout-sha https://github.com/org/repo.git 4b825dc642cb6eb9a060e54bf8d69288fbee4904 -d src

    # Token auth; set username to \"token\" when using a token
    checkout-sha https://github.com/org/private.git <SHA> -u token -p \"$GITHUB_TOKEN\"

    # SSH key auth
    checkout-sha git@github.com:org/repo.git <SHA> -k ~/.ssh/id_ed25519

    # Fetch into memory and list the files without touching disk
    checkout-sha https://github.com/org/repo.git <SHA> --storage mem")]
pub struct Cli {
    /// Repository URL followed by the full 40 character commit SHA
    #[arg(value_name = "REPO SHA")]
    pub args: Vec<String>,

    /// Directory to check out into [default: current directory]
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Storage mode: fs (on disk) or mem (in memory) [default: fs]
    #[arg(long, value_name = "MODE")]
    pub storage: Option<StorageMode>,

    /// Username for basic auth (use "token" with a token as password)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password or token for basic auth
    ///
    /// The environment value is ignored when --key-path is given without
    /// --username.
    #[arg(short, long, env = "CHECKOUT_SHA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Path to a PEM encoded SSH private key
    #[arg(short, long)]
    pub key_path: Option<PathBuf>,

    /// Passphrase for the SSH private key
    ///
    /// The environment value only applies when a key path is set.
    #[arg(long, env = "CHECKOUT_SHA_KEY_PASSPHRASE", hide_env_values = true)]
    pub key_passphrase: Option<String>,

    /// Remove the .git directory after checkout
    #[arg(long = "rm-dotgit")]
    pub rm_dotgit: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print the checkout report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(skip)]
    password_from_env: bool,

    #[arg(skip)]
    key_passphrase_from_env: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        let matches = Self::command().get_matches();
        Self::from_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parse arguments from an iterator, as [`Cli::parse_args`] does.
    pub fn try_parse_args_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut cli =
            Self::from_arg_matches(matches).map_err(|e| e.format(&mut Self::command()))?;
        let from_env = |id: &str| matches.value_source(id) == Some(ValueSource::EnvVariable);
        cli.password_from_env = from_env("password");
        cli.key_passphrase_from_env = from_env("key_passphrase");
        Ok(cli)
    }

    /// Flag values with config defaults filled in.
    ///
    /// Flags win over config. The config username only fills in when a
    /// password is given, and the config key path only when no basic auth
    /// flag is given, so config defaults never enable both auth modes.
    /// Secrets taken from the environment follow the same rule: the password
    /// is dropped for `--key-path` without `--username`, and the passphrase
    /// is dropped when no key path is set.
    pub fn flags(&self, config: &Config) -> Flags {
        let env_password_for_ssh =
            self.password_from_env && self.username.is_none() && self.key_path.is_some();
        let password = self.password.clone().filter(|_| !env_password_for_ssh);
        let basic_given = self.username.is_some() || password.is_some();

        let username = self.username.clone().or_else(|| {
            password
                .as_ref()
                .and_then(|_| config.username().map(str::to_string))
        });
        let key_path = self
            .key_path
            .clone()
            .or_else(|| if basic_given { None } else { config.key_path() });
        let key_passphrase = self
            .key_passphrase
            .clone()
            .filter(|_| !self.key_passphrase_from_env || key_path.is_some());

        Flags {
            directory: self.directory.clone().unwrap_or_else(|| config.directory()),
            username,
            password,
            key_path,
            key_passphrase,
            rm_dotgit: self.rm_dotgit || config.rm_dotgit(),
        }
    }

    /// Storage mode with the config default filled in.
    pub fn storage_mode(&self, config: &Config) -> StorageMode {
        self.storage.unwrap_or_else(|| config.storage())
    }
}
