//! cli
//!
//! Command-line interface layer for checkout-sha.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and merge them with config defaults
//! - Bind and validate [`Options`]
//! - Delegate the checkout to [`crate::git`] and render the report
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands validated
//! options to the git layer. All repository work happens there.

pub mod args;

pub use args::Cli;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::options::Options;
use crate::git::{self, CheckoutReport};
use crate::ui::output::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let config = Config::load().context("failed to load configuration")?;
    let report = execute(&cli, &config)?;

    if cli.json {
        println!("{}", output::format_json(&report)?);
    } else {
        let verbosity = Verbosity::from_flags(cli.quiet);
        output::print(output::format_report(&report), verbosity);
    }

    Ok(())
}

/// Bind, validate, and run a checkout for parsed arguments.
///
/// # Errors
///
/// Returns an error if the options are invalid or the checkout fails.
pub fn execute(cli: &Cli, config: &Config) -> Result<CheckoutReport> {
    let mut opts = Options::default();
    opts.bind_args(&cli.args)?;
    opts.bind_flags(&cli.flags(config));
    opts.set_storage_mode(cli.storage_mode(config))?;
    opts.validate()?;

    let report = git::checkout(&mut opts)
        .with_context(|| format!("checkout of {} failed", opts.repo))?;
    Ok(report)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--debug` enables debug events
/// for this crate and everything else stays at `warn`.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "warn,checkout_sha=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
