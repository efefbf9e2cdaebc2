//! checkout-sha - check out a single commit of a remote Git repository
//!
//! Given a repository URL and a full 40 character commit SHA, checkout-sha
//! fetches the commit and writes its tree to a directory (`fs` storage) or
//! holds it in memory (`mem` storage). Repositories can be reached
//! anonymously, with HTTP basic/token auth, or with an SSH key.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, binds options)
//! - [`core`] - Domain types, options validation, and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. Options are validated before any network access
//! 2. At most one auth mode is active
//! 3. Only full 40 character SHAs are checked out

pub mod cli;
pub mod core;
pub mod git;
pub mod ui;
