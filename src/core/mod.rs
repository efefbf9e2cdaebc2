//! core
//!
//! Core domain types, options, and configuration for checkout-sha.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Sha, StorageMode
//! - [`options`] - Argument/flag binding, storage selection, validation
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Options are fully validated before any network access

pub mod config;
pub mod options;
pub mod types;
