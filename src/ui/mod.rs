//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing output goes through this module so the quiet and JSON
//! modes are honored consistently. Diagnostics go through `tracing`.

pub mod output;
