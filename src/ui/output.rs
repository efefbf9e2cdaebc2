//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, output is machine-readable JSON.

use std::fmt::Display;

use crate::git::CheckoutReport;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
}

impl Verbosity {
    /// Create verbosity from the `--quiet` flag.
    ///
    /// Debug detail goes through tracing, not through this level.
    pub fn from_flags(quiet: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Format a list of items.
pub fn format_list<T: Display>(items: &[T], prefix: &str) -> String {
    items
        .iter()
        .map(|item| format!("{}{}", prefix, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human readable summary of a checkout.
///
/// In-memory checkouts list their files, since nothing was written to disk.
pub fn format_report(report: &CheckoutReport) -> String {
    let location = match &report.directory {
        Some(dir) => dir.display().to_string(),
        None => "memory".to_string(),
    };
    let noun = if report.file_count == 1 { "file" } else { "files" };

    let mut out = format!(
        "checked out {} from {} into {} ({} {})",
        report.sha.short(12),
        report.repo,
        location,
        report.file_count,
        noun
    );
    if report.dot_git_removed {
        out.push_str("\nremoved .git directory");
    }
    if !report.files.is_empty() {
        out.push('\n');
        out.push_str(&format_list(&report.files, "  "));
    }
    out
}

/// Serialize a checkout report as pretty JSON.
pub fn format_json(report: &CheckoutReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}
