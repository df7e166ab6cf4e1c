//! ui::output
//!
//! User-facing lines, filtered by verbosity.
//!
//! # Design
//!
//! Results go to stdout and diagnostics to stderr, so `apiconf keys --json`
//! stays machine-readable while warnings are still visible. Structured
//! diagnostics for debugging go through `tracing` instead.

use std::fmt::Display;
use std::path::Path;

use crate::artifact::Outcome;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors and requested data only
    Quiet,
    /// Normal mode - one line per artifact
    Normal,
    /// Debug mode - unchanged artifacts are listed too
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
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

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Report what committing one artifact did.
///
/// Unchanged files are only listed in debug mode; stale files are always
/// reported since they decide the exit status.
pub fn outcome(path: &Path, outcome: Outcome, verbosity: Verbosity) {
    match outcome {
        Outcome::Stale => eprintln!("{}", format_outcome(path, outcome)),
        Outcome::Unchanged => debug(format_outcome(path, outcome), verbosity),
        Outcome::Created | Outcome::Updated => print(format_outcome(path, outcome), verbosity),
    }
}

/// `<outcome>: <path>`, padded so paths line up.
pub fn format_outcome(path: &Path, outcome: Outcome) -> String {
    format!("{:<9} {}", format!("{outcome}:"), path.display())
}
