//! Core error type for the Veld toolchain.
//!
//! Language-level failures are expressed as `Diagnostic` values; `CoreError`
//! is the outer wrapper returned by the pipeline entry points. High-level
//! tools (CLI, test harnesses) are expected to handle I/O errors on their
//! side and render `Diagnostic`s for everything language-level.

use core::fmt;

use alloc::vec;
use alloc::vec::Vec;

use crate::diagnostic::Diagnostic;

#[derive(Debug, Clone)]
pub enum CoreError {
    /// One or more language-level errors, in order of emission.
    Diagnostics(Vec<Diagnostic>),

    /// A bug in the compiler or an unexpected unreachable situation. Not
    /// intended for user-facing messages.
    Internal(&'static str),
}

impl CoreError {
    pub fn from_diagnostic(diagnostic: Diagnostic) -> CoreError {
        CoreError::Diagnostics(vec![diagnostic])
    }

    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> CoreError {
        CoreError::Diagnostics(diagnostics)
    }

    pub fn internal(message: &'static str) -> CoreError {
        CoreError::Internal(message)
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Diagnostics(diags) => {
                if let Some(first) = diags.first() {
                    // Only the first message is shown here; the CLI renders
                    // the full list itself.
                    write!(f, "{}", first.message)
                } else {
                    write!(f, "diagnostic error (no messages)")
                }
            }
            CoreError::Internal(msg) => write!(f, "internal compiler error: {msg}"),
        }
    }
}
