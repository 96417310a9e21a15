//! Source location utilities.
//!
//! This module defines the line/column positions attached to tokens and
//! carried into diagnostics. Lines are 1-based; columns are stored 0-based
//! and rendered 1-based by diagnostic consumers.

use core::fmt;

/// A line/column position within a single source input.
///
/// The compiler is line-oriented: the reader hands out positions as it
/// buffers lines, so a `Location` is cheap to copy and compare. Tokens keep
/// the location of their first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: u32,
    pub col: u32,
}

impl Location {
    /// Construct a location for the given line and column.
    pub fn new(line: u32, col: u32) -> Location {
        Location { line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}
