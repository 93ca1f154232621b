//! Source location tracking for diagnostics.
//!
//! Every AST node carries a [`Span`]; the passes copy it into the errors they
//! report so the driver can point at the offending line.

use std::fmt;

/// A source position, represented by its starting line and column.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, 0 when unknown).
    pub col: u32,
}

impl Span {
    /// Create a span from a line and column.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Create a span that only knows its line.
    ///
    /// The AST-builder stage hands over line numbers only, so this is the
    /// common constructor.
    #[inline]
    pub fn at_line(line: u32) -> Self {
        Self { line, col: 0 }
    }

    /// Whether the column is known.
    #[inline]
    pub fn has_column(&self) -> bool {
        self.col != 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_column() {
            write!(f, "line {}:{}", self.line, self.col)
        } else {
            write!(f, "line {}", self.line)
        }
    }
}
