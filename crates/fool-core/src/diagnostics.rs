//! Collected compiler messages.
//!
//! The passes report errors through their own typed error lists; the driver
//! renders them into a [`Diagnostics`] collection so callers get one ordered
//! list with per-stage counts.

use std::fmt;

use crate::{ResolveError, Span, TypeError};

/// The compiler stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Lexing, parsing and AST building, reported by an external front end.
    External,
    /// Scope and offset resolution.
    Resolution,
    /// Type checking.
    TypeCheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::External => f.write_str("front end"),
            Stage::Resolution => f.write_str("symbol table"),
            Stage::TypeCheck => f.write_str("type checking"),
        }
    }
}

/// A single compiler message.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Which stage reported it.
    pub stage: Stage,
    /// The rendered message.
    pub message: String,
    /// Where it happened.
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)
    }
}

impl From<&ResolveError> for Diagnostic {
    fn from(err: &ResolveError) -> Self {
        Self {
            stage: Stage::Resolution,
            message: err.to_string(),
            span: err.span(),
        }
    }
}

impl From<&TypeError> for Diagnostic {
    fn from(err: &TypeError) -> Self {
        Self {
            stage: Stage::TypeCheck,
            message: err.to_string(),
            span: err.span(),
        }
    }
}

/// An ordered collection of diagnostics with per-stage error counters.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    external_errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record errors counted by a stage outside this crate (lexer, parser).
    ///
    /// Only the count is known, so no message is stored.
    pub fn add_external_errors(&mut self, count: usize) {
        self.external_errors += count;
    }

    /// Number of errors reported by a stage.
    pub fn count(&self, stage: Stage) -> usize {
        let recorded = self.diagnostics.iter().filter(|d| d.stage == stage).count();
        match stage {
            Stage::External => recorded + self.external_errors,
            _ => recorded,
        }
    }

    /// Sum of all stage counters.
    pub fn error_count(&self) -> usize {
        self.diagnostics.len() + self.external_errors
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.external_errors == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }
        write!(f, "You had a total of {} front-end errors.", self.error_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SymbolKind;

    #[test]
    fn counts_per_stage() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());

        let resolve = ResolveError::Undeclared {
            kind: SymbolKind::Identifier,
            name: "y".to_string(),
            span: Span::at_line(3),
        };
        diagnostics.push((&resolve).into());
        let ty = TypeError::NonBooleanCondition {
            span: Span::at_line(5),
        };
        diagnostics.push((&ty).into());
        diagnostics.add_external_errors(2);

        assert_eq!(diagnostics.count(Stage::Resolution), 1);
        assert_eq!(diagnostics.count(Stage::TypeCheck), 1);
        assert_eq!(diagnostics.count(Stage::External), 2);
        assert_eq!(diagnostics.error_count(), 4);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn display_lists_messages_and_total() {
        let mut diagnostics = Diagnostics::new();
        let resolve = ResolveError::ClassNotGlobal {
            name: "A".to_string(),
            span: Span::at_line(9),
        };
        diagnostics.push((&resolve).into());
        let text = diagnostics.to_string();
        assert!(text.contains("symbol table error: class 'A' at line 9"));
        assert!(text.ends_with("You had a total of 1 front-end errors."));
    }
}
