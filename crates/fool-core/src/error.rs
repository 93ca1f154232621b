//! Error types for every phase of the compiler and the reference machine.
//!
//! ## Error Hierarchy
//!
//! ```text
//! FoolError (top-level wrapper)
//! ├── ResolveError   - scope and offset resolution
//! ├── TypeError      - structural type violations
//! ├── CodegenError   - undecorated nodes reaching code generation
//! ├── AssemblyError  - reading instruction text
//! └── RuntimeError   - executing instructions
//! ```
//!
//! Type checking itself returns [`CheckError`], which separates genuine
//! violations from the "this subtree was left undecorated by resolution" case
//! that must not be reported twice.

use std::fmt;

use thiserror::Error;

use crate::Span;

// ============================================================================
// Resolution Errors
// ============================================================================

/// What kind of symbol an error talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Variable,
    Parameter,
    Field,
    Method,
    Class,
    /// A name used in an expression, which could be a variable, a parameter
    /// or a field.
    Identifier,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Field => "field",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Identifier => "identifier",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors recorded by the scope and offset resolver.
///
/// None of these stop the pass; they are collected and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The same name was bound twice in one scope.
    #[error("{kind} '{name}' at {span} already declared")]
    Redeclared {
        kind: SymbolKind,
        name: String,
        span: Span,
    },

    /// A field or method name was repeated inside one class body.
    #[error("{kind} '{name}' at {span} already declared within class '{class}'")]
    DuplicateMember {
        kind: SymbolKind,
        name: String,
        class: String,
        span: Span,
    },

    /// A field overrides an inherited method or the other way round.
    #[error("cannot override {overridden} '{name}' with a {by} at {span}")]
    IllegalOverride {
        name: String,
        overridden: SymbolKind,
        by: SymbolKind,
        span: Span,
    },

    /// A class was declared outside the global scope.
    #[error("class '{name}' at {span} not declared in the global scope")]
    ClassNotGlobal { name: String, span: Span },

    /// A name could not be resolved.
    #[error("{kind} '{name}' at {span} not declared")]
    Undeclared {
        kind: SymbolKind,
        name: String,
        span: Span,
    },

    /// The class named in an `extends` clause does not exist.
    #[error("superclass '{superclass}' of class '{class}' at {span} not declared")]
    UndeclaredSuperclass {
        class: String,
        superclass: String,
        span: Span,
    },

    /// A method was invoked on something that is not a class reference.
    #[error("'{name}' at {span} is not an object")]
    NotAnObject { name: String, span: Span },

    /// The receiver's class has no such method.
    #[error("method '{method}' at {span} not declared in class '{class}'")]
    UndeclaredMethod {
        class: String,
        method: String,
        span: Span,
    },
}

impl ResolveError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ResolveError::Redeclared { span, .. } => *span,
            ResolveError::DuplicateMember { span, .. } => *span,
            ResolveError::IllegalOverride { span, .. } => *span,
            ResolveError::ClassNotGlobal { span, .. } => *span,
            ResolveError::Undeclared { span, .. } => *span,
            ResolveError::UndeclaredSuperclass { span, .. } => *span,
            ResolveError::NotAnObject { span, .. } => *span,
            ResolveError::UndeclaredMethod { span, .. } => *span,
        }
    }
}

// ============================================================================
// Type Errors
// ============================================================================

/// A genuine type violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// An arithmetic operand is not an integer.
    #[error("non integers in {op} at {span}")]
    NonInteger { op: &'static str, span: Span },

    /// A boolean operand is not a boolean.
    #[error("non booleans in {op} at {span}")]
    NonBoolean { op: &'static str, span: Span },

    /// The condition of an `if` is not a boolean.
    #[error("non boolean condition in if at {span}")]
    NonBooleanCondition { span: Span },

    /// A function or method value was used in a comparison.
    #[error("cannot compare functional types in {op} at {span}")]
    FunctionalComparison { op: &'static str, span: Span },

    /// Neither operand of a comparison is a subtype of the other.
    #[error("incompatible types in {op} at {span}")]
    IncomparableOperands { op: &'static str, span: Span },

    /// The branches of an `if` have no common ancestor.
    #[error("incompatible types in then-else branches at {span}")]
    IncompatibleBranches { span: Span },

    /// Something that is neither a function nor a method was invoked.
    #[error("invocation of a non-function '{name}' at {span}")]
    NotCallable { name: String, span: Span },

    /// Argument count does not match the parameter count.
    #[error("wrong number of parameters in the invocation of '{name}' at {span}: expected {expected}, found {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// An argument is not a subtype of its parameter.
    #[error("wrong type for {position}-th parameter in the invocation of '{name}' at {span}")]
    WrongArgument {
        name: String,
        position: usize,
        span: Span,
    },

    /// `new` applied to something that is not a class.
    #[error("instancing of a non-class '{name}' at {span}")]
    NotAClass { name: String, span: Span },

    /// `new` with the wrong number of field values.
    #[error("wrong number of fields to instance an object of class '{class}' at {span}: expected {expected}, found {found}")]
    WrongFieldCount {
        class: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A field value is not a subtype of the field type.
    #[error("wrong type for {position}-th field to instance an object of class '{class}' at {span}")]
    WrongFieldValue {
        class: String,
        position: usize,
        span: Span,
    },

    /// A method name used as a value.
    #[error("wrong usage of method '{name}' at {span}")]
    MethodAsValue { name: String, span: Span },

    /// A class name used as a value.
    #[error("wrong usage of class identifier '{name}' at {span}")]
    ClassAsValue { name: String, span: Span },

    /// A variable initializer does not fit the declared type.
    #[error("incompatible value for variable '{name}' at {span}")]
    IncompatibleVariable { name: String, span: Span },

    /// A function or method body does not fit the declared return type.
    #[error("wrong return type for {kind} '{name}' at {span}")]
    WrongReturn {
        kind: SymbolKind,
        name: String,
        span: Span,
    },

    /// An overriding member is not a subtype of the member it replaces.
    #[error("{kind} '{name}' of class '{class}' at {span} is not a subtype of the {kind} it overrides")]
    BadOverride {
        kind: SymbolKind,
        class: String,
        name: String,
        span: Span,
    },
}

impl TypeError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            TypeError::NonInteger { span, .. } => *span,
            TypeError::NonBoolean { span, .. } => *span,
            TypeError::NonBooleanCondition { span } => *span,
            TypeError::FunctionalComparison { span, .. } => *span,
            TypeError::IncomparableOperands { span, .. } => *span,
            TypeError::IncompatibleBranches { span } => *span,
            TypeError::NotCallable { span, .. } => *span,
            TypeError::WrongArity { span, .. } => *span,
            TypeError::WrongArgument { span, .. } => *span,
            TypeError::NotAClass { span, .. } => *span,
            TypeError::WrongFieldCount { span, .. } => *span,
            TypeError::WrongFieldValue { span, .. } => *span,
            TypeError::MethodAsValue { span, .. } => *span,
            TypeError::ClassAsValue { span, .. } => *span,
            TypeError::IncompatibleVariable { span, .. } => *span,
            TypeError::WrongReturn { span, .. } => *span,
            TypeError::BadOverride { span, .. } => *span,
        }
    }
}

/// Why a type could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// A real violation; reported and counted.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// The subtree references something resolution could not decorate.
    /// The resolver already reported it, so this is absorbed silently.
    #[error("type could not be determined due to earlier errors")]
    Incomplete,
}

// ============================================================================
// Code Generation Errors
// ============================================================================

/// Code generation met a node that resolution left undecorated.
///
/// The pipeline only generates code for programs without front-end errors,
/// so these only surface when the pass is driven directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("'{name}' at {span} was not resolved")]
    Unresolved { name: String, span: Span },

    #[error("class '{name}' at {span} has no layout")]
    UnknownClass { name: String, span: Span },
}

impl CodegenError {
    pub fn span(&self) -> Span {
        match self {
            CodegenError::Unresolved { span, .. } => *span,
            CodegenError::UnknownClass { span, .. } => *span,
        }
    }
}

// ============================================================================
// Machine Errors
// ============================================================================

/// Errors while reading instruction text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    /// The mnemonic is not part of the instruction set.
    #[error("unknown instruction '{mnemonic}' on line {line}")]
    UnknownInstruction { mnemonic: String, line: usize },

    /// An instruction is missing its operand or has a malformed one.
    #[error("invalid operand for '{mnemonic}' on line {line}")]
    InvalidOperand { mnemonic: String, line: usize },

    /// A branch or push refers to a label that is never defined.
    #[error("undefined label '{label}' on line {line}")]
    UndefinedLabel { label: String, line: usize },

    /// A label is defined twice.
    #[error("duplicate label '{label}' on line {line}")]
    DuplicateLabel { label: String, line: usize },
}

impl AssemblyError {
    /// The 1-indexed line of the instruction text.
    pub fn line(&self) -> usize {
        match self {
            AssemblyError::UnknownInstruction { line, .. } => *line,
            AssemblyError::InvalidOperand { line, .. } => *line,
            AssemblyError::UndefinedLabel { line, .. } => *line,
            AssemblyError::DuplicateLabel { line, .. } => *line,
        }
    }
}

/// Errors raised while executing instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The stack grew into the heap.
    #[error("stack overflow at instruction {ip}")]
    StackOverflow { ip: usize },

    /// A pop on an empty stack.
    #[error("stack underflow at instruction {ip}")]
    StackUnderflow { ip: usize },

    /// A load or store outside memory.
    #[error("invalid memory address {address} at instruction {ip}")]
    InvalidAddress { address: i64, ip: usize },

    /// A jump outside the code.
    #[error("invalid code address {address} at instruction {ip}")]
    InvalidCodeAddress { address: i64, ip: usize },

    /// Integer division by zero.
    #[error("division by zero at instruction {ip}")]
    DivisionByZero { ip: usize },

    /// The configured step budget was exhausted.
    #[error("step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for the whole pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FoolError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Code generation was skipped because earlier stages reported errors.
    #[error("compilation stopped after {count} front-end errors")]
    FrontEnd { count: usize },
}

impl FoolError {
    pub fn is_resolve(&self) -> bool {
        matches!(self, FoolError::Resolve(_))
    }

    pub fn is_type(&self) -> bool {
        matches!(self, FoolError::Type(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, FoolError::Runtime(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::Redeclared {
            kind: SymbolKind::Variable,
            name: "x".to_string(),
            span: Span::at_line(4),
        };
        assert_eq!(err.to_string(), "variable 'x' at line 4 already declared");
        assert_eq!(err.span(), Span::at_line(4));
    }

    #[test]
    fn override_error_display() {
        let err = ResolveError::IllegalOverride {
            name: "m".to_string(),
            overridden: SymbolKind::Method,
            by: SymbolKind::Field,
            span: Span::at_line(2),
        };
        assert_eq!(err.to_string(), "cannot override method 'm' with a field at line 2");
    }

    #[test]
    fn check_error_wraps_type_error() {
        let err: CheckError = TypeError::NonBooleanCondition {
            span: Span::at_line(1),
        }
        .into();
        assert_eq!(err.to_string(), "non boolean condition in if at line 1");
        assert_ne!(err, CheckError::Incomplete);
    }

    #[test]
    fn unified_conversion() {
        let err: FoolError = RuntimeError::DivisionByZero { ip: 3 }.into();
        assert!(err.is_runtime());
        assert!(!err.is_type());
        assert_eq!(err.to_string(), "division by zero at instruction 3");
    }

    #[test]
    fn assembly_error_line() {
        let err = AssemblyError::UndefinedLabel {
            label: "label9".to_string(),
            line: 12,
        };
        assert_eq!(err.line(), 12);
    }
}
