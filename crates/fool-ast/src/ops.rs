//! Operator definitions for expressions.

use std::fmt;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `==`
    Equal,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
}

/// How the type checker treats the operands of a [`BinaryOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Integer operands, integer result.
    Arithmetic,
    /// Boolean operands, boolean result.
    Logical,
    /// Mutually comparable non-functional operands, boolean result.
    Comparison,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Equal => "==",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
        }
    }

    /// Word used for this operator in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            BinaryOp::Add => "sum",
            BinaryOp::Sub => "subtraction",
            BinaryOp::Mul => "multiplication",
            BinaryOp::Div => "division",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Equal => "equal",
            BinaryOp::LessEqual => "less equal",
            BinaryOp::GreaterEqual => "greater equal",
        }
    }

    pub fn class(&self) -> OpClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => OpClass::Arithmetic,
            BinaryOp::And | BinaryOp::Or => OpClass::Logical,
            BinaryOp::Equal | BinaryOp::LessEqual | BinaryOp::GreaterEqual => OpClass::Comparison,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_classes() {
        assert_eq!(BinaryOp::Div.class(), OpClass::Arithmetic);
        assert_eq!(BinaryOp::Or.class(), OpClass::Logical);
        assert_eq!(BinaryOp::GreaterEqual.class(), OpClass::Comparison);
    }

    #[test]
    fn operator_display() {
        assert_eq!(BinaryOp::LessEqual.to_string(), "<=");
        assert_eq!(BinaryOp::Mul.describe(), "multiplication");
    }
}
