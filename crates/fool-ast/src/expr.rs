//! Expression nodes.
//!
//! Everything in the language is an expression; declarations only appear in
//! the `let` part of a program, function or method.

use crate::node::{Ident, NodeId};
use crate::ops::BinaryOp;
use fool_core::Span;

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Integer literal
    Int(IntLit),
    /// `true` / `false`
    Bool(BoolLit),
    /// `null`
    Null(Span),
    /// Use of a variable, parameter, field or function name
    Ident(IdentExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// `!e`
    Not(&'ast NotExpr<'ast>),
    /// `if (c) then { a } else { b }`
    If(&'ast IfExpr<'ast>),
    /// `f(args)`, or `m(args)` for a sibling method inside a class
    Call(&'ast CallExpr<'ast>),
    /// `obj.m(args)`
    MethodCall(&'ast MethodCallExpr<'ast>),
    /// `new C(args)`
    New(&'ast NewExpr<'ast>),
    /// `print(e)`
    Print(&'ast PrintExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Int(e) => e.span,
            Self::Bool(e) => e.span,
            Self::Null(span) => *span,
            Self::Ident(e) => e.name.span,
            Self::Binary(e) => e.span,
            Self::Not(e) => e.span,
            Self::If(e) => e.span,
            Self::Call(e) => e.span,
            Self::MethodCall(e) => e.span,
            Self::New(e) => e.span,
            Self::Print(e) => e.span,
        }
    }
}

/// An integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLit {
    pub value: i32,
    pub span: Span,
}

/// A boolean literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

/// A name used as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub left: Expr<'ast>,
    pub op: BinaryOp,
    pub right: Expr<'ast>,
    pub span: Span,
}

/// Boolean negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotExpr<'ast> {
    pub operand: Expr<'ast>,
    pub span: Span,
}

/// A conditional expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfExpr<'ast> {
    pub condition: Expr<'ast>,
    pub then_expr: Expr<'ast>,
    pub else_expr: Expr<'ast>,
    pub span: Span,
}

/// A call through a name in scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    pub callee: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// A method invocation on an object held in a variable, parameter or field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodCallExpr<'ast> {
    pub id: NodeId,
    pub receiver: Ident<'ast>,
    pub method: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// Object construction. One argument per field, inherited fields first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewExpr<'ast> {
    pub id: NodeId,
    pub class: Ident<'ast>,
    pub args: &'ast [Expr<'ast>],
    pub span: Span,
}

/// Print a value and yield it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrintExpr<'ast> {
    pub value: Expr<'ast>,
    pub span: Span,
}
