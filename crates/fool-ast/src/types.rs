//! Type annotations as written in declarations.

/// A type annotation.
///
/// Converted into a `fool_core::Type` by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeExpr<'ast> {
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// A class name.
    Ref(&'ast str),
    /// `(params) -> ret`
    Arrow(&'ast ArrowTypeExpr<'ast>),
}

/// A function type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrowTypeExpr<'ast> {
    pub params: &'ast [TypeExpr<'ast>],
    pub ret: TypeExpr<'ast>,
}

impl TypeExpr<'_> {
    /// Whether this annotation denotes a closure.
    pub fn is_functional(&self) -> bool {
        matches!(self, TypeExpr::Arrow(_))
    }
}
