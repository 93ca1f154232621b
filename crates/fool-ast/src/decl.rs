//! Declaration nodes.

use crate::expr::Expr;
use crate::node::{Ident, NodeId};
use crate::types::TypeExpr;
use fool_core::Span;

/// A declaration in a `let` block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decl<'ast> {
    Fun(&'ast FunDecl<'ast>),
    Var(&'ast VarDecl<'ast>),
    Class(&'ast ClassDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    pub fn id(&self) -> NodeId {
        match self {
            Decl::Fun(d) => d.id,
            Decl::Var(d) => d.id,
            Decl::Class(d) => d.id,
        }
    }

    pub fn name(&self) -> Ident<'ast> {
        match self {
            Decl::Fun(d) => d.name,
            Decl::Var(d) => d.name,
            Decl::Class(d) => d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Decl::Fun(d) => d.span,
            Decl::Var(d) => d.span,
            Decl::Class(d) => d.span,
        }
    }
}

/// A function, or a method when it appears in a class body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub params: &'ast [Param<'ast>],
    pub ret: TypeExpr<'ast>,
    /// Local declarations, in order.
    pub decls: &'ast [Decl<'ast>],
    pub body: Expr<'ast>,
    pub span: Span,
}

/// A function or method parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}

/// `var x: T = init;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub init: Expr<'ast>,
    pub span: Span,
}

/// `class C(fields) extends S { methods }`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub superclass: Option<Ident<'ast>>,
    pub fields: &'ast [FieldDecl<'ast>],
    pub methods: &'ast [FunDecl<'ast>],
    pub span: Span,
}

/// A field declared in a class header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub id: NodeId,
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
}
