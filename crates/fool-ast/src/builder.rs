//! Arena-backed construction of ASTs.
//!
//! The lexer and parser are not part of this workspace. Whatever front end
//! is plugged in (or a test) builds trees through [`AstBuilder`], which
//! allocates every node in a [`Bump`] arena, hands out fresh [`NodeId`]s and
//! stamps nodes with the current source line.

use std::cell::Cell;

use bumpalo::Bump;
use fool_core::Span;

use crate::decl::{ClassDecl, Decl, FieldDecl, FunDecl, Param, VarDecl};
use crate::expr::{
    BinaryExpr, BoolLit, CallExpr, Expr, IdentExpr, IfExpr, IntLit, MethodCallExpr, NewExpr,
    NotExpr, PrintExpr,
};
use crate::node::{Ident, NodeId};
use crate::ops::BinaryOp;
use crate::types::{ArrowTypeExpr, TypeExpr};
use crate::Program;

/// Builds AST nodes in an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder allocating into `arena`. Nodes start on line 1.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
            line: Cell::new(1),
        }
    }

    /// Set the line stamped on nodes built from now on.
    pub fn at(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    /// The line currently stamped on new nodes.
    pub fn line(&self) -> u32 {
        self.line.get()
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    fn span(&self) -> Span {
        Span::at_line(self.line.get())
    }

    fn fresh_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    fn name(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    fn exprs(&self, exprs: &[Expr<'ast>]) -> &'ast [Expr<'ast>] {
        self.arena.alloc_slice_copy(exprs)
    }

    // ========================================================================
    // Type annotations
    // ========================================================================

    pub fn ref_type(&self, class: &str) -> TypeExpr<'ast> {
        TypeExpr::Ref(self.arena.alloc_str(class))
    }

    pub fn arrow_type(&self, params: &[TypeExpr<'ast>], ret: TypeExpr<'ast>) -> TypeExpr<'ast> {
        let params = self.arena.alloc_slice_copy(params);
        TypeExpr::Arrow(self.arena.alloc(ArrowTypeExpr { params, ret }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn int(&self, value: i32) -> Expr<'ast> {
        Expr::Int(IntLit {
            value,
            span: self.span(),
        })
    }

    pub fn bool(&self, value: bool) -> Expr<'ast> {
        Expr::Bool(BoolLit {
            value,
            span: self.span(),
        })
    }

    pub fn null(&self) -> Expr<'ast> {
        Expr::Null(self.span())
    }

    /// A name used as a value.
    pub fn ident(&self, name: &str) -> Expr<'ast> {
        Expr::Ident(IdentExpr {
            id: self.fresh_id(),
            name: self.name(name),
        })
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left,
            op,
            right,
            span: self.span(),
        }))
    }

    pub fn add(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Add, right)
    }

    pub fn sub(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Sub, right)
    }

    pub fn mul(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Mul, right)
    }

    pub fn div(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Div, right)
    }

    pub fn and(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::And, right)
    }

    pub fn or(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Or, right)
    }

    pub fn eq(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::Equal, right)
    }

    pub fn le(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::LessEqual, right)
    }

    pub fn ge(&self, left: Expr<'ast>, right: Expr<'ast>) -> Expr<'ast> {
        self.binary(left, BinaryOp::GreaterEqual, right)
    }

    pub fn not(&self, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Not(self.arena.alloc(NotExpr {
            operand,
            span: self.span(),
        }))
    }

    pub fn if_then_else(
        &self,
        condition: Expr<'ast>,
        then_expr: Expr<'ast>,
        else_expr: Expr<'ast>,
    ) -> Expr<'ast> {
        Expr::If(self.arena.alloc(IfExpr {
            condition,
            then_expr,
            else_expr,
            span: self.span(),
        }))
    }

    pub fn call(&self, callee: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Call(self.arena.alloc(CallExpr {
            id: self.fresh_id(),
            callee: self.name(callee),
            args: self.exprs(args),
            span: self.span(),
        }))
    }

    pub fn method_call(&self, receiver: &str, method: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::MethodCall(self.arena.alloc(MethodCallExpr {
            id: self.fresh_id(),
            receiver: self.name(receiver),
            method: self.name(method),
            args: self.exprs(args),
            span: self.span(),
        }))
    }

    pub fn new_object(&self, class: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::New(self.arena.alloc(NewExpr {
            id: self.fresh_id(),
            class: self.name(class),
            args: self.exprs(args),
            span: self.span(),
        }))
    }

    pub fn print(&self, value: Expr<'ast>) -> Expr<'ast> {
        Expr::Print(self.arena.alloc(PrintExpr {
            value,
            span: self.span(),
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, name: &str, ty: TypeExpr<'ast>) -> Param<'ast> {
        Param {
            id: self.fresh_id(),
            name: self.name(name),
            ty,
        }
    }

    pub fn var(&self, name: &str, ty: TypeExpr<'ast>, init: Expr<'ast>) -> Decl<'ast> {
        Decl::Var(self.arena.alloc(VarDecl {
            id: self.fresh_id(),
            name: self.name(name),
            ty,
            init,
            span: self.span(),
        }))
    }

    /// A function declaration.
    pub fn fun(
        &self,
        name: &str,
        params: &[Param<'ast>],
        ret: TypeExpr<'ast>,
        decls: &[Decl<'ast>],
        body: Expr<'ast>,
    ) -> Decl<'ast> {
        Decl::Fun(self.arena.alloc(self.method(name, params, ret, decls, body)))
    }

    /// A method declaration, to be passed to [`class`](Self::class).
    pub fn method(
        &self,
        name: &str,
        params: &[Param<'ast>],
        ret: TypeExpr<'ast>,
        decls: &[Decl<'ast>],
        body: Expr<'ast>,
    ) -> FunDecl<'ast> {
        FunDecl {
            id: self.fresh_id(),
            name: self.name(name),
            params: self.arena.alloc_slice_copy(params),
            ret,
            decls: self.arena.alloc_slice_copy(decls),
            body,
            span: self.span(),
        }
    }

    pub fn field(&self, name: &str, ty: TypeExpr<'ast>) -> FieldDecl<'ast> {
        FieldDecl {
            id: self.fresh_id(),
            name: self.name(name),
            ty,
        }
    }

    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        fields: &[FieldDecl<'ast>],
        methods: &[FunDecl<'ast>],
    ) -> Decl<'ast> {
        Decl::Class(self.arena.alloc(ClassDecl {
            id: self.fresh_id(),
            name: self.name(name),
            superclass: superclass.map(|s| self.name(s)),
            fields: self.arena.alloc_slice_copy(fields),
            methods: self.arena.alloc_slice_copy(methods),
            span: self.span(),
        }))
    }

    /// The program root. An empty `decls` gives a plain expression program.
    pub fn program(&self, decls: &[Decl<'ast>], body: Expr<'ast>) -> Program<'ast> {
        Program {
            decls: self.arena.alloc_slice_copy(decls),
            body,
            span: self.span(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let x = b.ident("x");
        let y = b.ident("y");
        match (x, y) {
            (Expr::Ident(x), Expr::Ident(y)) => assert_ne!(x.id, y.id),
            _ => panic!("expected identifiers"),
        }
        assert_eq!(b.node_count(), 2);
    }

    #[test]
    fn nodes_carry_current_line() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let one = b.int(1);
        let sum = b.at(4).add(one, b.int(2));
        assert_eq!(one.span().line, 1);
        assert_eq!(sum.span().line, 4);
        assert_eq!(b.line(), 4);
    }

    #[test]
    fn class_with_superclass() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let field = b.field("x", TypeExpr::Int);
        let body = b.ident("x");
        let getter = b.method("getX", &[], TypeExpr::Int, &[], body);
        let decl = b.class("B", Some("A"), &[field], &[getter]);
        let Decl::Class(class) = decl else {
            panic!("expected a class");
        };
        assert_eq!(class.name.name, "B");
        assert_eq!(class.superclass.map(|s| s.name), Some("A"));
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.methods[0].name.name, "getX");
    }

    #[test]
    fn arrow_annotation() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let ty = b.arrow_type(&[TypeExpr::Int, TypeExpr::Bool], TypeExpr::Int);
        let TypeExpr::Arrow(arrow) = ty else {
            panic!("expected an arrow");
        };
        assert_eq!(arrow.params.len(), 2);
        assert!(ty.is_functional());
    }
}
