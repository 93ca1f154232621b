//! Abstract syntax tree for FOOL programs.
//!
//! Nodes are allocated in a [`bumpalo::Bump`] arena and refer to each other
//! through `&'ast` references, so a whole tree is freed at once when the
//! arena is dropped. Trees are immutable after construction; analysis
//! results live in side tables keyed by [`NodeId`].
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use fool_ast::{AstBuilder, TypeExpr};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let x = b.var("x", TypeExpr::Int, b.int(5));
//! let program = b.program(&[x], b.add(b.ident("x"), b.int(3)));
//! assert_eq!(program.decls.len(), 1);
//! ```

pub mod builder;
pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod types;

pub use builder::AstBuilder;
pub use decl::{ClassDecl, Decl, FieldDecl, FunDecl, Param, VarDecl};
pub use expr::{
    BinaryExpr, BoolLit, CallExpr, Expr, IdentExpr, IfExpr, IntLit, MethodCallExpr, NewExpr,
    NotExpr, PrintExpr,
};
pub use node::{Ident, NodeId};
pub use ops::{BinaryOp, OpClass};
pub use types::{ArrowTypeExpr, TypeExpr};

use fool_core::Span;

/// A complete program: `let decls in body`, or just `body`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    pub decls: &'ast [Decl<'ast>],
    pub body: Expr<'ast>,
    pub span: Span,
}

impl Program<'_> {
    /// Whether the program has a `let` part.
    pub fn has_decls(&self) -> bool {
        !self.decls.is_empty()
    }
}
