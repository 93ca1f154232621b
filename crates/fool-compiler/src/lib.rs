//! Middle and back end of the FOOL compiler.
//!
//! The passes run in order over an AST built with `fool_ast::AstBuilder`:
//!
//! 1. [`resolver::resolve`] - scopes, offsets, virtual tables
//! 2. [`typecheck::check`] - types of every expression and declaration
//! 3. [`codegen::generate`] - stack machine instructions
//!
//! Subtyping and least upper bounds live in [`type_rels`].

pub mod codegen;
pub mod resolver;
pub mod type_rels;
pub mod typecheck;

pub use codegen::{Assembly, Instr, Label, generate};
pub use resolver::{Binding, ClassInfo, MethodBinding, Resolution, SymbolEntry, resolve};
pub use type_rels::ClassHierarchy;
pub use typecheck::{TypeCheck, check};
