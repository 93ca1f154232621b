//! FOOL compiler: resolution, type checking and stack machine code
//! generation for a small object-oriented functional language.
//!
//! The pieces live in separate crates and are re-exported here:
//!
//! - [`ast`] - arena-allocated syntax tree and [`AstBuilder`]
//! - [`compiler`] - the passes
//! - [`svm`] - reference assembler and stack machine
//!
//! [`Pipeline`] runs the passes in order and gates code generation on the
//! error count.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use fool::{AstBuilder, CompilerConfig, Pipeline, TypeExpr};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let x = b.var("x", TypeExpr::Int, b.int(5));
//! let program = b.program(&[x], b.add(b.ident("x"), b.int(3)));
//!
//! let pipeline = Pipeline::new(CompilerConfig::default());
//! let outcome = pipeline.run(&program).unwrap();
//! assert_eq!(outcome.result, Some(8));
//! ```

mod config;
mod pipeline;

pub use config::CompilerConfig;
pub use pipeline::{CompileOutput, Pipeline};

pub use fool_ast as ast;
pub use fool_compiler as compiler;
pub use fool_svm as svm;

pub use fool_ast::{AstBuilder, Program, TypeExpr};
pub use fool_compiler::Assembly;
pub use fool_core::{Diagnostic, Diagnostics, FoolError, MachineConfig, Span, Stage, Type};
pub use fool_svm::{Outcome, VmConfig};
