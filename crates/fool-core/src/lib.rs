//! Core types shared by the FOOL compiler crates.
//!
//! - [`Span`]: source positions carried by AST nodes and errors
//! - [`Type`]: semantic types produced by resolution and type checking
//! - error enums for every phase, and the unified [`FoolError`]
//! - [`Diagnostics`]: rendered messages with per-stage counters
//! - [`MachineConfig`]: layout parameters of the target machine

mod config;
mod diagnostics;
mod error;
mod span;
mod types;

pub use config::{DEFAULT_MEMORY_SIZE, MachineConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Stage};
pub use error::{
    AssemblyError, CheckError, CodegenError, FoolError, ResolveError, RuntimeError, SymbolKind,
    TypeError,
};
pub use span::Span;
pub use types::{ClassType, FunctionType, Type};
