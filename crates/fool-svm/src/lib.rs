//! Reference stack virtual machine for generated FOOL code.
//!
//! [`assemble`] reads the textual instruction lines produced by the code
//! generator and [`Machine`] executes them.
//!
//! ```
//! use fool_svm::{Machine, VmConfig, assemble};
//!
//! let program = assemble("push 5\npush 3\nadd\nhalt").unwrap();
//! let outcome = Machine::new(program, VmConfig::default()).run().unwrap();
//! assert_eq!(outcome.result, Some(8));
//! ```

pub mod assembler;
pub mod machine;

pub use assembler::{Op, Program, assemble};
pub use machine::{DEFAULT_MAX_STEPS, Machine, Outcome, VmConfig};
