//! Pass sequencing and error gating.

use fool_ast::Program;
use fool_compiler::{Assembly, check, generate, resolve};
use fool_core::{Diagnostic, Diagnostics, FoolError, Type};
use fool_svm::{DEFAULT_MAX_STEPS, Machine, Outcome, VmConfig, assemble};

use crate::CompilerConfig;

/// Everything one compilation produced.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Generated code; `None` when any stage reported an error.
    pub assembly: Option<Assembly>,
    /// Type of the program body, when type checking got that far.
    pub result_type: Option<Type>,
    pub diagnostics: Diagnostics,
}

impl CompileOutput {
    pub fn is_success(&self) -> bool {
        self.assembly.is_some()
    }
}

/// Runs resolution, type checking and code generation in order.
///
/// Resolution and type checking always run; their error counts are summed
/// with the front-end count from [`CompilerConfig::external_errors`] and
/// code is only generated when the total is zero.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: CompilerConfig,
}

impl Pipeline {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile `program`.
    ///
    /// Front-end errors are reported in the output's diagnostics; `Err` is
    /// reserved for failures of code generation itself.
    #[cfg_attr(feature = "profiling", profiling::function)]
    #[tracing::instrument(skip_all)]
    pub fn compile(&self, program: &Program<'_>) -> Result<CompileOutput, FoolError> {
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_external_errors(self.config.external_errors);

        let resolution = resolve(program);
        for error in resolution.errors() {
            diagnostics.push(Diagnostic::from(error));
        }

        let typecheck = check(program, &resolution);
        for error in &typecheck.errors {
            diagnostics.push(Diagnostic::from(error));
        }

        if diagnostics.has_errors() {
            tracing::debug!(
                errors = diagnostics.error_count(),
                "code generation skipped"
            );
            return Ok(CompileOutput {
                assembly: None,
                result_type: typecheck.result,
                diagnostics,
            });
        }

        let assembly = generate(program, &resolution, &self.config.machine)?;
        Ok(CompileOutput {
            assembly: Some(assembly),
            result_type: typecheck.result,
            diagnostics,
        })
    }

    /// Compile `program`, failing unless code was generated.
    pub fn assembly(&self, program: &Program<'_>) -> Result<Assembly, FoolError> {
        let output = self.compile(program)?;
        let count = output.diagnostics.error_count();
        output.assembly.ok_or(FoolError::FrontEnd { count })
    }

    /// Compile `program` and execute it on the reference machine.
    ///
    /// The machine's memory size follows the compiler configuration.
    pub fn run(&self, program: &Program<'_>) -> Result<Outcome, FoolError> {
        self.run_with(program, DEFAULT_MAX_STEPS)
    }

    /// [`run`](Self::run) with an explicit instruction budget.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run_with(&self, program: &Program<'_>, max_steps: u64) -> Result<Outcome, FoolError> {
        let assembly = self.assembly(program)?;
        let code = assemble(&assembly.to_string())?;
        let config = VmConfig::from(self.config.machine).with_max_steps(max_steps);
        Ok(Machine::new(code, config).run()?)
    }
}
