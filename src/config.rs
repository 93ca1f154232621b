//! Compiler configuration.

use fool_core::MachineConfig;

/// Settings for one [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerConfig {
    /// Target machine layout. Must match the machine that runs the code.
    pub machine: MachineConfig,
    /// Errors already reported by the lexer and parser. Any nonzero count
    /// stops code generation.
    pub external_errors: usize,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_machine(mut self, machine: MachineConfig) -> Self {
        self.machine = machine;
        self
    }

    pub fn with_memory_size(mut self, memory_size: i32) -> Self {
        self.machine = MachineConfig::new(memory_size);
        self
    }

    pub fn with_external_errors(mut self, count: usize) -> Self {
        self.external_errors = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fool_core::DEFAULT_MEMORY_SIZE;

    #[test]
    fn builder_setters() {
        let config = CompilerConfig::new()
            .with_memory_size(2048)
            .with_external_errors(1);
        assert_eq!(config.machine.memory_size, 2048);
        assert_eq!(config.external_errors, 1);
        assert_eq!(
            CompilerConfig::default().machine.memory_size,
            DEFAULT_MEMORY_SIZE
        );
    }
}
