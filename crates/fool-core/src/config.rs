//! Machine parameters shared by the code generator and the virtual machine.

/// Default number of memory cells of the target machine.
pub const DEFAULT_MEMORY_SIZE: i32 = 10000;

/// Layout parameters of the target stack machine.
///
/// The generated code addresses the global frame absolutely (class dispatch
/// pointers live there), so the compiler and the machine that runs the code
/// must agree on `memory_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Number of memory cells. The stack and the initial frame pointer start
    /// here and grow down; the heap starts at 0 and grows up.
    pub memory_size: i32,
}

impl MachineConfig {
    pub fn new(memory_size: i32) -> Self {
        Self { memory_size }
    }

    /// Frame pointer of the global activation record.
    pub fn global_frame(&self) -> i32 {
        self.memory_size
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }
}
