//! The target machine's instruction set.
//!
//! Generated code is a list of [`Instr`]; its text form, one instruction or
//! label per line, is what the assembler reads.

use std::fmt;

/// A code label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Branch target inside a body, `label<n>`.
    Branch(u32),
    /// Entry point of a function or method, `function<n>`.
    Function(u32),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Branch(n) => write!(f, "label{n}"),
            Label::Function(n) => write!(f, "function{n}"),
        }
    }
}

/// Stack machine instructions.
///
/// Binary operations pop the right operand first, then the left one, and
/// push the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instr {
    // =========================================================================
    // Stack
    // =========================================================================
    /// Push a constant.
    Push(i32),
    /// Push the code address of a label.
    PushLabel(Label),
    /// Discard the top of stack.
    Pop,

    // =========================================================================
    // Arithmetic
    // =========================================================================
    Add,
    Sub,
    Mult,
    Div,

    // =========================================================================
    // Memory
    // =========================================================================
    /// Pop an address, pop a value, store the value at the address.
    Sw,
    /// Pop an address, push the value stored there.
    Lw,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Unconditional jump.
    B(Label),
    /// Pop two values, jump if equal.
    Beq(Label),
    /// Pop two values, jump if left <= right.
    Bleq(Label),
    /// Pop a code address and jump to it, saving the next address in RA.
    Js,

    // =========================================================================
    // Registers
    // =========================================================================
    /// Push RA.
    Lra,
    /// Pop into RA.
    Sra,
    /// Push TM.
    Ltm,
    /// Pop into TM.
    Stm,
    /// Push FP.
    Lfp,
    /// Pop into FP.
    Sfp,
    /// Copy SP into FP.
    Cfp,
    /// Push HP.
    Lhp,
    /// Pop into HP.
    Shp,

    // =========================================================================
    // Misc
    // =========================================================================
    /// Print the top of stack without popping it.
    Print,
    /// Stop execution.
    Halt,
    /// Label definition; not an instruction.
    Label(Label),
}

impl Instr {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::Push(_) | Instr::PushLabel(_) => "push",
            Instr::Pop => "pop",
            Instr::Add => "add",
            Instr::Sub => "sub",
            Instr::Mult => "mult",
            Instr::Div => "div",
            Instr::Sw => "sw",
            Instr::Lw => "lw",
            Instr::B(_) => "b",
            Instr::Beq(_) => "beq",
            Instr::Bleq(_) => "bleq",
            Instr::Js => "js",
            Instr::Lra => "lra",
            Instr::Sra => "sra",
            Instr::Ltm => "ltm",
            Instr::Stm => "stm",
            Instr::Lfp => "lfp",
            Instr::Sfp => "sfp",
            Instr::Cfp => "cfp",
            Instr::Lhp => "lhp",
            Instr::Shp => "shp",
            Instr::Print => "print",
            Instr::Halt => "halt",
            Instr::Label(_) => "",
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Push(n) => write!(f, "push {n}"),
            Instr::PushLabel(label) => write!(f, "push {label}"),
            Instr::B(label) | Instr::Beq(label) | Instr::Bleq(label) => {
                write!(f, "{} {label}", self.mnemonic())
            }
            Instr::Label(label) => write!(f, "{label}:"),
            _ => f.write_str(self.mnemonic()),
        }
    }
}
