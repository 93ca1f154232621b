//! Instruction buffers and label allocation.
//!
//! Function and method bodies are generated where they are declared but
//! placed after the main program. The emitter keeps a stack of open
//! buffers: starting a body suspends the current buffer, finishing it moves
//! the body to the function area and resumes the suspended one.

use super::instruction::{Instr, Label};

/// Hands out fresh labels, numbered per kind.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    branches: u32,
    functions: u32,
}

impl LabelGenerator {
    pub fn fresh_label(&mut self) -> Label {
        let label = Label::Branch(self.branches);
        self.branches += 1;
        label
    }

    pub fn fresh_function(&mut self) -> Label {
        let label = Label::Function(self.functions);
        self.functions += 1;
        label
    }
}

/// Collects generated instructions.
#[derive(Debug, Default)]
pub struct Emitter {
    current: Vec<Instr>,
    suspended: Vec<Vec<Instr>>,
    functions: Vec<Instr>,
    labels: LabelGenerator,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instr: Instr) {
        self.current.push(instr);
    }

    pub fn emit_all(&mut self, instrs: impl IntoIterator<Item = Instr>) {
        self.current.extend(instrs);
    }

    /// Define `label` at the current position.
    pub fn place(&mut self, label: Label) {
        self.emit(Instr::Label(label));
    }

    pub fn fresh_label(&mut self) -> Label {
        self.labels.fresh_label()
    }

    pub fn fresh_function(&mut self) -> Label {
        self.labels.fresh_function()
    }

    /// Start the body of a function or method at `entry`.
    pub fn begin_function(&mut self, entry: Label) {
        self.suspended.push(std::mem::take(&mut self.current));
        self.place(entry);
    }

    /// Close the body started by the matching [`begin_function`](Self::begin_function).
    pub fn end_function(&mut self) {
        let resumed = self.suspended.pop().unwrap_or_default();
        let body = std::mem::replace(&mut self.current, resumed);
        self.functions.extend(body);
    }

    /// Replace the address on top of the stack with the cell at `offset`
    /// from it.
    pub fn emit_load(&mut self, offset: i32) {
        self.emit_all([Instr::Push(offset), Instr::Add, Instr::Lw]);
    }

    /// Move the top of stack into the next heap cell.
    pub fn emit_heap_store(&mut self) {
        self.emit_all([
            Instr::Lhp,
            Instr::Sw,
            Instr::Lhp,
            Instr::Push(1),
            Instr::Add,
            Instr::Shp,
        ]);
    }

    pub fn emit_pops(&mut self, count: i32) {
        for _ in 0..count {
            self.emit(Instr::Pop);
        }
    }

    /// Main code followed by every function body.
    pub fn finish(mut self) -> Vec<Instr> {
        while !self.suspended.is_empty() {
            self.end_function();
        }
        self.current.extend(self.functions);
        self.current
    }
}
