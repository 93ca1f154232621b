//! Stack machine code generation.
//!
//! ## Calling convention
//!
//! ```text
//! caller:  lfp                      control link
//!          <args, last first>
//!          <access link>            frame declaring the callee
//!          <code address> js
//! callee:  cfp lra <locals> <body>
//!          stm <pop locals> sra pop <pop params> sfp ltm lra js
//! ```
//!
//! A closure takes two cells: the declaring frame at `offset` and the code
//! address at `offset - 1`. An object is its field cells followed by the
//! dispatch pointer; the object pointer is the dispatch pointer's address,
//! so field `k` lives at `object + offset(k)`.

mod emit;
mod instruction;

pub use emit::{Emitter, LabelGenerator};
pub use instruction::{Instr, Label};

use std::fmt;

use fool_ast::{BinaryOp, ClassDecl, Decl, Expr, FunDecl, Ident, NodeId, Program, TypeExpr};
use fool_core::{CodegenError, MachineConfig, Type};
use rustc_hash::FxHashMap;

use crate::resolver::{Binding, Resolution};

type Result<T> = std::result::Result<T, CodegenError>;

// ============================================================================
// Assembly
// ============================================================================

/// Generated code: main program, `halt`, then every function body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    instrs: Vec<Instr>,
}

impl Assembly {
    pub fn new(instrs: Vec<Instr>) -> Self {
        Self { instrs }
    }

    pub fn instructions(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// One line per instruction or label.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.instrs.iter().map(Instr::to_string)
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Code Generator
// ============================================================================

/// Generate code for a resolved and type checked program.
#[tracing::instrument(skip_all)]
pub fn generate(
    program: &Program<'_>,
    resolution: &Resolution,
    config: &MachineConfig,
) -> Result<Assembly> {
    let mut generator = CodeGenerator {
        resolution,
        config: *config,
        out: Emitter::new(),
        dispatch_tables: FxHashMap::default(),
        in_class: false,
    };
    generator.program(program)?;
    let assembly = Assembly::new(generator.out.finish());
    tracing::debug!(instructions = assembly.len(), "code generation finished");
    Ok(assembly)
}

struct CodeGenerator<'r> {
    resolution: &'r Resolution,
    config: MachineConfig,
    out: Emitter,
    /// Method entry labels by class, indexed by method offset.
    dispatch_tables: FxHashMap<String, Vec<Label>>,
    /// Set while generating method bodies, whose access link is an object.
    in_class: bool,
}

impl<'r> CodeGenerator<'r> {
    fn program(&mut self, program: &Program<'_>) -> Result<()> {
        if program.has_decls() {
            // return address slot of the global frame
            self.out.emit(Instr::Push(0));
            for decl in program.decls {
                self.decl(decl)?;
            }
        }
        self.expr(&program.body)?;
        self.out.emit(Instr::Halt);
        Ok(())
    }

    fn binding(&self, id: NodeId, name: Ident<'_>) -> Result<&'r Binding> {
        let resolution: &'r Resolution = self.resolution;
        resolution
            .binding(id)
            .ok_or_else(|| CodegenError::Unresolved {
                name: name.name.to_string(),
                span: name.span,
            })
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, decl: &Decl<'_>) -> Result<()> {
        match decl {
            Decl::Var(var) => self.expr(&var.init),
            Decl::Fun(fun) => {
                let entry = self.function(fun)?;
                self.out.emit_all([Instr::Lfp, Instr::PushLabel(entry)]);
                Ok(())
            }
            Decl::Class(class) => self.class(class),
        }
    }

    /// Emit the body of a function or method and return its entry label.
    fn function(&mut self, fun: &FunDecl<'_>) -> Result<Label> {
        let entry = self.out.fresh_function();
        self.out.begin_function(entry);
        self.out.emit_all([Instr::Cfp, Instr::Lra]);
        for decl in fun.decls {
            self.decl(decl)?;
        }
        self.expr(&fun.body)?;

        let locals: i32 = fun.decls.iter().map(decl_cells).sum();
        let params: i32 = fun.params.iter().map(|param| cells(&param.ty)).sum();
        let returns_closure = fun.ret.is_functional();

        self.out.emit(Instr::Stm);
        if returns_closure {
            // park the frame half of the result above the heap
            self.out.emit_all([Instr::Lhp, Instr::Sw]);
        }
        self.out.emit_pops(locals);
        self.out.emit_all([Instr::Sra, Instr::Pop]);
        self.out.emit_pops(params);
        self.out.emit(Instr::Sfp);
        if returns_closure {
            self.out.emit_all([Instr::Lhp, Instr::Lw]);
        }
        self.out.emit_all([Instr::Ltm, Instr::Lra, Instr::Js]);
        self.out.end_function();
        Ok(entry)
    }

    fn class(&mut self, class: &ClassDecl<'_>) -> Result<()> {
        let resolution = self.resolution;
        let name = class.name.name;
        let info = resolution
            .declaration(class.id)
            .and_then(|_| resolution.class(name))
            .ok_or_else(|| CodegenError::UnknownClass {
                name: name.to_string(),
                span: class.name.span,
            })?;

        let mut table = info
            .superclass
            .as_ref()
            .and_then(|superclass| self.dispatch_tables.get(superclass))
            .cloned()
            .unwrap_or_default();

        let was_in_class = std::mem::replace(&mut self.in_class, true);
        for method in class.methods {
            let entry = resolution.declaration(method.id).ok_or_else(|| {
                CodegenError::Unresolved {
                    name: method.name.name.to_string(),
                    span: method.name.span,
                }
            })?;
            let offset = entry.offset.max(0) as usize;
            let label = self.function(method)?;
            match table.get_mut(offset) {
                Some(slot) => *slot = label,
                None => table.push(label),
            }
        }
        self.in_class = was_in_class;

        self.out.emit(Instr::Lhp);
        for label in &table {
            self.out.emit(Instr::PushLabel(*label));
            self.out.emit_heap_store();
        }
        self.dispatch_tables.insert(name.to_string(), table);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr<'_>) -> Result<()> {
        let resolution = self.resolution;
        match expr {
            Expr::Int(lit) => self.out.emit(Instr::Push(lit.value)),
            Expr::Bool(lit) => self.out.emit(Instr::Push(i32::from(lit.value))),
            Expr::Null(_) => self.out.emit(Instr::Push(-1)),
            Expr::Ident(ident) => {
                let binding = self.binding(ident.id, ident.name)?;
                self.access_link(binding);
                let offset = binding.entry.offset;
                if binding.entry.ty.is_functional() {
                    self.out.emit_all([Instr::Stm, Instr::Ltm]);
                    self.out.emit_load(offset);
                    self.out.emit(Instr::Ltm);
                    self.out.emit_load(offset - 1);
                } else {
                    self.out.emit_load(offset);
                }
            }
            Expr::Binary(binary) => match binary.op {
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::And => {
                    self.expr(&binary.left)?;
                    self.expr(&binary.right)?;
                    self.out.emit(match binary.op {
                        BinaryOp::Add => Instr::Add,
                        BinaryOp::Sub => Instr::Sub,
                        BinaryOp::Div => Instr::Div,
                        _ => Instr::Mult,
                    });
                }
                BinaryOp::Or => {
                    let is_true = self.out.fresh_label();
                    let end = self.out.fresh_label();
                    self.expr(&binary.left)?;
                    self.out.emit_all([Instr::Push(1), Instr::Beq(is_true)]);
                    self.expr(&binary.right)?;
                    self.out.emit_all([
                        Instr::Push(1),
                        Instr::Beq(is_true),
                        Instr::Push(0),
                        Instr::B(end),
                    ]);
                    self.out.place(is_true);
                    self.out.emit(Instr::Push(1));
                    self.out.place(end);
                }
                BinaryOp::Equal => self.comparison(&binary.left, &binary.right, Instr::Beq)?,
                BinaryOp::LessEqual => self.comparison(&binary.left, &binary.right, Instr::Bleq)?,
                BinaryOp::GreaterEqual => {
                    self.comparison(&binary.right, &binary.left, Instr::Bleq)?
                }
            },
            Expr::Not(not) => {
                self.out.emit(Instr::Push(1));
                self.expr(&not.operand)?;
                self.out.emit(Instr::Sub);
            }
            Expr::If(cond) => {
                let then_label = self.out.fresh_label();
                let end = self.out.fresh_label();
                self.expr(&cond.condition)?;
                self.out.emit_all([Instr::Push(1), Instr::Beq(then_label)]);
                self.expr(&cond.else_expr)?;
                self.out.emit(Instr::B(end));
                self.out.place(then_label);
                self.expr(&cond.then_expr)?;
                self.out.place(end);
            }
            Expr::Print(print) => {
                self.expr(&print.value)?;
                self.out.emit(Instr::Print);
            }
            Expr::Call(call) => {
                let binding = self.binding(call.id, call.callee)?;
                self.out.emit(Instr::Lfp);
                for arg in call.args.iter().rev() {
                    self.expr(arg)?;
                }
                self.access_link(binding);
                let offset = binding.entry.offset;
                if matches!(binding.entry.ty, Type::Method(_)) {
                    // implicit receiver: the enclosing object
                    self.dispatch(offset);
                } else {
                    self.out.emit_all([Instr::Stm, Instr::Ltm]);
                    self.out.emit_load(offset);
                    self.out.emit(Instr::Ltm);
                    self.out.emit_load(offset - 1);
                    self.out.emit(Instr::Js);
                }
            }
            Expr::MethodCall(call) => {
                let resolved = resolution.method_call(call.id).ok_or_else(|| {
                    CodegenError::Unresolved {
                        name: call.method.name.to_string(),
                        span: call.method.span,
                    }
                })?;
                self.out.emit(Instr::Lfp);
                for arg in call.args.iter().rev() {
                    self.expr(arg)?;
                }
                self.access_link(&resolved.receiver);
                self.out.emit_load(resolved.receiver.entry.offset);
                self.dispatch(resolved.method.offset);
            }
            Expr::New(new) => {
                let binding = self.binding(new.id, new.class)?;
                let Type::Class(class_type) = &binding.entry.ty else {
                    return Err(CodegenError::UnknownClass {
                        name: new.class.name.to_string(),
                        span: new.class.span,
                    });
                };
                for arg in new.args {
                    self.expr(arg)?;
                }
                let field_cells: i32 = class_type.fields.iter().map(Type::slot_count).sum();
                for _ in 0..field_cells {
                    self.out.emit_heap_store();
                }
                let dispatch_slot = self.config.global_frame() + binding.entry.offset;
                self.out.emit_all([
                    Instr::Push(dispatch_slot),
                    Instr::Lw,
                    Instr::Lhp,
                    Instr::Sw,
                    Instr::Lhp,
                    Instr::Lhp,
                    Instr::Push(1),
                    Instr::Add,
                    Instr::Shp,
                ]);
            }
        }
        Ok(())
    }

    /// `left right <branch> → 1`, otherwise 0.
    fn comparison(
        &mut self,
        left: &Expr<'_>,
        right: &Expr<'_>,
        branch: fn(Label) -> Instr,
    ) -> Result<()> {
        let is_true = self.out.fresh_label();
        let end = self.out.fresh_label();
        self.expr(left)?;
        self.expr(right)?;
        self.out.emit_all([branch(is_true), Instr::Push(0), Instr::B(end)]);
        self.out.place(is_true);
        self.out.emit(Instr::Push(1));
        self.out.place(end);
        Ok(())
    }

    /// With an object pointer on the stack: push it as access link and jump
    /// to the method at `offset` of its dispatch table.
    fn dispatch(&mut self, offset: i32) {
        self.out.emit_all([Instr::Stm, Instr::Ltm, Instr::Ltm, Instr::Lw]);
        self.out.emit_load(offset);
        self.out.emit(Instr::Js);
    }

    /// Push the frame (or object) holding the declaration of `binding`.
    fn access_link(&mut self, binding: &Binding) {
        if binding.entry.depth == 0 && self.in_class {
            // the static chain of a method passes through its object
            self.out.emit(Instr::Push(self.config.global_frame()));
            return;
        }
        self.out.emit(Instr::Lfp);
        for _ in 0..binding.hops() {
            self.out.emit(Instr::Lw);
        }
    }
}

fn cells(ty: &TypeExpr<'_>) -> i32 {
    if ty.is_functional() { 2 } else { 1 }
}

/// Stack cells a local declaration leaves in its frame.
fn decl_cells(decl: &Decl<'_>) -> i32 {
    match decl {
        Decl::Fun(_) => 2,
        Decl::Var(var) => cells(&var.ty),
        Decl::Class(_) => 1,
    }
}
