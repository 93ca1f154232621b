//! Scope and offset resolution.
//!
//! One walk over the program that:
//! - builds the nested scope tables and the per-class virtual tables
//! - assigns every declaration a storage offset
//! - links every identifier, call, method call and `new` to its declaration
//!
//! Results are stored in a [`Resolution`] keyed by [`NodeId`]. Errors are
//! collected and the walk always runs to completion.

mod class;
mod scope;

pub use class::{CLASS_DEPTH, ClassInfo, ClassLayout, Member};
pub use scope::{Binding, OffsetCounter, ScopeStack, SymbolEntry};

use fool_ast::{ClassDecl, Decl, Expr, FunDecl, Ident, NodeId, Program, TypeExpr};
use fool_core::{FunctionType, ResolveError, SymbolKind, Type};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::type_rels::ClassHierarchy;

// ============================================================================
// Resolution
// ============================================================================

/// A resolved `receiver.method(..)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    /// The variable, parameter or field holding the object.
    pub receiver: Binding,
    /// Static class of the receiver.
    pub class: String,
    /// The method's virtual table entry.
    pub method: SymbolEntry,
}

/// Everything the later passes need from resolution.
#[derive(Debug, Default)]
pub struct Resolution {
    uses: FxHashMap<NodeId, Binding>,
    method_calls: FxHashMap<NodeId, MethodBinding>,
    decls: FxHashMap<NodeId, SymbolEntry>,
    member_positions: FxHashMap<NodeId, usize>,
    classes: FxHashMap<String, ClassInfo>,
    hierarchy: ClassHierarchy,
    errors: Vec<ResolveError>,
}

impl Resolution {
    /// The declaration an identifier, call or `new` refers to.
    pub fn binding(&self, id: NodeId) -> Option<&Binding> {
        self.uses.get(&id)
    }

    pub fn method_call(&self, id: NodeId) -> Option<&MethodBinding> {
        self.method_calls.get(&id)
    }

    /// The entry created for a declaration node.
    pub fn declaration(&self, id: NodeId) -> Option<&SymbolEntry> {
        self.decls.get(&id)
    }

    /// Field index or method offset of a class member declaration.
    pub fn member_position(&self, id: NodeId) -> Option<usize> {
        self.member_positions.get(&id).copied()
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Resolve a whole program.
#[tracing::instrument(skip_all)]
pub fn resolve(program: &Program<'_>) -> Resolution {
    let mut resolver = Resolver::new();
    resolver.program(program);
    let resolution = resolver.out;
    tracing::debug!(
        uses = resolution.uses.len(),
        classes = resolution.classes.len(),
        errors = resolution.errors.len(),
        "resolution finished"
    );
    resolution
}

// ============================================================================
// Resolver
// ============================================================================

struct Resolver {
    scopes: ScopeStack,
    offsets: OffsetCounter,
    out: Resolution,
}

impl Resolver {
    fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            offsets: OffsetCounter::frame(),
            out: Resolution::default(),
        }
    }

    fn report(&mut self, error: ResolveError) {
        tracing::warn!(%error, "resolution error");
        self.out.errors.push(error);
    }

    fn program(&mut self, program: &Program<'_>) {
        self.scopes.push();
        self.offsets = OffsetCounter::frame();
        for decl in program.decls {
            self.decl(decl);
        }
        self.expr(&program.body);
        self.scopes.pop();
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, decl: &Decl<'_>) {
        match decl {
            Decl::Var(var) => {
                self.expr(&var.init);
                let ty = type_of(&var.ty);
                let offset = self.offsets.allocate_local(ty.slot_count());
                let entry = SymbolEntry::new(self.scopes.depth(), ty, offset);
                self.declare(var.id, var.name, SymbolKind::Variable, entry);
            }
            Decl::Fun(fun) => {
                let ty = Type::Arrow(signature(fun));
                let offset = self.offsets.allocate_local(ty.slot_count());
                let entry = SymbolEntry::new(self.scopes.depth(), ty, offset);
                self.declare(fun.id, fun.name, SymbolKind::Function, entry);
                self.body(fun);
            }
            Decl::Class(class) => self.class(class),
        }
    }

    fn declare(&mut self, id: NodeId, name: Ident<'_>, kind: SymbolKind, entry: SymbolEntry) {
        if !self.scopes.declare(name.name, entry.clone()) {
            self.report(ResolveError::Redeclared {
                kind,
                name: name.name.to_string(),
                span: name.span,
            });
        }
        self.out.decls.insert(id, entry);
    }

    /// Parameters, local declarations and body of a function or method.
    fn body(&mut self, fun: &FunDecl<'_>) {
        self.scopes.push();
        let saved = std::mem::replace(&mut self.offsets, OffsetCounter::frame());
        let depth = self.scopes.depth();

        for param in fun.params {
            let ty = type_of(&param.ty);
            let offset = self.offsets.allocate_parameter(ty.slot_count());
            let entry = SymbolEntry::new(depth, ty, offset);
            self.declare(param.id, param.name, SymbolKind::Parameter, entry);
        }
        for decl in fun.decls {
            self.decl(decl);
        }
        self.expr(&fun.body);

        self.offsets = saved;
        self.scopes.pop();
    }

    fn class(&mut self, class: &ClassDecl<'_>) {
        let name = class.name.name;
        // A misplaced class is still walked so errors in its body are counted,
        // but it is never registered.
        let global = self.scopes.depth() == 0;
        if !global {
            self.report(ResolveError::ClassNotGlobal {
                name: name.to_string(),
                span: class.name.span,
            });
        }

        let parent = class.superclass.and_then(|superclass| {
            let found = self
                .out
                .classes
                .get(superclass.name)
                .map(|info| (info.name.clone(), info.layout.clone()));
            if found.is_none() {
                self.report(ResolveError::UndeclaredSuperclass {
                    class: name.to_string(),
                    superclass: superclass.name.to_string(),
                    span: superclass.span,
                });
            }
            found
        });
        let (superclass, mut layout) = match parent {
            Some((superclass, layout)) => (Some(superclass), layout),
            None => (None, ClassLayout::default()),
        };

        let mut seen: FxHashSet<&str> = FxHashSet::default();

        for field in class.fields {
            let member_name = field.name.name;
            if !seen.insert(member_name) {
                self.report(duplicate(SymbolKind::Field, field.name, name));
                continue;
            }
            let ty = type_of(&field.ty);
            let member = match layout.members.get(member_name).cloned() {
                Some(inherited) if inherited.is_method() => {
                    self.report(ResolveError::IllegalOverride {
                        name: member_name.to_string(),
                        overridden: SymbolKind::Method,
                        by: SymbolKind::Field,
                        span: field.name.span,
                    });
                    continue;
                }
                Some(inherited) => layout.override_member(member_name, &inherited, ty),
                None => layout.add_field(member_name, ty),
            };
            self.out.decls.insert(field.id, member.entry);
            self.out.member_positions.insert(field.id, member.position);
        }

        // Every signature goes in before any body so that methods can call
        // each other and `new` of this class sees all of it.
        for method in class.methods {
            let member_name = method.name.name;
            if !seen.insert(member_name) {
                self.report(duplicate(SymbolKind::Method, method.name, name));
                continue;
            }
            let ty = Type::Method(signature(method));
            let member = match layout.members.get(member_name).cloned() {
                Some(inherited) if !inherited.is_method() => {
                    self.report(ResolveError::IllegalOverride {
                        name: member_name.to_string(),
                        overridden: SymbolKind::Field,
                        by: SymbolKind::Method,
                        span: method.name.span,
                    });
                    continue;
                }
                Some(inherited) => layout.override_member(member_name, &inherited, ty),
                None => layout.add_method(member_name, ty),
            };
            self.out.decls.insert(method.id, member.entry);
            self.out.member_positions.insert(method.id, member.position);
        }

        if global {
            self.register(class, superclass, &layout);
        }

        // Rejected members keep no entry, but their bodies are still resolved.
        self.scopes.push_table(layout.scope());
        for method in class.methods {
            self.body(method);
        }
        self.scopes.pop();
    }

    /// Bind a global class name and record its layout and superclass.
    fn register(&mut self, class: &ClassDecl<'_>, superclass: Option<String>, layout: &ClassLayout) {
        let name = class.name.name;
        let offset = self.offsets.allocate_local(1);
        let entry = SymbolEntry::new(0, Type::Class(layout.class_type.clone()), offset);
        if self.scopes.declare(name, entry.clone()) {
            if let Some(superclass) = &superclass {
                self.out.hierarchy.add(name, superclass.clone());
            }
            self.out.decls.insert(class.id, entry.clone());
            self.out.classes.insert(
                name.to_string(),
                ClassInfo {
                    name: name.to_string(),
                    superclass,
                    entry,
                    layout: layout.clone(),
                },
            );
        } else {
            self.report(ResolveError::Redeclared {
                kind: SymbolKind::Class,
                name: name.to_string(),
                span: class.name.span,
            });
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr<'_>) {
        match expr {
            Expr::Int(_) | Expr::Bool(_) | Expr::Null(_) => {}
            Expr::Ident(ident) => {
                if let Some(binding) = self.lookup(ident.name, SymbolKind::Identifier) {
                    self.out.uses.insert(ident.id, binding);
                }
            }
            Expr::Binary(binary) => {
                self.expr(&binary.left);
                self.expr(&binary.right);
            }
            Expr::Not(not) => self.expr(&not.operand),
            Expr::If(cond) => {
                self.expr(&cond.condition);
                self.expr(&cond.then_expr);
                self.expr(&cond.else_expr);
            }
            Expr::Print(print) => self.expr(&print.value),
            Expr::Call(call) => {
                if let Some(binding) = self.lookup(call.callee, SymbolKind::Function) {
                    self.out.uses.insert(call.id, binding);
                }
                for arg in call.args {
                    self.expr(arg);
                }
            }
            Expr::MethodCall(call) => {
                let receiver = self.lookup(call.receiver, SymbolKind::Identifier);
                if let Some(receiver) = receiver {
                    self.method_call(call.id, call.receiver, call.method, receiver);
                }
                for arg in call.args {
                    self.expr(arg);
                }
            }
            Expr::New(new) => {
                let entry = self.out.classes.get(new.class.name).map(|info| info.entry.clone());
                match entry {
                    Some(entry) => {
                        let binding = Binding {
                            entry,
                            depth: self.scopes.depth(),
                        };
                        self.out.uses.insert(new.id, binding);
                    }
                    None => self.report(ResolveError::Undeclared {
                        kind: SymbolKind::Class,
                        name: new.class.name.to_string(),
                        span: new.class.span,
                    }),
                }
                for arg in new.args {
                    self.expr(arg);
                }
            }
        }
    }

    fn lookup(&mut self, name: Ident<'_>, kind: SymbolKind) -> Option<Binding> {
        let depth = self.scopes.depth();
        let found = self.scopes.lookup(name.name).cloned();
        if found.is_none() {
            self.report(ResolveError::Undeclared {
                kind,
                name: name.name.to_string(),
                span: name.span,
            });
        }
        found.map(|entry| Binding { entry, depth })
    }

    fn method_call(&mut self, id: NodeId, receiver: Ident<'_>, method: Ident<'_>, binding: Binding) {
        let Type::Ref(class) = &binding.entry.ty else {
            self.report(ResolveError::NotAnObject {
                name: receiver.name.to_string(),
                span: receiver.span,
            });
            return;
        };
        let class = class.clone();
        let Some(info) = self.out.classes.get(&class) else {
            self.report(ResolveError::Undeclared {
                kind: SymbolKind::Class,
                name: class,
                span: receiver.span,
            });
            return;
        };
        match info.member(method.name).filter(|member| member.is_method()) {
            Some(member) => {
                let resolved = MethodBinding {
                    receiver: binding,
                    class,
                    method: member.entry.clone(),
                };
                self.out.method_calls.insert(id, resolved);
            }
            None => self.report(ResolveError::UndeclaredMethod {
                class,
                method: method.name.to_string(),
                span: method.span,
            }),
        }
    }
}

fn duplicate(kind: SymbolKind, member: Ident<'_>, class: &str) -> ResolveError {
    ResolveError::DuplicateMember {
        kind,
        name: member.name.to_string(),
        class: class.to_string(),
        span: member.span,
    }
}

/// Convert a written annotation into a semantic type.
pub fn type_of(ty: &TypeExpr<'_>) -> Type {
    match ty {
        TypeExpr::Int => Type::Int,
        TypeExpr::Bool => Type::Bool,
        TypeExpr::Ref(class) => Type::reference(*class),
        TypeExpr::Arrow(arrow) => Type::arrow(
            arrow.params.iter().map(type_of).collect(),
            type_of(&arrow.ret),
        ),
    }
}

fn signature(fun: &FunDecl<'_>) -> FunctionType {
    FunctionType::new(
        fun.params.iter().map(|param| type_of(&param.ty)).collect(),
        type_of(&fun.ret),
    )
}

#[cfg(test)]
mod tests;
