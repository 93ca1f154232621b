//! Type checking of a resolved program.
//!
//! Computes a type for every expression and validates every declaration.
//! Failures travel as [`CheckError`]: genuine violations are recorded,
//! while [`CheckError::Incomplete`] marks a subtree resolution could not
//! decorate and is dropped without a second report.
//!
//! Each declaration is a recovery point: an error inside it is recorded
//! and checking resumes with the next declaration.

use fool_ast::{BinaryOp, ClassDecl, Decl, Expr, FunDecl, OpClass, Program};
use fool_core::{CheckError, FunctionType, Span, SymbolKind, Type, TypeError};

use crate::resolver::{Resolution, type_of};
use crate::type_rels::ClassHierarchy;

type CheckResult<T> = Result<T, CheckError>;

/// Result of type checking a program.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheck {
    /// Type of the program body, when it could be computed.
    pub result: Option<Type>,
    pub errors: Vec<TypeError>,
}

impl TypeCheck {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// Type check `program` using the decorations in `resolution`.
#[tracing::instrument(skip_all)]
pub fn check(program: &Program<'_>, resolution: &Resolution) -> TypeCheck {
    let mut checker = TypeChecker {
        resolution,
        hierarchy: resolution.hierarchy(),
        errors: Vec::new(),
    };
    for decl in program.decls {
        checker.guarded(|c| c.decl(decl));
    }
    let result = match checker.expr(&program.body) {
        Ok(ty) => Some(ty),
        Err(err) => {
            checker.absorb(err);
            None
        }
    };
    tracing::debug!(errors = checker.errors.len(), result = ?result, "type checking finished");
    TypeCheck {
        result,
        errors: checker.errors,
    }
}

struct TypeChecker<'r> {
    resolution: &'r Resolution,
    hierarchy: &'r ClassHierarchy,
    errors: Vec<TypeError>,
}

impl<'r> TypeChecker<'r> {
    fn report(&mut self, error: TypeError) {
        tracing::warn!(%error, "type error");
        self.errors.push(error);
    }

    fn absorb(&mut self, err: CheckError) {
        match err {
            CheckError::Type(error) => self.report(error),
            CheckError::Incomplete => {}
        }
    }

    /// Run one declaration-level check, recording its failure.
    fn guarded(&mut self, check: impl FnOnce(&mut Self) -> CheckResult<()>) {
        if let Err(err) = check(self) {
            self.absorb(err);
        }
    }

    fn is_subtype(&self, a: &Type, b: &Type) -> bool {
        self.hierarchy.is_subtype(a, b)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, decl: &Decl<'_>) -> CheckResult<()> {
        match decl {
            Decl::Var(var) => {
                let declared = type_of(&var.ty);
                let init = self.expr(&var.init)?;
                if !self.is_subtype(&init, &declared) {
                    return Err(TypeError::IncompatibleVariable {
                        name: var.name.name.to_string(),
                        span: var.span,
                    }
                    .into());
                }
                Ok(())
            }
            Decl::Fun(fun) => self.function(fun, SymbolKind::Function),
            Decl::Class(class) => {
                self.class(class);
                Ok(())
            }
        }
    }

    /// Local declarations first, then the body against the return type.
    fn function(&mut self, fun: &FunDecl<'_>, kind: SymbolKind) -> CheckResult<()> {
        for decl in fun.decls {
            self.guarded(|c| c.decl(decl));
        }
        let ret = type_of(&fun.ret);
        let body = self.expr(&fun.body)?;
        if !self.is_subtype(&body, &ret) {
            return Err(TypeError::WrongReturn {
                kind,
                name: fun.name.name.to_string(),
                span: fun.span,
            }
            .into());
        }
        Ok(())
    }

    fn class(&mut self, class: &ClassDecl<'_>) {
        // Classes resolution rejected are not checked.
        if self.resolution.declaration(class.id).is_none() {
            return;
        }
        let name = class.name.name;
        let inherited = self
            .resolution
            .class(name)
            .and_then(|info| info.superclass.as_deref())
            .and_then(|superclass| self.resolution.class(superclass))
            .map(|info| info.class_type().clone());

        if let Some(inherited) = inherited {
            for field in class.fields {
                let Some(position) = self.resolution.member_position(field.id) else {
                    continue;
                };
                let Some(parent) = inherited.fields.get(position) else {
                    continue;
                };
                if !self.is_subtype(&type_of(&field.ty), parent) {
                    self.report(TypeError::BadOverride {
                        kind: SymbolKind::Field,
                        class: name.to_string(),
                        name: field.name.name.to_string(),
                        span: field.name.span,
                    });
                }
            }
            for method in class.methods {
                let Some(position) = self.resolution.member_position(method.id) else {
                    continue;
                };
                let Some(parent) = inherited.methods.get(position) else {
                    continue;
                };
                let own = Type::Method(FunctionType::new(
                    method.params.iter().map(|p| type_of(&p.ty)).collect(),
                    type_of(&method.ret),
                ));
                if !self.is_subtype(&own, &Type::Method(parent.clone())) {
                    self.report(TypeError::BadOverride {
                        kind: SymbolKind::Method,
                        class: name.to_string(),
                        name: method.name.name.to_string(),
                        span: method.name.span,
                    });
                }
            }
        }

        for method in class.methods {
            if self.resolution.declaration(method.id).is_some() {
                self.guarded(|c| c.function(method, SymbolKind::Method));
            }
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr<'_>) -> CheckResult<Type> {
        let resolution = self.resolution;
        match expr {
            Expr::Int(_) => Ok(Type::Int),
            Expr::Bool(_) => Ok(Type::Bool),
            Expr::Null(_) => Ok(Type::Empty),
            Expr::Ident(ident) => {
                let binding = resolution.binding(ident.id).ok_or(CheckError::Incomplete)?;
                let name = ident.name.name.to_string();
                let span = ident.name.span;
                match &binding.entry.ty {
                    Type::Method(_) => Err(TypeError::MethodAsValue { name, span }.into()),
                    Type::Class(_) => Err(TypeError::ClassAsValue { name, span }.into()),
                    ty => Ok(ty.clone()),
                }
            }
            Expr::Binary(binary) => {
                let left = self.expr(&binary.left)?;
                let right = self.expr(&binary.right)?;
                self.binary(binary.op, &left, &right, binary.span)
            }
            Expr::Not(not) => {
                let operand = self.expr(&not.operand)?;
                if !self.is_subtype(&operand, &Type::Bool) {
                    return Err(TypeError::NonBoolean {
                        op: "not",
                        span: not.span,
                    }
                    .into());
                }
                Ok(Type::Bool)
            }
            Expr::If(cond) => {
                let condition = self.expr(&cond.condition)?;
                if !self.is_subtype(&condition, &Type::Bool) {
                    return Err(TypeError::NonBooleanCondition { span: cond.span }.into());
                }
                let then_ty = self.expr(&cond.then_expr)?;
                let else_ty = self.expr(&cond.else_expr)?;
                self.hierarchy
                    .lowest_common_ancestor(&then_ty, &else_ty)
                    .ok_or_else(|| TypeError::IncompatibleBranches { span: cond.span }.into())
            }
            Expr::Print(print) => self.expr(&print.value),
            Expr::Call(call) => {
                let binding = resolution.binding(call.id).ok_or(CheckError::Incomplete)?;
                let name = call.callee.name;
                let Some(sig) = binding.entry.ty.as_function() else {
                    return Err(TypeError::NotCallable {
                        name: name.to_string(),
                        span: call.span,
                    }
                    .into());
                };
                self.arguments(name, sig, call.args, call.span)
            }
            Expr::MethodCall(call) => {
                let resolved = resolution
                    .method_call(call.id)
                    .ok_or(CheckError::Incomplete)?;
                let name = call.method.name;
                let Some(sig) = resolved.method.ty.as_function() else {
                    return Err(TypeError::NotCallable {
                        name: name.to_string(),
                        span: call.span,
                    }
                    .into());
                };
                self.arguments(name, sig, call.args, call.span)
            }
            Expr::New(new) => {
                let binding = resolution.binding(new.id).ok_or(CheckError::Incomplete)?;
                let class = new.class.name;
                let Type::Class(class_type) = &binding.entry.ty else {
                    return Err(TypeError::NotAClass {
                        name: class.to_string(),
                        span: new.span,
                    }
                    .into());
                };
                if class_type.fields.len() != new.args.len() {
                    return Err(TypeError::WrongFieldCount {
                        class: class.to_string(),
                        expected: class_type.fields.len(),
                        found: new.args.len(),
                        span: new.span,
                    }
                    .into());
                }
                for (i, (arg, field)) in new.args.iter().zip(&class_type.fields).enumerate() {
                    let ty = self.expr(arg)?;
                    if !self.is_subtype(&ty, field) {
                        return Err(TypeError::WrongFieldValue {
                            class: class.to_string(),
                            position: i + 1,
                            span: new.span,
                        }
                        .into());
                    }
                }
                Ok(Type::reference(class))
            }
        }
    }

    fn binary(&self, op: BinaryOp, left: &Type, right: &Type, span: Span) -> CheckResult<Type> {
        match op.class() {
            OpClass::Arithmetic => {
                if !(self.is_subtype(left, &Type::Int) && self.is_subtype(right, &Type::Int)) {
                    return Err(TypeError::NonInteger {
                        op: op.describe(),
                        span,
                    }
                    .into());
                }
                Ok(Type::Int)
            }
            OpClass::Logical => {
                if !(self.is_subtype(left, &Type::Bool) && self.is_subtype(right, &Type::Bool)) {
                    return Err(TypeError::NonBoolean {
                        op: op.describe(),
                        span,
                    }
                    .into());
                }
                Ok(Type::Bool)
            }
            OpClass::Comparison => {
                if left.as_function().is_some() || right.as_function().is_some() {
                    return Err(TypeError::FunctionalComparison {
                        op: op.describe(),
                        span,
                    }
                    .into());
                }
                if !(self.is_subtype(left, right) || self.is_subtype(right, left)) {
                    return Err(TypeError::IncomparableOperands {
                        op: op.describe(),
                        span,
                    }
                    .into());
                }
                Ok(Type::Bool)
            }
        }
    }

    /// Check call arguments against a signature and yield its return type.
    fn arguments(
        &mut self,
        name: &str,
        sig: &FunctionType,
        args: &[Expr<'_>],
        span: Span,
    ) -> CheckResult<Type> {
        if sig.arity() != args.len() {
            return Err(TypeError::WrongArity {
                name: name.to_string(),
                expected: sig.arity(),
                found: args.len(),
                span,
            }
            .into());
        }
        for (i, (arg, param)) in args.iter().zip(&sig.params).enumerate() {
            let ty = self.expr(arg)?;
            if !self.is_subtype(&ty, param) {
                return Err(TypeError::WrongArgument {
                    name: name.to_string(),
                    position: i + 1,
                    span,
                }
                .into());
            }
        }
        Ok((*sig.ret).clone())
    }
}
