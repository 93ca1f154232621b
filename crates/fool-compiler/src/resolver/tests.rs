use bumpalo::Bump;
use fool_ast::{AstBuilder, Decl, Expr, NodeId, TypeExpr};
use fool_core::{ResolveError, SymbolKind, Type};

use super::*;

fn use_id(expr: &Expr<'_>) -> NodeId {
    match expr {
        Expr::Ident(ident) => ident.id,
        Expr::Call(call) => call.id,
        Expr::MethodCall(call) => call.id,
        Expr::New(new) => new.id,
        other => panic!("not a name-using expression: {other:?}"),
    }
}

#[test]
fn global_offsets() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let x = b.var("x", TypeExpr::Int, b.int(5));
    let f = b.fun("f", &[], TypeExpr::Int, &[], b.int(1));
    let y = b.var("y", TypeExpr::Bool, b.bool(true));
    let body = b.ident("x");
    let program = b.program(&[x, f, y], body);

    let resolution = resolve(&program);
    assert!(!resolution.has_errors());
    assert_eq!(resolution.declaration(x.id()).map(|e| e.offset), Some(-2));
    assert_eq!(resolution.declaration(f.id()).map(|e| e.offset), Some(-3));
    assert_eq!(resolution.declaration(y.id()).map(|e| e.offset), Some(-5));

    let binding = resolution.binding(use_id(&body)).expect("x resolved");
    assert_eq!(binding.depth, 0);
    assert_eq!(binding.entry, SymbolEntry::new(0, Type::Int, -2));
}

#[test]
fn function_frame_layout() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let a = b.param("a", TypeExpr::Int);
    let g = b.param("g", b.arrow_type(&[TypeExpr::Int], TypeExpr::Int));
    let flag = b.param("flag", TypeExpr::Bool);
    let local = b.var("l", TypeExpr::Int, b.ident("a"));
    let body = b.ident("l");
    let f = b.fun("f", &[a, g, flag], TypeExpr::Int, &[local], body);
    let program = b.program(&[f], b.int(0));

    let resolution = resolve(&program);
    assert!(!resolution.has_errors(), "{:?}", resolution.errors());
    let offset = |id| resolution.declaration(id).map(|e| e.offset);
    assert_eq!(offset(a.id), Some(1));
    assert_eq!(offset(g.id), Some(3));
    assert_eq!(offset(flag.id), Some(4));
    assert_eq!(offset(local.id()), Some(-2));

    let binding = resolution.binding(use_id(&body)).expect("l resolved");
    assert_eq!((binding.depth, binding.entry.depth), (1, 1));
}

#[test]
fn nested_use_counts_hops() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let x = b.var("x", TypeExpr::Int, b.int(1));
    let use_x = b.ident("x");
    let inner = b.fun("inner", &[], TypeExpr::Int, &[], use_x);
    let call_inner = b.call("inner", &[]);
    let outer = b.fun("outer", &[], TypeExpr::Int, &[inner], call_inner);
    let call_outer = b.call("outer", &[]);
    let program = b.program(&[x, outer], call_outer);

    let resolution = resolve(&program);
    assert!(!resolution.has_errors());
    let hops = |expr: &Expr<'_>| resolution.binding(use_id(expr)).map(Binding::hops);
    assert_eq!(hops(&use_x), Some(2));
    assert_eq!(hops(&call_inner), Some(0));
    assert_eq!(hops(&call_outer), Some(0));
}

#[test]
fn redeclaration_is_counted() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let first = b.var("x", TypeExpr::Int, b.int(1));
    let second = b.at(2).var("x", TypeExpr::Bool, b.bool(false));
    let p = b.param("p", TypeExpr::Int);
    let q = b.param("p", TypeExpr::Int);
    let f = b.at(3).fun("f", &[p, q], TypeExpr::Int, &[], b.ident("p"));
    let program = b.program(&[first, second, f], b.ident("x"));

    let resolution = resolve(&program);
    assert_eq!(resolution.error_count(), 2);
    assert_eq!(
        resolution.errors()[0].to_string(),
        "variable 'x' at line 2 already declared"
    );
    assert!(matches!(
        resolution.errors()[1],
        ResolveError::Redeclared {
            kind: SymbolKind::Parameter,
            ..
        }
    ));
}

#[test]
fn undeclared_name_is_left_unbound() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let body = b.add(b.ident("y"), b.int(1));
    let Expr::Binary(sum) = body else {
        panic!("expected a sum");
    };
    let program = b.program(&[], body);

    let resolution = resolve(&program);
    assert_eq!(resolution.error_count(), 1);
    assert!(resolution.binding(use_id(&sum.left)).is_none());
}

#[test]
fn inheritance_layout() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let use_x = b.ident("x");
    let get_x = b.method("getX", &[], TypeExpr::Int, &[], use_x);
    let x = b.field("x", TypeExpr::Int);
    let a = b.class("A", None, &[x], &[get_x]);

    let y = b.field("y", TypeExpr::Int);
    let get_y = b.method("getY", &[], TypeExpr::Int, &[], b.ident("y"));
    let get_x2 = b.method("getX", &[], TypeExpr::Int, &[], b.int(7));
    let class_b = b.class("B", Some("A"), &[y], &[get_y, get_x2]);
    let program = b.program(&[a, class_b], b.int(0));

    let resolution = resolve(&program);
    assert!(!resolution.has_errors(), "{:?}", resolution.errors());

    let offset = |id| resolution.declaration(id).map(|e| e.offset);
    assert_eq!(offset(x.id), Some(-1));
    assert_eq!(offset(get_x.id), Some(0));
    assert_eq!(offset(y.id), Some(-2));
    assert_eq!(resolution.member_position(y.id), Some(1));
    assert_eq!(offset(get_y.id), Some(1));
    assert_eq!(offset(get_x2.id), Some(0));

    let info = resolution.class("B").expect("B declared");
    assert_eq!(info.superclass.as_deref(), Some("A"));
    assert_eq!(info.class_type().fields, vec![Type::Int, Type::Int]);
    assert_eq!(info.class_type().methods.len(), 2);
    assert_eq!(info.entry.offset, -3);
    assert_eq!(resolution.hierarchy().superclass("B"), Some("A"));

    // The superclass record is untouched by the subclass.
    let base = resolution.class("A").expect("A declared");
    assert_eq!(base.class_type().fields.len(), 1);
    assert_eq!(base.class_type().methods.len(), 1);

    let binding = resolution.binding(use_id(&use_x)).expect("field resolved");
    assert_eq!(binding.depth, 2);
    assert_eq!(binding.entry, SymbolEntry::new(CLASS_DEPTH, Type::Int, -1));
}

#[test]
fn member_clashes() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let m = b.method("m", &[], TypeExpr::Int, &[], b.int(1));
    let a = b.class("A", None, &[], &[m]);
    let field_m = b.at(2).field("m", TypeExpr::Int);
    let class_b = b.class("B", Some("A"), &[field_m], &[]);
    let z1 = b.at(3).field("z", TypeExpr::Int);
    let z2 = b.field("z", TypeExpr::Int);
    let class_c = b.class("C", None, &[z1, z2], &[]);
    let program = b.program(&[a, class_b, class_c], b.int(0));

    let resolution = resolve(&program);
    assert_eq!(resolution.error_count(), 2);
    assert_eq!(
        resolution.errors()[0].to_string(),
        "cannot override method 'm' with a field at line 2"
    );
    assert!(matches!(
        resolution.errors()[1],
        ResolveError::DuplicateMember {
            kind: SymbolKind::Field,
            ..
        }
    ));
    assert_eq!(
        resolution.class("C").map(|c| c.class_type().fields.len()),
        Some(1)
    );
}

#[test]
fn classes_must_be_global() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let m = b.method("m", &[], TypeExpr::Int, &[], b.ident("undeclared"));
    let inner = b.class("C", None, &[], &[m]);
    let f = b.fun("f", &[], TypeExpr::Int, &[inner], b.int(1));
    let program = b.program(&[f], b.int(0));

    // the misplaced class body is still resolved
    let resolution = resolve(&program);
    assert!(matches!(
        resolution.errors(),
        [
            ResolveError::ClassNotGlobal { .. },
            ResolveError::Undeclared {
                kind: SymbolKind::Identifier,
                ..
            }
        ]
    ));
    assert!(resolution.class("C").is_none());
    assert!(resolution.hierarchy().superclass("C").is_none());
}

#[test]
fn rejected_members_bodies_are_resolved() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let first = b.method("m", &[], TypeExpr::Int, &[], b.int(1));
    let duplicate = b.method("m", &[], TypeExpr::Int, &[], b.ident("undeclared"));
    let class_a = b.class("A", None, &[b.field("x", TypeExpr::Int)], &[first, duplicate]);
    // a method clashing with an inherited field
    let clash = b.method("x", &[], TypeExpr::Int, &[], b.ident("missing"));
    let class_b = b.class("B", Some("A"), &[], &[clash]);
    let program = b.program(&[class_a, class_b], b.int(0));

    let resolution = resolve(&program);
    let errors = resolution.errors();
    assert_eq!(errors.len(), 4);
    assert!(matches!(
        errors[0],
        ResolveError::DuplicateMember {
            kind: SymbolKind::Method,
            ..
        }
    ));
    assert_eq!(errors[1].to_string(), "identifier 'undeclared' at line 1 not declared");
    assert!(matches!(errors[2], ResolveError::IllegalOverride { .. }));
    assert_eq!(errors[3].to_string(), "identifier 'missing' at line 1 not declared");
    assert!(resolution.declaration(duplicate.id).is_none());
    assert!(resolution.declaration(clash.id).is_none());
}

#[test]
fn undeclared_superclass_resolves_as_root() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let x = b.field("x", TypeExpr::Int);
    let class_b = b.class("B", Some("Missing"), &[x], &[]);
    let program = b.program(&[class_b], b.int(0));

    let resolution = resolve(&program);
    assert!(matches!(
        resolution.errors(),
        [ResolveError::UndeclaredSuperclass { .. }]
    ));
    assert_eq!(resolution.declaration(x.id).map(|e| e.offset), Some(-1));
    assert_eq!(resolution.hierarchy().superclass("B"), None);
}

#[test]
fn method_calls_on_objects() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let m = b.method("m", &[], TypeExpr::Int, &[], b.int(1));
    let a = b.class("A", None, &[], &[m]);
    let obj = b.var("obj", b.ref_type("A"), b.new_object("A", &[]));
    let n = b.var("n", TypeExpr::Int, b.int(3));
    let good = b.method_call("obj", "m", &[]);
    let missing = b.method_call("obj", "nope", &[]);
    let not_object = b.method_call("n", "m", &[]);
    let body = b.add(good, b.add(missing, not_object));
    let program = b.program(&[a, obj, n], body);

    let resolution = resolve(&program);
    let call = resolution.method_call(use_id(&good)).expect("obj.m resolved");
    assert_eq!(call.class, "A");
    assert_eq!(call.method.offset, 0);
    assert_eq!(call.receiver.entry.offset, -3);

    assert!(resolution.method_call(use_id(&missing)).is_none());
    assert!(matches!(
        resolution.errors(),
        [
            ResolveError::UndeclaredMethod { .. },
            ResolveError::NotAnObject { .. }
        ]
    ));
}

#[test]
fn methods_see_later_siblings_and_their_class() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let call_g = b.call("g", &[]);
    let f = b.method("f", &[], TypeExpr::Int, &[], call_g);
    let g = b.method("g", &[], TypeExpr::Int, &[], b.int(1));
    let make = b.new_object("A", &[]);
    let clone = b.method("clone", &[], b.ref_type("A"), &[], make);
    let a = b.class("A", None, &[], &[f, g, clone]);
    let program = b.program(&[a], b.int(0));

    let resolution = resolve(&program);
    assert!(!resolution.has_errors(), "{:?}", resolution.errors());
    let binding = resolution.binding(use_id(&call_g)).expect("g resolved");
    assert_eq!(binding.entry.offset, 1);
    assert!(matches!(binding.entry.ty, Type::Method(_)));

    let class = resolution.binding(use_id(&make)).expect("A resolved");
    let Type::Class(class_type) = &class.entry.ty else {
        panic!("expected a class entry");
    };
    assert_eq!(class_type.methods.len(), 3);
}

#[test]
fn redeclared_class_keeps_first() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let x = b.field("x", TypeExpr::Int);
    let first = b.class("A", None, &[x], &[]);
    let second: Decl<'_> = b.class("A", None, &[], &[]);
    let program = b.program(&[first, second], b.int(0));

    let resolution = resolve(&program);
    assert_eq!(resolution.error_count(), 1);
    assert_eq!(
        resolution.class("A").map(|c| c.class_type().fields.len()),
        Some(1)
    );
    assert!(resolution.declaration(second.id()).is_none());
}
