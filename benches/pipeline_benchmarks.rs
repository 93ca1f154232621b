//! Performance benchmarks for the compiler passes.
//!
//! Programs are built directly with `AstBuilder`, so the numbers cover
//! resolution, type checking and code generation only:
//! - Size-based: chains of 10 to 1000 global functions
//! - Class hierarchies: deep inheritance with overriding methods
//! - Execution: compile and run a recursive program on the reference machine
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use fool::{AstBuilder, Pipeline, Program, TypeExpr};
use std::hint::black_box;

/// Initialize puffin profiler.
#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `f0(n) = n + 1`, `fk(n) = f{k-1}(n) + 1`, body `f{count-1}(0)`.
fn function_chain<'a>(b: &AstBuilder<'a>, count: usize) -> Program<'a> {
    let mut decls = Vec::with_capacity(count);
    for k in 0..count {
        let n = b.param("n", TypeExpr::Int);
        let inner = if k == 0 {
            b.ident("n")
        } else {
            b.call(&format!("f{}", k - 1), &[b.ident("n")])
        };
        decls.push(b.fun(&format!("f{k}"), &[n], TypeExpr::Int, &[], b.add(inner, b.int(1))));
    }
    let body = b.call(&format!("f{}", count - 1), &[b.int(0)]);
    b.program(&decls, body)
}

/// `C0 <- C1 <- ... <- C{depth-1}`, each adding a field and overriding `get`.
fn class_tower<'a>(b: &AstBuilder<'a>, depth: usize) -> Program<'a> {
    let mut decls = Vec::with_capacity(depth + 1);
    for k in 0..depth {
        let field = format!("x{k}");
        let get = b.method("get", &[], TypeExpr::Int, &[], b.ident(&field));
        let superclass = (k > 0).then(|| format!("C{}", k - 1));
        decls.push(b.class(
            &format!("C{k}"),
            superclass.as_deref(),
            &[b.field(&field, TypeExpr::Int)],
            &[get],
        ));
    }
    let args: Vec<_> = (0..depth).map(|k| b.int(k as i32)).collect();
    let last = format!("C{}", depth - 1);
    decls.push(b.var("o", b.ref_type("C0"), b.new_object(&last, &args)));
    b.program(&decls, b.method_call("o", "get", &[]))
}

fn size_based_benchmarks(c: &mut Criterion) {
    setup_profiler();
    let mut group = c.benchmark_group("pipeline/function_chain");
    let pipeline = Pipeline::default();

    for count in [10, 100, 1000] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = function_chain(&b, count);
        group.throughput(Throughput::Elements(u64::from(b.node_count())));
        group.bench_function(format!("{count}_functions"), |bench| {
            bench.iter(|| {
                let output = pipeline.compile(black_box(&program));
                end_profiling_frame();
                black_box(output.map(|o| o.assembly.map(|a| a.len())))
            });
        });
    }

    group.finish();
}

fn class_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/class_tower");
    let pipeline = Pipeline::default();

    for depth in [5, 50, 200] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = class_tower(&b, depth);
        group.throughput(Throughput::Elements(u64::from(b.node_count())));
        group.bench_function(format!("depth_{depth}"), |bench| {
            bench.iter(|| {
                let output = pipeline.compile(black_box(&program));
                end_profiling_frame();
                black_box(output.map(|o| o.assembly.map(|a| a.len())))
            });
        });
    }

    group.finish();
}

fn execution_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/execution");
    let pipeline = Pipeline::default();

    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let n = b.param("n", TypeExpr::Int);
    let body = b.if_then_else(
        b.le(b.ident("n"), b.int(1)),
        b.int(1),
        b.add(
            b.call("fib", &[b.sub(b.ident("n"), b.int(1))]),
            b.call("fib", &[b.sub(b.ident("n"), b.int(2))]),
        ),
    );
    let fib = b.fun("fib", &[n], TypeExpr::Int, &[], body);
    let program = b.program(&[fib], b.call("fib", &[b.int(15)]));

    group.bench_function("fib_15", |bench| {
        bench.iter(|| black_box(pipeline.run(black_box(&program)).map(|o| o.result)));
    });

    group.finish();
}

criterion_group!(
    benches,
    size_based_benchmarks,
    class_benchmarks,
    execution_benchmarks
);

criterion_main!(benches);
