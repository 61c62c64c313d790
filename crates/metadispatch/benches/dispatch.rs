// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting
#![allow(clippy::cast_possible_truncation)] // Test parameters

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metadispatch::{
    declare_class, is_convertible, AnyValue, Dispatcher, Metatype, ObjectPtr, TypeDescriptor,
    TypeId,
};

#[derive(Default)]
struct Node;
declare_class!(Node);

#[derive(Default)]
struct Branch {
    node: Node,
}
declare_class!(Branch: Node => node);

#[derive(Default)]
struct Leaf {
    branch: Branch,
}
declare_class!(Leaf: Branch => branch);

fn populated_dispatcher() -> Dispatcher<1> {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|v: i32| i64::from(v));
    d.append_fn(|v: f64| v as i64);
    d.append_fn(|v: String| v.len() as i64);
    d.append_fn(|_: ObjectPtr<Node>| 1i64);
    d.append_fn(|_: ObjectPtr<Branch>| 2i64);
    d.append_fn(|_: ObjectPtr<Leaf>| 3i64);
    d.append_fn(|_: AnyValue| -1i64);
    d
}

// ============================================================================
// Convertibility
// ============================================================================

/// Benchmark: class chain walk (leaf -> root)
fn bench_is_convertible_class(c: &mut Criterion) {
    let leaf = ObjectPtr::<Leaf>::descriptor();
    let node = ObjectPtr::<Node>::descriptor();
    c.bench_function("is_convertible_class_depth3", |b| {
        b.iter(|| is_convertible(black_box(&leaf), black_box(&node)))
    });
}

/// Benchmark: value types (transient instance + conversion table)
fn bench_is_convertible_value(c: &mut Criterion) {
    let from = TypeDescriptor::from_id(TypeId::I32);
    let to = TypeDescriptor::from_id(TypeId::F64);
    c.bench_function("is_convertible_i32_f64", |b| {
        b.iter(|| is_convertible(black_box(&from), black_box(&to)))
    });
}

// ============================================================================
// Dispatch
// ============================================================================

/// Benchmark: exact match + call, 7 registered functions
fn bench_call_exact(c: &mut Criterion) {
    let d = populated_dispatcher();
    let args = [AnyValue::new(ObjectPtr::new(Leaf::default()))];
    c.bench_function("dispatch_call_exact_class", |b| {
        b.iter(|| d.call(black_box(&args)))
    });
}

/// Benchmark: convertible match + call, 7 registered functions
fn bench_call_match(c: &mut Criterion) {
    let d = populated_dispatcher();
    let args = [AnyValue::new(42i32)];
    c.bench_function("dispatch_call_one_match_i32", |b| {
        b.iter(|| d.call_one_match(black_box(&args)))
    });
}

/// Benchmark: boxing and reading back a scalar
fn bench_any_value_roundtrip(c: &mut Criterion) {
    c.bench_function("any_value_i32_to_f64", |b| {
        b.iter(|| AnyValue::new(black_box(7i32)).value::<f64>())
    });
}

criterion_group!(
    benches,
    bench_is_convertible_class,
    bench_is_convertible_value,
    bench_call_exact,
    bench_call_match,
    bench_any_value_roundtrip
);
criterion_main!(benches);
