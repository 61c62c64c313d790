// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dispatcher tests.

use super::*;
use crate::types::{AnyHash, AnyMap, MetaTypeRegistry, Metatype, ObjectPtr, TypeDescriptor, TypeId};
use crate::value::AnyValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Base {
    id: u32,
}
crate::declare_class!(Base);

#[derive(Default)]
struct Derived {
    base: Base,
}
crate::declare_class!(Derived: Base => base);

#[derive(Default)]
struct Unrelated;
crate::declare_class!(Unrelated);

#[derive(Default)]
struct Sprite;
crate::declare_class!(Sprite);

fn derived_arg(id: u32) -> AnyValue {
    AnyValue::new(ObjectPtr::new(Derived { base: Base { id } }))
}

#[test]
fn test_end_to_end_base_derived_wildcard() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|_: ObjectPtr<Base>| String::from("base"));
    d.append_fn(|_: ObjectPtr<Derived>| String::from("derived"));
    d.append_fn(|_: AnyValue| String::from("any"));

    let arg = derived_arg(1);
    let types = types_of(std::slice::from_ref(&arg));

    let matched: Vec<_> = d
        .match_types(&types)
        .iter()
        .map(|f| f.call(std::slice::from_ref(&arg)).value::<String>())
        .collect();
    assert_eq!(matched, vec!["base", "derived", "any"]);

    let exact = d.exact_match(&types);
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].param_types()[0], ObjectPtr::<Derived>::descriptor());
}

#[test]
fn test_call_one_picks_last_registration() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|v: i32| v + 1);
    d.append_fn(|v: i32| v + 100);

    let args = [AnyValue::new(1i32)];
    assert_eq!(d.call_one_exact_match(&args).value::<i32>(), 101);
    assert_eq!(d.call_one_match(&args).value::<i32>(), 101);
    assert_eq!(d.call(&args).value::<i32>(), 101);
}

#[test]
fn test_base_argument_does_not_reach_derived() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|p: ObjectPtr<Base>| p.get().map_or(0, |b| b.id));
    d.append_fn(|_: ObjectPtr<Derived>| u32::MAX);

    let base = [AnyValue::new(ObjectPtr::new(Base { id: 5 }))];
    assert_eq!(d.match_args(&base).len(), 1);
    assert_eq!(d.call_one_match(&base).value::<u32>(), 5);

    // Typed as base when boxed, still dispatched as derived.
    let derived = ObjectPtr::new(Derived { base: Base { id: 6 } });
    let upcast = [AnyValue::new(derived.cast::<Base>())];
    assert_eq!(d.call_one_match(&upcast).value::<u32>(), u32::MAX);
    assert_eq!(d.call_all_match(&upcast).len(), 2);
}

#[test]
fn test_unrelated_class_never_matches() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|_: ObjectPtr<Base>| true);
    d.append_fn(|_: i32| true);

    let args = [AnyValue::new(ObjectPtr::new(Unrelated))];
    assert!(d.match_args(&args).is_empty());
    assert!(d.call_one_match(&args).is_null());
    assert!(d.call_all_match(&args).is_empty());
}

#[test]
fn test_more_argument_types_than_arity_never_match() {
    let mut d = Dispatcher::<2>::new();
    d.append_fn(|_: AnyValue, _: AnyValue| ());

    let any = TypeDescriptor::wildcard();
    assert_eq!(d.match_types(&[any, any]).len(), 1);
    assert!(d.match_types(&[any, any, any]).is_empty());
    assert!(d.exact_match(&[any, any, any]).is_empty());
}

#[test]
fn test_fewer_arguments_match_prefix() {
    let mut d = Dispatcher::<2>::new();
    d.append_fn(|a: i32, b: String| format!("{}{}", a, b));
    d.append_fn(|_: String, _: String| String::from("strings"));

    let args = [AnyValue::new(7i32)];
    let found = d.exact_match_args(&args);
    assert_eq!(found.len(), 1);
    assert_eq!(d.call(&args).value::<String>(), "7");
    assert_eq!(d.match_types(&[]).len(), 2);
}

#[test]
fn test_remove_by_signature() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|v: i32| v.to_string());
    d.append_fn(|v: f64| v.to_string());
    d.append_fn(|_: i32| String::from("other"));

    let removed = d.remove(&Function::new(|_: i32| String::new()));
    assert_eq!(removed, 2);
    assert_eq!(d.len(), 1);

    let i32_sig = [TypeDescriptor::from_id(TypeId::I32)];
    assert!(d
        .match_types(&i32_sig)
        .iter()
        .all(|f| f.param_types()[0].id != TypeId::I32));
    assert!(d.exact_match(&i32_sig).is_empty());

    // Same parameters, different return type: not the same entry.
    assert_eq!(d.remove(&Function::new(|_: f64| 0i32)), 0);
    assert_eq!(d.len(), 1);

    assert_eq!(d.remove_as::<fn(f64) -> String>(), 1);
    assert!(d.is_empty());
}

#[test]
fn test_remove_all_extend_clear() {
    let a = Function::<1>::new(|v: i64| v);
    let b = Function::<1>::new(|v: u64| v);
    let c = Function::<1>::new(|v: bool| v);

    let mut d: Dispatcher<1> = vec![a.clone(), b.clone()].into_iter().collect();
    d.extend([c.clone(), a.clone()]);
    assert_eq!(d.len(), 4);

    assert_eq!(d.remove_all(&[a, c]), 3);
    assert_eq!(d.functions(), &[b]);

    d.clear();
    assert!(d.is_empty());
}

#[test]
fn test_explicit_signature() {
    let mut d = Dispatcher::<1>::new();
    d.append_as::<fn(String) -> u64, _, _>(|v: AnyValue| v.value::<String>().len() as u64);

    let f = &d.functions()[0];
    assert_eq!(f.param_types()[0].id, TypeId::STRING);
    assert_eq!(f.return_type().id, TypeId::U64);

    assert_eq!(d.call(&[AnyValue::from("four")]).value::<u64>(), 4);
    assert!(d.call(&[AnyValue::new(4i32)]).is_null());
}

#[test]
fn test_void_return() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut d = Dispatcher::<1>::new();
    let counter = Arc::clone(&hits);
    d.append_fn(move |n: u32| {
        counter.fetch_add(n as usize, Ordering::SeqCst);
    });

    assert_eq!(d.functions()[0].return_type().id, TypeId::VOID);
    assert!(d.call(&[AnyValue::new(3u32)]).is_null());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn test_generic_map_parameter_rejects_hash() {
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|m: AnyMap| m.is_empty());

    let hash = [AnyValue::new(AnyHash::new())];
    let map = [AnyValue::new(AnyMap::new())];
    assert!(d.match_args(&hash).is_empty());
    assert_eq!(d.match_args(&map).len(), 1);
}

#[test]
fn test_exact_match_through_alias_id() {
    let original = ObjectPtr::<Sprite>::descriptor();
    let mut d = Dispatcher::<1>::new();
    d.append_fn(|_: ObjectPtr<Sprite>| 1i32);

    let alias = MetaTypeRegistry::global()
        .register_alias::<ObjectPtr<Sprite>>("SpriteHandle")
        .expect("alias");
    let arg = [AnyValue::new(ObjectPtr::new(Sprite))];
    let arg_type = arg[0].descriptor();
    assert_eq!(arg_type.id, alias);
    assert_ne!(arg_type.id, original.id);

    assert_eq!(d.exact_match_args(&arg).len(), 1);
    assert_eq!(d.call(&arg).value::<i32>(), 1);
}

#[test]
fn test_call_all_preserves_order() {
    let mut d = Dispatcher::<2>::new();
    d.append_fn(|a: f64, b: f64| a + b);
    d.append_fn(|a: i32, b: i32| a * b);
    d.append_fn(|_: AnyValue, _: AnyValue| String::from("any"));

    let results = d.call_all_match(&[AnyValue::new(3i32), AnyValue::new(4i32)]);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].value::<f64>(), 7.0);
    assert_eq!(results[1].value::<i32>(), 12);
    assert_eq!(results[2].value::<String>(), "any");

    let exact = d.call_all_exact_match(&[AnyValue::new(3i32), AnyValue::new(4i32)]);
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].value::<i32>(), 12);
}

#[test]
fn test_dispatcher_properties() {
    let d = Dispatcher::<3>::new();
    assert!(d.is_valid());
    assert_eq!(d.arity(), 3);
    assert!(!Dispatcher::<0>::new().is_valid());
}

#[test]
fn test_zero_arity_dispatch() {
    let mut d = Dispatcher::<0>::new();
    d.append_fn(|| 42u64);
    assert_eq!(d.call(&[]).value::<u64>(), 42);
    assert!(d.match_args(&[AnyValue::new(1i32)]).is_empty());
}
