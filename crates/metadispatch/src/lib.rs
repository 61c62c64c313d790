// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # metadispatch - Runtime type dispatch
//!
//! A runtime type registry and multiple-dispatch engine. Independently built
//! modules register handlers for arbitrary value types; callers invoke the
//! right handler from the runtime types of their arguments alone, without a
//! shared compile-time type hierarchy.
//!
//! ## Quick Start
//!
//! ```rust
//! use metadispatch::{declare_class, AnyValue, Dispatcher, ObjectPtr};
//!
//! #[derive(Default)]
//! struct Payload;
//! declare_class!(Payload);
//!
//! #[derive(Default)]
//! struct ImagePayload {
//!     payload: Payload,
//!     width: u32,
//! }
//! declare_class!(ImagePayload: Payload => payload);
//!
//! // "Can this drop target accept this payload?"
//! let mut accepts = Dispatcher::<1>::new();
//! accepts.append_fn(|_: ObjectPtr<Payload>| String::from("generic"));
//! accepts.append_fn(|img: ObjectPtr<ImagePayload>| {
//!     format!("image {}px", img.get().map_or(0, |i| i.width))
//! });
//!
//! // Boxed through a base pointer, dispatched on the most-derived class.
//! let dropped: ObjectPtr<Payload> = ObjectPtr::new(ImagePayload { width: 64, ..Default::default() }).cast();
//! let result = accepts.call_one_match(&[AnyValue::new(dropped)]);
//! assert_eq!(result.value::<String>(), "image 64px");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |  Dispatcher<N>     ordered Function<N> list, match / exact / call   |
//! +---------------------------------------------------------------------+
//! |  Function<N>       erased callable + inferred parameter/return types |
//! +---------------------------------------------------------------------+
//! |  FactoryRegistry   TypeId -> constructor (global)                    |
//! +---------------------------------------------------------------------+
//! |  AnyValue          type-erased box, dynamic identity for objects     |
//! +---------------------------------------------------------------------+
//! |  TypeDescriptor    id + name + class node, is_convertible            |
//! |  MetaTypeRegistry  ids, names, aliases, conversions (global)         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Runtime identity of a registered type |
//! | [`AnyValue`] | Box holding one value of any registered type |
//! | [`ObjectPtr`] | Shared handle to a polymorphic class instance |
//! | [`FactoryRegistry`] | Create values from a type id or name |
//! | [`Function`] | Fixed-arity erased callable with its signature |
//! | [`Dispatcher`] | Multiple dispatch over a list of functions |
//!
//! ## Logging
//!
//! Registrations are logged at `debug` and dispatch misses at `trace`
//! through the [`log`] facade. Install any `log` backend to see them.

/// Reserved type ids and engine limits.
pub mod config;
/// Multiple dispatch (`Function`, `Dispatcher`).
pub mod dispatch;
/// Registration errors.
pub mod error;
/// Factory registry (create values by type id).
pub mod factory;
/// Type identity, class hierarchies, type registry and conversions.
pub mod types;
/// Type-erased value container.
pub mod value;

pub use dispatch::{types_of, Dispatcher, Function, IntoFunction, Invoker, Signature};
pub use error::RegistryError;
pub use factory::FactoryRegistry;
pub use types::{
    convertible_prefix, exact_prefix, is_convertible, AnyHash, AnyList, AnyMap, Class, ClassNode,
    MetaTypeRegistry, Metatype, Object, ObjectPtr, TypeDescriptor, TypeId, TypeList,
};
pub use value::AnyValue;
