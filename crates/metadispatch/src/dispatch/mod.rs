// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime multiple dispatch.
//!
//! A [`Function<N>`] wraps a callable of `N` parameters (0 to
//! [`MAX_ARITY`](crate::config::MAX_ARITY)) together with the descriptors of
//! its parameter and return types. A [`Dispatcher<N>`] holds an ordered list of
//! them and selects by the runtime types of the arguments:
//!
//! ```text
//! args: [AnyValue; k <= N]
//!   |
//!   +-- types_of(args) ---------------> [TypeDescriptor; k]
//!   |
//!   +-- match_types   : is_convertible(arg[i], param[i]) for i < k
//!   +-- exact_match   : same class / same id             for i < k
//!   |
//!   +-- call_one_*    : invoke the last selected function
//!   +-- call_all_*    : invoke all, registration order
//! ```
//!
//! "No match" is never an error: queries return an empty list, single calls
//! the null value.

mod dispatcher;
mod function;

pub use dispatcher::Dispatcher;
pub use function::{types_of, Function, IntoFunction, Invoker, Signature};

#[cfg(test)]
mod tests;
