// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Multiple dispatch over a list of [`Function`]s of one arity.

use super::function::{types_of, Function, IntoFunction, Signature};
use crate::types::{convertible_prefix, exact_prefix, TypeDescriptor};
use crate::value::AnyValue;

/// Ordered collection of functions of arity `N`, selected by argument types.
///
/// Registration order matters: "call one" queries invoke the *last* matching
/// function, so a later registration shadows earlier ones with an equal or
/// broader signature.
///
/// A dispatcher is a plain value with no interior locking; share it behind
/// the caller's own lock if several threads mutate it.
///
/// # Example
///
/// ```rust
/// use metadispatch::{AnyValue, Dispatcher};
///
/// let mut describe = Dispatcher::<1>::new();
/// describe.append_fn(|v: i32| format!("int {}", v));
/// describe.append_fn(|v: f64| format!("double {}", v));
///
/// assert_eq!(describe.call(&[AnyValue::new(2i32)]).value::<String>(), "int 2");
/// assert_eq!(describe.call(&[AnyValue::new(2.5f64)]).value::<String>(), "double 2.5");
///
/// // i32 converts to f64, so both match
/// assert_eq!(describe.call_all_match(&[AnyValue::new(2i32)]).len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct Dispatcher<const N: usize> {
    functions: Vec<Function<N>>,
}

impl<const N: usize> Dispatcher<N> {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// True for a non-zero arity.
    pub const fn is_valid(&self) -> bool {
        N != 0
    }

    /// Number of parameters of every function.
    pub const fn arity(&self) -> usize {
        N
    }

    /// Registered functions, in registration order.
    pub fn functions(&self) -> &[Function<N>] {
        &self.functions
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if no function is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Append a function.
    pub fn append(&mut self, function: Function<N>) {
        log::debug!("[Dispatcher] Append {:?}", function);
        self.functions.push(function);
    }

    /// Append a callable with its inferred signature.
    pub fn append_fn<F, Args>(&mut self, f: F)
    where
        F: IntoFunction<N, Args>,
    {
        self.append(Function::new(f));
    }

    /// Append a callable under the explicit signature `S`.
    pub fn append_as<S, F, Args>(&mut self, f: F)
    where
        S: Signature<N>,
        F: IntoFunction<N, Args>,
    {
        self.append(Function::with_signature::<S, F, Args>(f));
    }

    /// Remove every function with the same signature as `function`.
    ///
    /// Returns the number of removed functions.
    pub fn remove(&mut self, function: &Function<N>) -> usize {
        let before = self.functions.len();
        self.functions.retain(|f| f != function);
        let removed = before - self.functions.len();
        if removed > 0 {
            log::debug!("[Dispatcher] Removed {} x {:?}", removed, function);
        }
        removed
    }

    /// Remove every function registered under the signature `S`.
    pub fn remove_as<S: Signature<N>>(&mut self) -> usize {
        self.remove(&Function::from_signature::<S>())
    }

    /// Remove every function sharing a signature with one of `functions`.
    pub fn remove_all(&mut self, functions: &[Function<N>]) -> usize {
        functions.iter().map(|f| self.remove(f)).sum()
    }

    /// Remove all functions.
    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Functions accepting the given argument types.
    ///
    /// Positions beyond `arg_types` always match; more than `N` argument types
    /// never match.
    pub fn match_types(&self, arg_types: &[TypeDescriptor]) -> Vec<Function<N>> {
        self.select(arg_types, convertible_prefix)
    }

    /// Functions whose parameter types are exactly the given argument types.
    ///
    /// Class types are compared by class, whichever of their ids was used.
    pub fn exact_match(&self, arg_types: &[TypeDescriptor]) -> Vec<Function<N>> {
        self.select(arg_types, exact_prefix)
    }

    /// [`match_types`](Self::match_types) on the types of `args`.
    pub fn match_args(&self, args: &[AnyValue]) -> Vec<Function<N>> {
        self.match_types(&types_of(args))
    }

    /// [`exact_match`](Self::exact_match) on the types of `args`.
    pub fn exact_match_args(&self, args: &[AnyValue]) -> Vec<Function<N>> {
        self.exact_match(&types_of(args))
    }

    /// Call the last function accepting `args`; null if none does.
    pub fn call_one_match(&self, args: &[AnyValue]) -> AnyValue {
        match self.match_args(args).last() {
            Some(f) => f.call(args),
            None => AnyValue::null(),
        }
    }

    /// Call the last function exactly matching `args`; null if none does.
    pub fn call_one_exact_match(&self, args: &[AnyValue]) -> AnyValue {
        match self.exact_match_args(args).last() {
            Some(f) => f.call(args),
            None => AnyValue::null(),
        }
    }

    /// Call every function accepting `args`, in registration order.
    pub fn call_all_match(&self, args: &[AnyValue]) -> Vec<AnyValue> {
        self.match_args(args).iter().map(|f| f.call(args)).collect()
    }

    /// Call every function exactly matching `args`, in registration order.
    pub fn call_all_exact_match(&self, args: &[AnyValue]) -> Vec<AnyValue> {
        self.exact_match_args(args)
            .iter()
            .map(|f| f.call(args))
            .collect()
    }

    /// Same as [`call_one_exact_match`](Self::call_one_exact_match).
    pub fn call(&self, args: &[AnyValue]) -> AnyValue {
        self.call_one_exact_match(args)
    }

    fn select(
        &self,
        arg_types: &[TypeDescriptor],
        accepts: fn(&[TypeDescriptor], &[TypeDescriptor]) -> bool,
    ) -> Vec<Function<N>> {
        if arg_types.len() > N {
            log::trace!(
                "[Dispatcher] {} argument types for arity {}, no match",
                arg_types.len(),
                N
            );
            return Vec::new();
        }
        let found: Vec<_> = self
            .functions
            .iter()
            .filter(|f| accepts(arg_types, f.param_types()))
            .cloned()
            .collect();
        if found.is_empty() {
            log::trace!("[Dispatcher] No function for {:?}", arg_types);
        }
        found
    }
}

impl<const N: usize> Extend<Function<N>> for Dispatcher<N> {
    fn extend<I: IntoIterator<Item = Function<N>>>(&mut self, iter: I) {
        for function in iter {
            self.append(function);
        }
    }
}

impl<const N: usize> FromIterator<Function<N>> for Dispatcher<N> {
    fn from_iter<I: IntoIterator<Item = Function<N>>>(iter: I) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.extend(iter);
        dispatcher
    }
}

impl<const N: usize> std::fmt::Debug for Dispatcher<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("arity", &N)
            .field("functions", &self.functions)
            .finish()
    }
}
