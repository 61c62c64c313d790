// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-arity type-erased function wrapper.

use crate::types::{Metatype, TypeDescriptor, TypeList};
use crate::value::AnyValue;
use std::fmt;
use std::sync::Arc;

/// Erased callable of arity `N`.
pub type Invoker<const N: usize> = Arc<dyn Fn(&[AnyValue; N]) -> AnyValue + Send + Sync>;

/// A callable usable as a [`Function<N>`].
///
/// Implemented for every `Fn(A0, .., An) -> R` with up to five parameters whose
/// types implement [`Metatype`]. `Args` is a marker (`fn(A0, .., An) -> R`)
/// that keeps the impls for different arities apart; it is always inferred.
///
/// A parameter declared as [`AnyValue`] is recorded as the wildcard and
/// receives the argument unchanged. A `()` return is recorded as `void` and
/// yields the null value.
pub trait IntoFunction<const N: usize, Args>: Send + Sync + 'static {
    /// Descriptor of each parameter, in order.
    fn param_types() -> TypeList;

    /// Descriptor of the return value.
    fn return_type() -> TypeDescriptor;

    /// Erase the callable.
    fn into_invoker(self) -> Invoker<N>;
}

/// An explicit dispatch signature, written as a function pointer type.
///
/// Used to pin the registered signature of a callable whose own parameters
/// are broader, e.g. a closure over `AnyValue` that should only be picked for
/// `i32` arguments:
///
/// ```rust
/// use metadispatch::{AnyValue, Function, TypeId};
///
/// let f = Function::<1>::with_signature::<fn(i32) -> String, _, _>(|v: AnyValue| {
///     format!("got {}", v.value::<i32>())
/// });
/// assert_eq!(f.param_types()[0].id, TypeId::I32);
/// assert_eq!(f.call(&[AnyValue::new(3i32)]).value::<String>(), "got 3");
/// ```
pub trait Signature<const N: usize> {
    /// Descriptor of each parameter, in order.
    fn param_types() -> TypeList;

    /// Descriptor of the return value.
    fn return_type() -> TypeDescriptor;
}

macro_rules! impl_arity {
    ($n:literal; $($arg:ident => $idx:tt),*) => {
        impl<F, R, $($arg,)*> IntoFunction<$n, fn($($arg,)*) -> R> for F
        where
            F: Fn($($arg),*) -> R + Send + Sync + 'static,
            R: Metatype,
            $($arg: Metatype,)*
        {
            fn param_types() -> TypeList {
                vec![$(<$arg as Metatype>::descriptor()),*]
            }

            fn return_type() -> TypeDescriptor {
                R::descriptor()
            }

            #[allow(unused_variables)]
            fn into_invoker(self) -> Invoker<$n> {
                Arc::new(move |args: &[AnyValue; $n]| {
                    (self)($(args[$idx].value::<$arg>()),*).into_any()
                })
            }
        }

        impl<R, $($arg,)*> Signature<$n> for fn($($arg,)*) -> R
        where
            R: Metatype,
            $($arg: Metatype,)*
        {
            fn param_types() -> TypeList {
                vec![$(<$arg as Metatype>::descriptor()),*]
            }

            fn return_type() -> TypeDescriptor {
                R::descriptor()
            }
        }
    };
}

impl_arity!(0;);
impl_arity!(1; A0 => 0);
impl_arity!(2; A0 => 0, A1 => 1);
impl_arity!(3; A0 => 0, A1 => 1, A2 => 2);
impl_arity!(4; A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_arity!(5; A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);

// One impl_arity! line per arity up to MAX_ARITY.
const _: () = assert!(crate::config::MAX_ARITY == 5);

/// Type-erased callable of arity `N` together with its signature.
///
/// Two functions are equal when their parameter and return types are equal;
/// the wrapped callables are never compared. A default-constructed function
/// holds no callable and returns the null value.
///
/// # Example
///
/// ```rust
/// use metadispatch::{AnyValue, Function, TypeId};
///
/// let add = Function::<2>::new(|a: i32, b: i32| a + b);
/// assert_eq!(add.param_types()[1].id, TypeId::I32);
/// assert_eq!(add.return_type().id, TypeId::I32);
///
/// let sum = add.call(&[AnyValue::new(2i32), AnyValue::from("40")]);
/// assert_eq!(sum.value::<i32>(), 42);
/// ```
pub struct Function<const N: usize> {
    invoker: Option<Invoker<N>>,
    param_types: TypeList,
    return_type: TypeDescriptor,
}

impl<const N: usize> Function<N> {
    /// Wrap a callable, inferring the signature from its parameter and return
    /// types.
    pub fn new<F, Args>(f: F) -> Self
    where
        F: IntoFunction<N, Args>,
    {
        Self {
            param_types: F::param_types(),
            return_type: F::return_type(),
            invoker: Some(f.into_invoker()),
        }
    }

    /// Wrap a callable under an explicit signature `S`.
    pub fn with_signature<S, F, Args>(f: F) -> Self
    where
        S: Signature<N>,
        F: IntoFunction<N, Args>,
    {
        Self {
            param_types: S::param_types(),
            return_type: S::return_type(),
            invoker: Some(f.into_invoker()),
        }
    }

    /// A null function carrying the signature `S`, for removal by signature.
    pub fn from_signature<S: Signature<N>>() -> Self {
        Self {
            invoker: None,
            param_types: S::param_types(),
            return_type: S::return_type(),
        }
    }

    /// Build from a raw invoker and a signature.
    ///
    /// `param_types` is padded with wildcards or truncated to `N` entries.
    pub fn from_parts<F>(mut param_types: TypeList, return_type: TypeDescriptor, f: F) -> Self
    where
        F: Fn(&[AnyValue; N]) -> AnyValue + Send + Sync + 'static,
    {
        param_types.resize(N, TypeDescriptor::wildcard());
        Self {
            invoker: Some(Arc::new(f)),
            param_types,
            return_type,
        }
    }

    /// Invoke with up to `N` arguments.
    ///
    /// Missing trailing arguments are passed as the null value, so their
    /// parameters receive a default value. Extra arguments are ignored.
    pub fn call(&self, args: &[AnyValue]) -> AnyValue {
        let Some(invoker) = &self.invoker else {
            return AnyValue::null();
        };
        let args: [AnyValue; N] =
            std::array::from_fn(|i| args.get(i).cloned().unwrap_or_default());
        invoker(&args)
    }

    /// True if a callable is held.
    pub fn is_valid(&self) -> bool {
        self.invoker.is_some()
    }

    /// True if no callable is held.
    pub fn is_null(&self) -> bool {
        self.invoker.is_none()
    }

    /// Parameter types (`N` entries, none for a default-constructed function).
    pub fn param_types(&self) -> &[TypeDescriptor] {
        &self.param_types
    }

    /// Return type.
    pub fn return_type(&self) -> TypeDescriptor {
        self.return_type
    }

    /// Number of parameters.
    pub const fn arity(&self) -> usize {
        N
    }
}

impl<const N: usize> Clone for Function<N> {
    fn clone(&self) -> Self {
        Self {
            invoker: self.invoker.clone(),
            param_types: self.param_types.clone(),
            return_type: self.return_type,
        }
    }
}

impl<const N: usize> Default for Function<N> {
    fn default() -> Self {
        Self {
            invoker: None,
            param_types: TypeList::new(),
            return_type: TypeDescriptor::wildcard(),
        }
    }
}

impl<const N: usize> PartialEq for Function<N> {
    fn eq(&self, other: &Self) -> bool {
        self.param_types == other.param_types && self.return_type == other.return_type
    }
}

impl<const N: usize> fmt::Debug for Function<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function<{}>(", N)?;
        for (i, param) in self.param_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.return_type)?;
        if self.is_null() {
            write!(f, " [null]")?;
        }
        Ok(())
    }
}

/// Descriptors of a list of argument values.
pub fn types_of(args: &[AnyValue]) -> TypeList {
    args.iter().map(AnyValue::descriptor).collect()
}
