// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased value container.

use crate::types::hierarchy::Object;
use crate::types::{AnyList, AnyMap, MetaTypeRegistry, Metatype, TypeDescriptor, TypeId};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Content of an [`AnyValue`].
#[derive(Clone, Default)]
enum Slot {
    /// Nothing.
    #[default]
    Null,
    /// A plain value of a registered type.
    Value {
        type_id: TypeId,
        value: Arc<dyn Any + Send + Sync>,
    },
    /// A class pointer, possibly null. `type_id` is the static pointer type.
    Object {
        type_id: TypeId,
        object: Option<Arc<dyn Object>>,
    },
}

/// A cheaply clonable box holding one value of any registered type, or
/// nothing.
///
/// Values are immutable once boxed; clones share the content.
///
/// # Identity
///
/// [`descriptor`](Self::descriptor) reports the type the value was boxed as,
/// except for class pointers: those report the most-derived class of the
/// pointee and the highest id registered for it, however the pointer was
/// typed when boxed.
///
/// # Ownership
///
/// A box holding a live object shares ownership of it
/// ([`owns_object`](Self::owns_object)); the object is freed when its last
/// box or [`ObjectPtr`](crate::ObjectPtr) goes away.
/// [`release`](Self::release) gives up this box's share early.
///
/// # Example
///
/// ```rust
/// use metadispatch::{AnyValue, TypeId};
///
/// let v = AnyValue::new(21i32);
/// assert_eq!(v.descriptor().id, TypeId::I32);
/// assert_eq!(v.value::<f64>(), 21.0);
/// assert_eq!(v.value::<String>(), "21");
/// assert!(AnyValue::null().is_null());
/// ```
#[derive(Clone, Default)]
pub struct AnyValue {
    slot: Slot,
}

impl AnyValue {
    /// The empty box.
    pub const fn null() -> Self {
        Self { slot: Slot::Null }
    }

    /// Box a value.
    pub fn new<T: Metatype>(value: T) -> Self {
        value.into_any()
    }

    /// Box a plain value as its registered type.
    pub(crate) fn from_value<T: Metatype>(value: T) -> Self {
        Self {
            slot: Slot::Value {
                type_id: T::meta_type_id(),
                value: Arc::new(value),
            },
        }
    }

    /// Box a class pointer whose static pointer type is `type_id`.
    pub(crate) fn from_object(type_id: TypeId, object: Option<Arc<dyn Object>>) -> Self {
        Self {
            slot: Slot::Object { type_id, object },
        }
    }

    /// True if the box holds nothing. A null class pointer is not null.
    pub fn is_null(&self) -> bool {
        matches!(self.slot, Slot::Null)
    }

    /// Opposite of [`is_null`](Self::is_null).
    pub fn is_valid(&self) -> bool {
        !self.is_null()
    }

    /// Type of the held value (the wildcard for the null box).
    pub fn descriptor(&self) -> TypeDescriptor {
        match &self.slot {
            Slot::Null => TypeDescriptor::wildcard(),
            Slot::Value { type_id, .. } => TypeDescriptor::from_id(*type_id),
            Slot::Object {
                object: Some(object),
                ..
            } => {
                let class = object.class();
                let id = MetaTypeRegistry::global().highest_id_for_class(class);
                TypeDescriptor {
                    id,
                    name: TypeDescriptor::from_id(id).name,
                    hierarchy: Some(class),
                }
            }
            Slot::Object {
                type_id,
                object: None,
            } => TypeDescriptor::from_id(*type_id),
        }
    }

    /// Read the value as `T`, or `T::default()` if that is not possible.
    pub fn value<T: Metatype>(&self) -> T {
        self.try_value().unwrap_or_default()
    }

    /// Read the value as `T`, converting if the registry knows how.
    pub fn try_value<T: Metatype>(&self) -> Option<T> {
        T::from_any(self)
    }

    /// Borrow a plain value of exactly type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.slot {
            Slot::Value { value, .. } => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Exact type first, then the conversion table.
    pub(crate) fn downcast_or_convert<T: Metatype>(&self) -> Option<T> {
        if let Some(value) = self.downcast_ref::<T>() {
            return Some(value.clone());
        }
        if !matches!(self.slot, Slot::Value { .. }) {
            return None;
        }
        let converted = MetaTypeRegistry::global().convert(self, T::meta_type_id())?;
        converted.downcast_ref::<T>().cloned()
    }

    /// True if the value can be read as type `to`.
    ///
    /// Class pointers convert to the pointer types of their ancestors; plain
    /// values ask the conversion table.
    pub fn can_convert(&self, to: TypeId) -> bool {
        match &self.slot {
            Slot::Null => false,
            Slot::Value { type_id, .. } => MetaTypeRegistry::global().can_convert(*type_id, to),
            Slot::Object { .. } => {
                let from = self.descriptor();
                if from.id == to {
                    return true;
                }
                let target = TypeDescriptor::from_id(to);
                match (from.hierarchy, target.hierarchy) {
                    (Some(class), Some(ancestor)) => class.inherits(ancestor),
                    _ => false,
                }
            }
        }
    }

    /// Convert to type `to`; the null box if the conversion fails.
    pub fn convert(&self, to: TypeId) -> AnyValue {
        match &self.slot {
            Slot::Object { object, .. } if self.can_convert(to) => {
                AnyValue::from_object(to, object.clone())
            }
            Slot::Object { .. } => AnyValue::null(),
            _ => MetaTypeRegistry::global()
                .convert(self, to)
                .unwrap_or_default(),
        }
    }

    /// Held object, for class pointer values.
    pub fn object(&self) -> Option<&Arc<dyn Object>> {
        match &self.slot {
            Slot::Object { object, .. } => object.as_ref(),
            _ => None,
        }
    }

    /// True if this box shares ownership of a live object.
    pub fn owns_object(&self) -> bool {
        matches!(self.slot, Slot::Object { object: Some(_), .. })
    }

    /// Drop this box's share of the held object, leaving a null pointer of
    /// the same static type. No-op for anything else.
    pub fn release(&mut self) {
        if let Slot::Object { object, .. } = &mut self.slot {
            *object = None;
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Slot::Null => write!(f, "AnyValue(null)"),
            Slot::Value { .. } => write!(f, "AnyValue({})", self.descriptor()),
            Slot::Object { object, .. } => write!(
                f,
                "AnyValue({}, {})",
                self.descriptor(),
                if object.is_some() { "live" } else { "null" }
            ),
        }
    }
}

macro_rules! impl_from_builtin {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for AnyValue {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )+
    };
}

impl_from_builtin!(bool, i32, u32, i64, u64, f32, f64, String, AnyList, AnyMap);

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

/// Build an `[AnyValue; N]` argument array.
///
/// ```rust
/// use metadispatch::{any_args, AnyValue};
///
/// let args: [AnyValue; 2] = any_args![1i32, String::from("x")];
/// assert_eq!(args[0].value::<i32>(), 1);
/// ```
#[macro_export]
macro_rules! any_args {
    ($($value:expr),* $(,)?) => {
        [$($crate::AnyValue::new($value)),*]
    };
}
