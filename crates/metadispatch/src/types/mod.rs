// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type identity and convertibility.
//!
//! A [`TypeDescriptor`] names a registered type by numeric [`TypeId`] and, for
//! polymorphic class types, carries the canonical [`ClassNode`] of the class.
//! [`is_convertible`] decides whether a value of one type can be passed where
//! another is expected; it is the predicate behind every dispatch query.
//!
//! # Example
//!
//! ```rust
//! use metadispatch::{declare_class, is_convertible, Metatype, ObjectPtr, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Shape;
//! declare_class!(Shape);
//!
//! #[derive(Default)]
//! struct Circle {
//!     shape: Shape,
//! }
//! declare_class!(Circle: Shape => shape);
//!
//! let circle = ObjectPtr::<Circle>::descriptor();
//! let shape = ObjectPtr::<Shape>::descriptor();
//! assert!(is_convertible(&circle, &shape));
//! assert!(!is_convertible(&shape, &circle));
//! assert!(is_convertible(&circle, &TypeDescriptor::wildcard()));
//! ```

mod convert;
pub mod hierarchy;
pub mod registry;

pub use hierarchy::{Class, ClassNode, Object, ObjectPtr};
pub use registry::{AnyHash, AnyList, AnyMap, MetaTypeRegistry, Metatype};

use crate::config;
use crate::factory::FactoryRegistry;
use std::fmt;

/// Opaque, process-stable identifier of a registered type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TypeId(u32);

impl TypeId {
    /// Accepts any type.
    pub const WILDCARD: Self = Self(config::WILDCARD_TYPE_ID);
    /// `()`.
    pub const VOID: Self = Self(config::VOID_TYPE_ID);
    /// `bool`.
    pub const BOOL: Self = Self(config::BOOL_TYPE_ID);
    /// `i32`.
    pub const I32: Self = Self(config::I32_TYPE_ID);
    /// `u32`.
    pub const U32: Self = Self(config::U32_TYPE_ID);
    /// `i64`.
    pub const I64: Self = Self(config::I64_TYPE_ID);
    /// `u64`.
    pub const U64: Self = Self(config::U64_TYPE_ID);
    /// `f32`.
    pub const F32: Self = Self(config::F32_TYPE_ID);
    /// `f64`.
    pub const F64: Self = Self(config::F64_TYPE_ID);
    /// `String`.
    pub const STRING: Self = Self(config::STRING_TYPE_ID);
    /// [`AnyList`].
    pub const ANY_LIST: Self = Self(config::ANY_LIST_TYPE_ID);
    /// [`AnyMap`], the generic string-keyed map of values.
    pub const ANY_MAP: Self = Self(config::ANY_MAP_TYPE_ID);
    /// [`AnyHash`].
    pub const ANY_HASH: Self = Self(config::ANY_HASH_TYPE_ID);

    /// Wrap a raw id.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw id value.
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// True for the wildcard id `0`.
    pub const fn is_wildcard(self) -> bool {
        self.0 == config::WILDCARD_TYPE_ID
    }

    /// True for ids at or above [`config::USER_TYPE_BASE`].
    pub const fn is_user_type(self) -> bool {
        self.0 >= config::USER_TYPE_BASE
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime description of a registered type.
///
/// Equality is **not** plain field equality: two descriptors are equal when
/// their ids match, or when both carry a hierarchy node and the nodes are the
/// same class. The same leaf class can be registered under several ids (see
/// [`MetaTypeRegistry::register_alias`]) and all of them describe one type.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    /// Registered id (`0` for the wildcard).
    pub id: TypeId,
    /// Registered name (empty for the wildcard and unknown ids).
    pub name: &'static str,
    /// Class node, for polymorphic class pointer types only.
    pub hierarchy: Option<&'static ClassNode>,
}

impl TypeDescriptor {
    /// The wildcard descriptor (id `0`).
    pub const fn wildcard() -> Self {
        Self {
            id: TypeId::WILDCARD,
            name: "",
            hierarchy: None,
        }
    }

    /// Describe a registered id.
    ///
    /// Unknown ids keep their numeric value with an empty name and no
    /// hierarchy, so they only ever compare equal to themselves.
    pub fn from_id(id: TypeId) -> Self {
        if id.is_wildcard() {
            return Self::wildcard();
        }
        MetaTypeRegistry::global()
            .descriptor(id)
            .unwrap_or(Self {
                id,
                name: "",
                hierarchy: None,
            })
    }

    /// Describe a [`Metatype`].
    pub fn of<T: Metatype>() -> Self {
        T::descriptor()
    }

    /// True for the wildcard descriptor.
    pub fn is_wildcard(&self) -> bool {
        self.id.is_wildcard()
    }

    /// True when this type is a polymorphic class pointer.
    pub fn is_class(&self) -> bool {
        self.hierarchy.is_some()
    }
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        if self.id == other.id {
            return true;
        }
        match (self.hierarchy, other.hierarchy) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

impl From<TypeId> for TypeDescriptor {
    fn from(id: TypeId) -> Self {
        Self::from_id(id)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("class", &self.hierarchy.map(ClassNode::name))
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            write!(f, "<any>")
        } else if self.name.is_empty() {
            write!(f, "<unknown:{}>", self.id)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Ordered parameter types of a [`Function`](crate::Function).
pub type TypeList = Vec<TypeDescriptor>;

/// Check if a value of type `from` can be used where `to` is expected.
///
/// Rules, first match wins:
/// 1. equal descriptors convert;
/// 2. everything converts to the wildcard;
/// 3. nothing converts to [`AnyMap`] (the conversion table would accept any
///    map-like type, which is wrong for matching);
/// 4. a class type converts to the classes on its superclass chain and to
///    no value type;
/// 5. otherwise a transient default instance of `from` is asked whether the
///    conversion table can turn it into `to`.
///
/// Unregistered ids only convert through rules 1 and 2.
pub fn is_convertible(from: &TypeDescriptor, to: &TypeDescriptor) -> bool {
    if from == to || to.is_wildcard() {
        return true;
    }

    if to.id == TypeId::ANY_MAP {
        return false;
    }

    if let Some(from_class) = from.hierarchy {
        return match to.hierarchy {
            Some(to_class) => from_class.inherits(to_class),
            None => false,
        };
    }

    // Dropped at scope end; a class instance would be freed with it.
    let probe = FactoryRegistry::global().create_by_type_id(from.id);
    if probe.is_null() {
        return false;
    }
    probe.can_convert(to.id)
}

/// Check that every supplied argument type converts to its parameter.
///
/// Only the common prefix is compared; missing arguments match.
pub fn convertible_prefix(args: &[TypeDescriptor], params: &[TypeDescriptor]) -> bool {
    args.iter()
        .zip(params)
        .all(|(arg, param)| is_convertible(arg, param))
}

/// Check that every supplied argument type is exactly its parameter type.
///
/// When either side is a class type the class nodes are compared instead of
/// the ids, so a leaf class matches whichever of its ids was captured.
pub fn exact_prefix(args: &[TypeDescriptor], params: &[TypeDescriptor]) -> bool {
    args.iter().zip(params).all(|(arg, param)| {
        if arg.hierarchy.is_some() || param.hierarchy.is_some() {
            match (arg.hierarchy, param.hierarchy) {
                (Some(a), Some(b)) => std::ptr::eq(a, b),
                _ => false,
            }
        } else {
            arg.id == param.id
        }
    })
}
