// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Single-inheritance class hierarchies.
//!
//! Rust has no class inheritance, so a "subclass" embeds its parent as a
//! field and [`declare_class!`](crate::declare_class) wires the two together:
//!
//! ```text
//! struct Circle { shape: Shape, radius: f64 }
//! declare_class!(Circle: Shape => shape);
//!
//! ClassNode(Circle) --superclass--> ClassNode(Shape) --superclass--> None
//! ```
//!
//! Each class has exactly one [`ClassNode`], created on first use and kept for
//! the life of the process. Nodes are compared by address.
//!
//! Objects are shared through [`ObjectPtr`], whose most-derived class is
//! always recovered through the virtual [`Object::class`], never from the
//! static pointer type.

use crate::types::{Metatype, TypeId};
use crate::value::AnyValue;
use parking_lot::ReentrantMutex;
use std::any::{Any, TypeId as RustTypeId};
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

/// Canonical node of a class in its single-inheritance chain.
pub struct ClassNode {
    name: &'static str,
    superclass: Option<&'static ClassNode>,
    pointer_type: fn() -> TypeId,
}

impl ClassNode {
    /// Class name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Direct parent class, `None` at the root.
    pub fn superclass(&self) -> Option<&'static ClassNode> {
        self.superclass
    }

    /// This class followed by its superclass chain up to the root.
    pub fn ancestors(&'static self) -> impl Iterator<Item = &'static ClassNode> {
        std::iter::successors(Some(self), |node| node.superclass)
    }

    /// True if `other` is this class or one of its ancestors.
    pub fn inherits(&'static self, other: &ClassNode) -> bool {
        self.ancestors().any(|node| std::ptr::eq(node, other))
    }

    /// Id of `ObjectPtr<ThisClass>`, registering it if needed.
    pub fn pointer_type_id(&self) -> TypeId {
        (self.pointer_type)()
    }
}

impl PartialEq for ClassNode {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ClassNode {}

impl fmt::Debug for ClassNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassNode")
            .field("name", &self.name)
            .field("superclass", &self.superclass.map(|s| s.name))
            .finish()
    }
}

/// A polymorphic object: knows its most-derived class at runtime.
///
/// Implemented by [`declare_class!`](crate::declare_class).
pub trait Object: Any + Send + Sync {
    /// Most-derived class of this object.
    fn class(&self) -> &'static ClassNode;

    /// View this object as `class` (itself or an embedded ancestor).
    ///
    /// Returns `None` when `class` is not on this object's chain.
    fn cast_to(&self, class: &ClassNode) -> Option<&dyn Any>;
}

/// Static side of a class declared with [`declare_class!`](crate::declare_class).
pub trait Class: Object + Sized {
    /// Class name, used for the node and the pointer type name.
    const CLASS_NAME: &'static str;

    /// Node of the direct parent class.
    fn superclass() -> Option<&'static ClassNode>;

    /// Canonical node of this class.
    fn static_class() -> &'static ClassNode {
        class_node::<Self>()
    }
}

type ClassCache = ReentrantMutex<RefCell<HashMap<RustTypeId, &'static ClassNode>>>;

fn class_cache() -> &'static ClassCache {
    static CACHE: OnceLock<ClassCache> = OnceLock::new();
    CACHE.get_or_init(|| ReentrantMutex::new(RefCell::new(HashMap::new())))
}

/// Get (or create) the canonical node of `C`.
///
/// Creating a node resolves the parent first, which re-enters the cache on
/// the same thread.
pub fn class_node<C: Class>() -> &'static ClassNode {
    let key = RustTypeId::of::<C>();
    let cache = class_cache().lock();

    if let Some(node) = cache.borrow().get(&key).copied() {
        return node;
    }

    let superclass = C::superclass();
    let mut created = false;
    let node = *cache.borrow_mut().entry(key).or_insert_with(|| {
        created = true;
        Box::leak(Box::new(ClassNode {
            name: C::CLASS_NAME,
            superclass,
            pointer_type: pointer_type_id::<C>,
        }))
    });
    if created {
        log::debug!(
            "[ClassCache] New class node '{}' (superclass: {:?})",
            C::CLASS_NAME,
            superclass.map(ClassNode::name)
        );
    }
    node
}

fn pointer_type_id<C: Class>() -> TypeId {
    ObjectPtr::<C>::meta_type_id()
}

/// Shared, nullable handle to an object of class `C` or any subclass.
///
/// This is the "pointer-like polymorphic value" of the engine: boxing it in an
/// [`AnyValue`] records the most-derived class of the pointee, not `C`.
pub struct ObjectPtr<C> {
    object: Option<Arc<dyn Object>>,
    _class: PhantomData<fn() -> C>,
}

impl<C: Class> ObjectPtr<C> {
    /// Allocate a new object.
    pub fn new(value: C) -> Self {
        Self::from_arc(Some(Arc::new(value)))
    }

    /// Null pointer.
    pub fn null() -> Self {
        Self::from_arc(None)
    }

    /// Wrap an existing object if its class derives from `C`.
    pub fn from_object(object: Arc<dyn Object>) -> Option<Self> {
        if object.class().inherits(C::static_class()) {
            Some(Self::from_arc(Some(object)))
        } else {
            None
        }
    }

    fn from_arc(object: Option<Arc<dyn Object>>) -> Self {
        Self {
            object,
            _class: PhantomData,
        }
    }

    /// True if no object is held.
    pub fn is_null(&self) -> bool {
        self.object.is_none()
    }

    /// Borrow the object as `C`.
    pub fn get(&self) -> Option<&C> {
        self.object
            .as_deref()?
            .cast_to(C::static_class())?
            .downcast_ref::<C>()
    }

    /// Underlying shared object.
    pub fn object(&self) -> Option<&Arc<dyn Object>> {
        self.object.as_ref()
    }

    /// Most-derived class of the pointee, or `C` when null.
    pub fn class(&self) -> &'static ClassNode {
        self.object
            .as_deref()
            .map_or_else(C::static_class, Object::class)
    }

    /// Checked cast to another class of the same hierarchy.
    ///
    /// Returns a null pointer when the pointee is not a `D`.
    pub fn cast<D: Class>(&self) -> ObjectPtr<D> {
        match &self.object {
            Some(object) if object.class().inherits(D::static_class()) => {
                ObjectPtr::from_arc(Some(Arc::clone(object)))
            }
            _ => ObjectPtr::null(),
        }
    }

    /// True if both handles point to the same object.
    pub fn ptr_eq<D>(&self, other: &ObjectPtr<D>) -> bool {
        match (&self.object, &other.object) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<C> Clone for ObjectPtr<C> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _class: PhantomData,
        }
    }
}

impl<C> Default for ObjectPtr<C> {
    fn default() -> Self {
        Self {
            object: None,
            _class: PhantomData,
        }
    }
}

impl<C: Class> fmt::Debug for ObjectPtr<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectPtr")
            .field("class", &self.class().name())
            .field("null", &self.is_null())
            .finish()
    }
}

impl<C: Class> Metatype for ObjectPtr<C> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("ObjectPtr<{}>", C::CLASS_NAME))
    }

    fn hierarchy() -> Option<&'static ClassNode> {
        Some(C::static_class())
    }

    fn into_any(self) -> AnyValue {
        AnyValue::from_object(Self::meta_type_id(), self.object)
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        let object = value.object()?;
        Self::from_object(Arc::clone(object))
    }
}

/// Declare a polymorphic class.
///
/// A root class takes only its name. A subclass names its parent and the
/// field holding the embedded parent value.
///
/// ```rust
/// use metadispatch::{declare_class, Class, ObjectPtr};
///
/// #[derive(Default)]
/// struct Player {
///     name: String,
/// }
/// declare_class!(Player);
///
/// #[derive(Default)]
/// struct VideoPlayer {
///     player: Player,
///     fps: u32,
/// }
/// declare_class!(VideoPlayer: Player => player);
///
/// let video = ObjectPtr::new(VideoPlayer::default());
/// let as_player = video.cast::<Player>();
/// assert!(as_player.get().is_some());
/// assert_eq!(as_player.class().name(), "VideoPlayer");
/// assert!(VideoPlayer::static_class().inherits(Player::static_class()));
/// ```
#[macro_export]
macro_rules! declare_class {
    ($class:ident) => {
        impl $crate::Object for $class {
            fn class(&self) -> &'static $crate::ClassNode {
                <Self as $crate::Class>::static_class()
            }

            fn cast_to(
                &self,
                class: &$crate::ClassNode,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if ::std::ptr::eq(class, <Self as $crate::Class>::static_class()) {
                    ::std::option::Option::Some(self as &dyn ::std::any::Any)
                } else {
                    ::std::option::Option::None
                }
            }
        }

        impl $crate::Class for $class {
            const CLASS_NAME: &'static str = stringify!($class);

            fn superclass() -> ::std::option::Option<&'static $crate::ClassNode> {
                ::std::option::Option::None
            }
        }
    };
    ($class:ident : $parent:ident => $field:ident) => {
        impl $crate::Object for $class {
            fn class(&self) -> &'static $crate::ClassNode {
                <Self as $crate::Class>::static_class()
            }

            fn cast_to(
                &self,
                class: &$crate::ClassNode,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if ::std::ptr::eq(class, <Self as $crate::Class>::static_class()) {
                    ::std::option::Option::Some(self as &dyn ::std::any::Any)
                } else {
                    <$parent as $crate::Object>::cast_to(&self.$field, class)
                }
            }
        }

        impl $crate::Class for $class {
            const CLASS_NAME: &'static str = stringify!($class);

            fn superclass() -> ::std::option::Option<&'static $crate::ClassNode> {
                ::std::option::Option::Some(<$parent as $crate::Class>::static_class())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Animal {
        legs: u32,
    }
    crate::declare_class!(Animal);

    #[derive(Default)]
    struct Dog {
        animal: Animal,
        name: String,
    }
    crate::declare_class!(Dog: Animal => animal);

    #[derive(Default)]
    struct Puppy {
        dog: Dog,
    }
    crate::declare_class!(Puppy: Dog => dog);

    #[derive(Default)]
    struct Rock;
    crate::declare_class!(Rock);

    #[test]
    fn test_class_node_is_canonical() {
        let a = Dog::static_class();
        let b = class_node::<Dog>();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.name(), "Dog");
    }

    #[test]
    fn test_superclass_chain() {
        let names: Vec<_> = Puppy::static_class()
            .ancestors()
            .map(ClassNode::name)
            .collect();
        assert_eq!(names, vec!["Puppy", "Dog", "Animal"]);
        assert!(Animal::static_class().superclass().is_none());
    }

    #[test]
    fn test_inherits() {
        assert!(Puppy::static_class().inherits(Animal::static_class()));
        assert!(Dog::static_class().inherits(Dog::static_class()));
        assert!(!Animal::static_class().inherits(Dog::static_class()));
        assert!(!Rock::static_class().inherits(Animal::static_class()));
    }

    #[test]
    fn test_object_ptr_cast_and_get() {
        let puppy = ObjectPtr::new(Puppy {
            dog: Dog {
                animal: Animal { legs: 4 },
                name: "Rex".to_string(),
            },
        });

        let dog = puppy.cast::<Dog>();
        assert_eq!(dog.get().map(|d| d.name.as_str()), Some("Rex"));
        assert_eq!(dog.class().name(), "Puppy");

        let animal = puppy.cast::<Animal>();
        assert_eq!(animal.get().map(|a| a.legs), Some(4));
        assert!(animal.ptr_eq(&puppy));

        let rock = puppy.cast::<Rock>();
        assert!(rock.is_null());
        assert_eq!(rock.class().name(), "Rock");
    }

    #[test]
    fn test_downcast_through_base_pointer() {
        let animal: ObjectPtr<Animal> = ObjectPtr::new(Dog::default()).cast();
        assert!(!animal.is_null());
        assert!(!animal.cast::<Dog>().is_null());
        assert!(animal.cast::<Puppy>().is_null());
    }

    #[test]
    fn test_from_object_checks_class() {
        let object: Arc<dyn Object> = Arc::new(Dog::default());
        assert!(ObjectPtr::<Animal>::from_object(Arc::clone(&object)).is_some());
        assert!(ObjectPtr::<Puppy>::from_object(object).is_none());
    }

    #[test]
    fn test_pointer_type_registered_with_hierarchy() {
        let id = Dog::static_class().pointer_type_id();
        assert!(id.is_user_type());
        assert_eq!(id, ObjectPtr::<Dog>::meta_type_id());
        let desc = ObjectPtr::<Dog>::descriptor();
        assert_eq!(desc.name, "ObjectPtr<Dog>");
        assert!(desc.hierarchy.is_some_and(|h| std::ptr::eq(h, Dog::static_class())));
    }
}
