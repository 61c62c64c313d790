// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide type registry.
//!
//! # Architecture
//!
//! ```text
//! MetaTypeRegistry (static global)
//! +-- table: ReentrantMutex<RefCell<TypeTable>>
//!
//! TypeTable
//! +-- entries:     BTreeMap<TypeId, TypeEntry>   (name, class node, constructors)
//! +-- by_rust:     HashMap<std::any::TypeId, TypeId>
//! +-- by_name:     HashMap<&str, TypeId>          (names and aliases)
//! +-- by_class:    HashMap<node address, TypeId>  (highest id per leaf class)
//! +-- converters:  HashMap<(TypeId, TypeId), Converter>
//! ```
//!
//! # Thread Safety
//!
//! Plugins may register types from any thread, and registering one type can
//! register another (a class pointer type resolves its class node, a default
//! constructor boxes a value). The lock is therefore re-entrant, and no
//! `RefCell` borrow is held while registry-external code runs.

use crate::config;
use crate::error::RegistryError;
use crate::types::convert;
use crate::types::hierarchy::ClassNode;
use crate::types::{TypeDescriptor, TypeId};
use crate::value::AnyValue;
use parking_lot::ReentrantMutex;
use std::any::TypeId as RustTypeId;
use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

/// List of values.
pub type AnyList = Vec<AnyValue>;
/// The generic string-keyed map of values.
pub type AnyMap = BTreeMap<String, AnyValue>;
/// Hash-based string-keyed map of values.
pub type AnyHash = HashMap<String, AnyValue>;

/// A type usable with the engine: it has a registered id, can be boxed in an
/// [`AnyValue`] and read back from one.
///
/// Implement it with [`declare_metatype!`](crate::declare_metatype); the
/// defaults register the type lazily on first use.
pub trait Metatype: Clone + Default + Send + Sync + 'static {
    /// Name used on registration.
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }

    /// Class node for polymorphic pointer types.
    fn hierarchy() -> Option<&'static ClassNode> {
        None
    }

    /// Registered id, allocated on first call.
    fn meta_type_id() -> TypeId {
        MetaTypeRegistry::global().id_of::<Self>()
    }

    /// Descriptor used for this type in a function signature.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::from_id(Self::meta_type_id())
    }

    /// Box a value.
    fn into_any(self) -> AnyValue {
        AnyValue::from_value(self)
    }

    /// Read a value back, converting if the registry knows how.
    fn from_any(value: &AnyValue) -> Option<Self> {
        value.downcast_or_convert::<Self>()
    }
}

/// Implement [`Metatype`] for one or more types, named as written.
///
/// ```rust
/// use metadispatch::{declare_metatype, AnyValue, Metatype};
///
/// #[derive(Debug, Clone, Default, PartialEq)]
/// struct Interval {
///     min: f64,
///     max: f64,
/// }
/// declare_metatype!(Interval);
///
/// let boxed = AnyValue::new(Interval { min: 0.0, max: 1.0 });
/// assert_eq!(boxed.descriptor().name, "Interval");
/// assert_eq!(boxed.value::<Interval>().max, 1.0);
/// ```
#[macro_export]
macro_rules! declare_metatype {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Metatype for $ty {
                fn type_name() -> ::std::borrow::Cow<'static, str> {
                    ::std::borrow::Cow::Borrowed(stringify!($ty))
                }
            }
        )+
    };
}

crate::declare_metatype!(bool, i32, u32, i64, u64, f32, f64, String);

impl Metatype for AnyList {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("AnyList")
    }
}

impl Metatype for AnyMap {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("AnyMap")
    }
}

impl Metatype for AnyHash {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("AnyHash")
    }
}

impl Metatype for () {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("void")
    }

    fn into_any(self) -> AnyValue {
        AnyValue::null()
    }

    fn from_any(_value: &AnyValue) -> Option<Self> {
        Some(())
    }
}

/// A parameter declared as `AnyValue` accepts anything: its descriptor is the
/// wildcard.
impl Metatype for AnyValue {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("AnyValue")
    }

    fn meta_type_id() -> TypeId {
        TypeId::WILDCARD
    }

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::wildcard()
    }

    fn into_any(self) -> AnyValue {
        self
    }

    fn from_any(value: &AnyValue) -> Option<Self> {
        Some(value.clone())
    }
}

/// Type-erased conversion between two registered types.
pub(crate) type Converter = Arc<dyn Fn(&AnyValue) -> Option<AnyValue> + Send + Sync>;

/// One registered id.
#[derive(Clone)]
struct TypeEntry {
    rust_type: RustTypeId,
    name: &'static str,
    hierarchy: Option<&'static ClassNode>,
    /// Generic default construction (null pointer for class pointer types).
    default_ctor: Option<fn() -> AnyValue>,
    /// Set for class pointer types opted into non-null default construction.
    instance_ctor: Option<fn() -> AnyValue>,
}

pub(crate) struct TypeTable {
    entries: BTreeMap<TypeId, TypeEntry>,
    by_rust: HashMap<RustTypeId, TypeId>,
    by_name: HashMap<&'static str, TypeId>,
    by_class: HashMap<usize, TypeId>,
    converters: HashMap<(TypeId, TypeId), Converter>,
    next_id: u32,
}

fn default_any<T: Metatype>() -> AnyValue {
    T::default().into_any()
}

fn class_key(node: &'static ClassNode) -> usize {
    node as *const ClassNode as usize
}

impl TypeTable {
    fn with_builtins() -> Self {
        let mut table = Self {
            entries: BTreeMap::new(),
            by_rust: HashMap::new(),
            by_name: HashMap::new(),
            by_class: HashMap::new(),
            converters: HashMap::new(),
            next_id: config::USER_TYPE_BASE,
        };

        table.insert_builtin::<()>(TypeId::VOID, "void");
        table.insert_builtin::<bool>(TypeId::BOOL, "bool");
        table.insert_builtin::<i32>(TypeId::I32, "i32");
        table.insert_builtin::<u32>(TypeId::U32, "u32");
        table.insert_builtin::<i64>(TypeId::I64, "i64");
        table.insert_builtin::<u64>(TypeId::U64, "u64");
        table.insert_builtin::<f32>(TypeId::F32, "f32");
        table.insert_builtin::<f64>(TypeId::F64, "f64");
        table.insert_builtin::<String>(TypeId::STRING, "String");
        table.insert_builtin::<AnyList>(TypeId::ANY_LIST, "AnyList");
        table.insert_builtin::<AnyMap>(TypeId::ANY_MAP, "AnyMap");
        table.insert_builtin::<AnyHash>(TypeId::ANY_HASH, "AnyHash");

        convert::install_builtin_converters(&mut table);
        table
    }

    fn insert_builtin<T: Metatype>(&mut self, id: TypeId, name: &'static str) {
        // `()` boxes to the null value and has nothing to default-construct.
        let default_ctor = if id == TypeId::VOID {
            None
        } else {
            Some(default_any::<T> as fn() -> AnyValue)
        };
        self.entries.insert(
            id,
            TypeEntry {
                rust_type: RustTypeId::of::<T>(),
                name,
                hierarchy: None,
                default_ctor,
                instance_ctor: None,
            },
        );
        self.by_rust.insert(RustTypeId::of::<T>(), id);
        self.by_name.insert(name, id);
    }

    fn allocate(&mut self, entry: TypeEntry) -> TypeId {
        let id = TypeId::new(self.next_id);
        self.next_id += 1;

        if let Some(node) = entry.hierarchy {
            let highest = self.by_class.entry(class_key(node)).or_insert(id);
            *highest = (*highest).max(id);
        }
        self.by_name.entry(entry.name).or_insert(id);
        self.entries.insert(id, entry);
        id
    }

    /// Register a typed conversion. Both types must already have ids.
    pub(crate) fn insert_converter<A, B, F>(&mut self, f: F)
    where
        A: Metatype,
        B: Metatype,
        F: Fn(&A) -> Option<B> + Send + Sync + 'static,
    {
        let (Some(&from), Some(&to)) = (
            self.by_rust.get(&RustTypeId::of::<A>()),
            self.by_rust.get(&RustTypeId::of::<B>()),
        ) else {
            return;
        };
        self.converters.insert((from, to), erase_converter(f));
    }

    /// True if both ids are registered for one Rust type (type and alias).
    fn same_type(&self, a: TypeId, b: TypeId) -> bool {
        match (self.entries.get(&a), self.entries.get(&b)) {
            (Some(a), Some(b)) => a.rust_type == b.rust_type,
            _ => false,
        }
    }

        fn descriptor(&self, id: TypeId) -> Option<TypeDescriptor> {
        self.entries.get(&id).map(|entry| TypeDescriptor {
            id,
            name: entry.name,
            hierarchy: entry.hierarchy,
        })
    }
}

fn erase_converter<A, B, F>(f: F) -> Converter
where
    A: Metatype,
    B: Metatype,
    F: Fn(&A) -> Option<B> + Send + Sync + 'static,
{
    Arc::new(move |value: &AnyValue| {
        let input = value.downcast_ref::<A>()?;
        f(input).map(Metatype::into_any)
    })
}

/// The process-wide type registry.
pub struct MetaTypeRegistry {
    table: ReentrantMutex<RefCell<TypeTable>>,
}

impl MetaTypeRegistry {
    fn new() -> Self {
        Self {
            table: ReentrantMutex::new(RefCell::new(TypeTable::with_builtins())),
        }
    }

    /// Get the global registry (created on first access with the builtins).
    pub fn global() -> &'static MetaTypeRegistry {
        static REGISTRY: OnceLock<MetaTypeRegistry> = OnceLock::new();
        REGISTRY.get_or_init(MetaTypeRegistry::new)
    }

    /// Id of `T`, registering it on first call.
    pub fn id_of<T: Metatype>(&self) -> TypeId {
        let key = RustTypeId::of::<T>();
        let guard = self.table.lock();

        if let Some(id) = guard.borrow().by_rust.get(&key).copied() {
            return id;
        }

        // May re-enter the class cache and this registry.
        let hierarchy = T::hierarchy();
        let name = T::type_name();

        let mut table = guard.borrow_mut();
        if let Some(id) = table.by_rust.get(&key).copied() {
            return id;
        }
        let name: &'static str = match name {
            Cow::Borrowed(name) => name,
            Cow::Owned(name) => Box::leak(name.into_boxed_str()),
        };
        let id = table.allocate(TypeEntry {
            rust_type: key,
            name,
            hierarchy,
            default_ctor: Some(default_any::<T>),
            instance_ctor: None,
        });
        table.by_rust.insert(key, id);
        drop(table);
        log::debug!("[MetaTypeRegistry] Registered type '{}' as {}", name, id);
        id
    }

    /// Register another id for `T` under `name`.
    ///
    /// The alias shares the name-less identity of `T`: same class node, same
    /// constructors. For class pointer types, boxed objects of that class
    /// report the highest of their ids, so the alias becomes their dynamic id.
    ///
    /// Registering the same name twice for `T` returns the existing alias.
    pub fn register_alias<T: Metatype>(&self, name: &str) -> Result<TypeId, RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        let original = self.id_of::<T>();

        let guard = self.table.lock();
        let mut table = guard.borrow_mut();

        if let Some(&existing) = table.by_name.get(name) {
            let same_type = table
                .entries
                .get(&existing)
                .is_some_and(|entry| entry.rust_type == RustTypeId::of::<T>());
            return if same_type {
                Ok(existing)
            } else {
                Err(RegistryError::NameConflict {
                    name: name.to_string(),
                    existing,
                })
            };
        }

        let Some(mut entry) = table.entries.get(&original).cloned() else {
            return Err(RegistryError::NameConflict {
                name: name.to_string(),
                existing: original,
            });
        };
        entry.name = Box::leak(name.to_string().into_boxed_str());
        let id = table.allocate(entry);
        drop(table);
        log::debug!(
            "[MetaTypeRegistry] Registered alias '{}' as {} (type {})",
            name,
            id,
            original
        );
        Ok(id)
    }

    /// Register a conversion from `A` to `B` used by [`AnyValue::value`] and
    /// the convertibility test. Replaces any previous `A -> B` conversion.
    pub fn register_converter<A, B, F>(&self, f: F)
    where
        A: Metatype,
        B: Metatype,
        F: Fn(&A) -> Option<B> + Send + Sync + 'static,
    {
        let from = A::meta_type_id();
        let to = B::meta_type_id();
        let converter = erase_converter(f);

        let guard = self.table.lock();
        guard.borrow_mut().converters.insert((from, to), converter);
        log::debug!("[MetaTypeRegistry] Registered converter {} -> {}", from, to);
    }

    /// Descriptor of a registered id.
    pub fn descriptor(&self, id: TypeId) -> Option<TypeDescriptor> {
        let guard = self.table.lock();
        let table = guard.borrow();
        table.descriptor(id)
    }

    /// True if `id` is registered (the wildcard is not).
    pub fn is_registered(&self, id: TypeId) -> bool {
        let guard = self.table.lock();
        let table = guard.borrow();
        table.entries.contains_key(&id)
    }

    /// Id bound to a type name or alias.
    pub fn id_from_name(&self, name: &str) -> Option<TypeId> {
        let guard = self.table.lock();
        let table = guard.borrow();
        table.by_name.get(name).copied()
    }

    /// Class node of a class pointer type, by type name or alias.
    pub fn class_from_name(&self, name: &str) -> Option<&'static ClassNode> {
        let guard = self.table.lock();
        let table = guard.borrow();
        let id = table.by_name.get(name)?;
        table.entries.get(id)?.hierarchy
    }

    /// All registered ids at or above [`config::USER_TYPE_BASE`], ascending.
    pub fn user_type_ids(&self) -> Vec<TypeId> {
        let guard = self.table.lock();
        let table = guard.borrow();
        table
            .entries
            .range(TypeId::new(config::USER_TYPE_BASE)..)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Highest id registered for a leaf class, registering the class pointer
    /// type if it was never used.
    pub fn highest_id_for_class(&self, class: &'static ClassNode) -> TypeId {
        let fallback = class.pointer_type_id();
        let guard = self.table.lock();
        let table = guard.borrow();
        table
            .by_class
            .get(&class_key(class))
            .copied()
            .unwrap_or(fallback)
    }

    /// Generic default construction of `id`.
    ///
    /// Class pointer types yield a null pointer unless opted into non-null
    /// default construction. Unknown ids yield the null value.
    pub fn default_value(&self, id: TypeId) -> AnyValue {
        let ctor = {
            let guard = self.table.lock();
            let table = guard.borrow();
            table
                .entries
                .get(&id)
                .and_then(|entry| entry.instance_ctor.or(entry.default_ctor))
        };
        ctor.map_or_else(AnyValue::null, |ctor| ctor())
    }

    /// Like [`default_value`](Self::default_value), but class pointer types
    /// always yield a null pointer.
    pub fn null_value(&self, id: TypeId) -> AnyValue {
        let ctor = {
            let guard = self.table.lock();
            let table = guard.borrow();
            table.entries.get(&id).and_then(|entry| entry.default_ctor)
        };
        ctor.map_or_else(AnyValue::null, |ctor| ctor())
    }

    /// Make generic default construction of `id` produce a live instance.
    ///
    /// Applies to every alias of the same class as well. Returns `false` if
    /// `id` is not a registered class pointer type.
    pub fn set_instance_constructor(&self, id: TypeId, ctor: fn() -> AnyValue) -> bool {
        let guard = self.table.lock();
        let mut table = guard.borrow_mut();

        let Some(class) = table.entries.get(&id).and_then(|entry| entry.hierarchy) else {
            return false;
        };
        for entry in table.entries.values_mut() {
            if entry.hierarchy.is_some_and(|h| std::ptr::eq(h, class)) {
                entry.instance_ctor = Some(ctor);
            }
        }
        drop(table);
        log::debug!(
            "[MetaTypeRegistry] Class '{}' opted into non-null default construction",
            class.name()
        );
        true
    }

    /// True if `id` is a class pointer type with non-null default construction.
    pub fn has_instance_constructor(&self, id: TypeId) -> bool {
        let guard = self.table.lock();
        let table = guard.borrow();
        table
            .entries
            .get(&id)
            .is_some_and(|entry| entry.instance_ctor.is_some())
    }

    /// True if the conversion table supports `from -> to`, or both ids name
    /// the same Rust type (`from == to` or an alias).
    pub fn can_convert(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let guard = self.table.lock();
        let table = guard.borrow();
        table.same_type(from, to) || table.converters.contains_key(&(from, to))
    }

    /// Convert a boxed value through the conversion table.
    pub fn convert(&self, value: &AnyValue, to: TypeId) -> Option<AnyValue> {
        let from = value.descriptor().id;
        if from == to {
            return Some(value.clone());
        }
        let converter = {
            let guard = self.table.lock();
            let table = guard.borrow();
            if table.same_type(from, to) {
                return Some(value.clone());
            }
            table.converters.get(&(from, to)).cloned()
        }?;
        converter(value)
    }
}

impl std::fmt::Debug for MetaTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.table.lock();
        let table = guard.borrow();
        f.debug_struct("MetaTypeRegistry")
            .field("types", &table.entries.len())
            .field("converters", &table.converters.len())
            .finish()
    }
}
