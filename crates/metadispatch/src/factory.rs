// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Factory Registry
//!
//! Process-wide mapping from [`TypeId`] to a zero-argument constructor, used to
//! materialize a value of a type known only by id at runtime.
//!
//! # Architecture
//!
//! ```text
//! FactoryRegistry (static global)
//! +-- factories: ReentrantMutex<RefCell<HashMap<TypeId, Factory>>>
//!
//! create_by_type_id(id)
//! +-- registered factory?         -> call it
//! +-- else MetaTypeRegistry       -> generic default construction
//!     +-- class pointer, opted in -> live instance
//!     +-- class pointer           -> null pointer
//!     +-- unknown id              -> null value
//! ```
//!
//! # Thread Safety
//!
//! The lock is re-entrant and released before a factory runs, so a factory
//! may itself register or create types.

use crate::types::{
    is_convertible, Class, MetaTypeRegistry, Metatype, ObjectPtr, TypeDescriptor, TypeId,
};
use crate::value::AnyValue;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

type Factory = Arc<dyn Fn() -> AnyValue + Send + Sync>;

/// Process-wide factory registry.
pub struct FactoryRegistry {
    factories: ReentrantMutex<RefCell<HashMap<TypeId, Factory>>>,
}

fn new_instance<C: Class + Default>() -> AnyValue {
    ObjectPtr::new(C::default()).into_any()
}

impl FactoryRegistry {
    fn new() -> Self {
        Self {
            factories: ReentrantMutex::new(RefCell::new(HashMap::new())),
        }
    }

    /// Get the global factory registry.
    pub fn global() -> &'static FactoryRegistry {
        static REGISTRY: OnceLock<FactoryRegistry> = OnceLock::new();
        REGISTRY.get_or_init(FactoryRegistry::new)
    }

    /// Register (or replace) the factory for `id`.
    pub fn register<F>(&self, id: TypeId, factory: F)
    where
        F: Fn() -> AnyValue + Send + Sync + 'static,
    {
        let guard = self.factories.lock();
        guard.borrow_mut().insert(id, Arc::new(factory));
        log::debug!("[FactoryRegistry] Registered factory for type {}", id);
    }

    /// Register a typed factory for `T`, returning its id.
    pub fn register_for<T, F>(&self, factory: F) -> TypeId
    where
        T: Metatype,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let id = T::meta_type_id();
        self.register(id, move || factory().into_any());
        id
    }

    /// Opt class `C` into non-null default construction.
    ///
    /// Afterwards `create_by_type_id` yields a fresh `C::default()` for
    /// `ObjectPtr<C>` and every alias of it. Returns the pointer type id.
    pub fn register_class<C: Class + Default>(&self) -> TypeId {
        let id = ObjectPtr::<C>::meta_type_id();
        MetaTypeRegistry::global().set_instance_constructor(id, new_instance::<C>);
        self.register(id, new_instance::<C>);
        id
    }

    /// True if a factory was registered for `id`.
    pub fn contains(&self, id: TypeId) -> bool {
        let guard = self.factories.lock();
        let factories = guard.borrow();
        factories.contains_key(&id)
    }

    /// Create a value of type `id`.
    ///
    /// Uses the registered factory if any, generic default construction
    /// otherwise. Unknown ids give the null value.
    pub fn create_by_type_id(&self, id: TypeId) -> AnyValue {
        let factory = {
            let guard = self.factories.lock();
            let factories = guard.borrow();
            factories.get(&id).cloned()
        };
        match factory {
            Some(factory) => factory(),
            None => MetaTypeRegistry::global().default_value(id),
        }
    }

    /// Create a value from a registered type name or alias.
    pub fn create_by_name(&self, name: &str) -> AnyValue {
        match MetaTypeRegistry::global().id_from_name(name) {
            Some(id) => self.create_by_type_id(id),
            None => AnyValue::null(),
        }
    }

    /// Like [`create_by_type_id`](Self::create_by_type_id), except class
    /// pointer types always give a null pointer and factories are skipped.
    pub fn create_null_by_type_id(&self, id: TypeId) -> AnyValue {
        MetaTypeRegistry::global().null_value(id)
    }

    /// User type ids, optionally keeping only those convertible to
    /// `filter_to`.
    pub fn list_registered_types(&self, filter_to: Option<&TypeDescriptor>) -> Vec<TypeId> {
        let ids = MetaTypeRegistry::global().user_type_ids();
        match filter_to {
            None => ids,
            Some(to) => ids
                .into_iter()
                .filter(|id| is_convertible(&TypeDescriptor::from_id(*id), to))
                .collect(),
        }
    }

    /// All user type ids.
    pub fn user_types(&self) -> Vec<TypeId> {
        self.list_registered_types(None)
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.factories.lock();
        let factories = guard.borrow();
        f.debug_struct("FactoryRegistry")
            .field("factories", &factories.len())
            .finish()
    }
}
