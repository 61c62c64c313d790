// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registration errors.
//!
//! Lookups and dispatch never fail (a miss is an empty list or a null
//! [`AnyValue`](crate::AnyValue)); only registering a type name can be refused.

use crate::types::TypeId;
use std::fmt;

/// Errors for type registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Alias names cannot be empty.
    EmptyName,
    /// The name is already bound to another type.
    NameConflict {
        /// The rejected name.
        name: String,
        /// Id currently bound to `name`.
        existing: TypeId,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Type name cannot be empty"),
            Self::NameConflict { name, existing } => {
                write!(f, "Type name '{}' already bound to id {}", name, existing)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::NameConflict {
            name: "Point".to_string(),
            existing: TypeId::new(1030),
        };
        assert_eq!(err.to_string(), "Type name 'Point' already bound to id 1030");
        assert_eq!(
            RegistryError::EmptyName.to_string(),
            "Type name cannot be empty"
        );
    }
}
