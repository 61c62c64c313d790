// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Engine constants - single source of truth.
//!
//! Every reserved type id and every numeric limit of the engine lives here.
//! **NEVER hardcode these values elsewhere!**
//!
//! # Id space
//!
//! ```text
//! 0                      wildcard ("accepts any type")
//! 1 .. USER_TYPE_BASE    builtin types (fixed ids, registered at startup)
//! USER_TYPE_BASE ..      user types (allocated densely, on first use)
//! ```

// =======================================================================
// Reserved ids
// =======================================================================

/// Wildcard id: a parameter recorded with this id accepts any argument.
pub const WILDCARD_TYPE_ID: u32 = 0;

/// `()` - return type of callables that produce nothing.
pub const VOID_TYPE_ID: u32 = 1;
/// `bool`
pub const BOOL_TYPE_ID: u32 = 2;
/// `i32`
pub const I32_TYPE_ID: u32 = 3;
/// `u32`
pub const U32_TYPE_ID: u32 = 4;
/// `i64`
pub const I64_TYPE_ID: u32 = 5;
/// `u64`
pub const U64_TYPE_ID: u32 = 6;
/// `f32`
pub const F32_TYPE_ID: u32 = 7;
/// `f64`
pub const F64_TYPE_ID: u32 = 8;
/// `String`
pub const STRING_TYPE_ID: u32 = 9;
/// `Vec<AnyValue>`
pub const ANY_LIST_TYPE_ID: u32 = 10;
/// `BTreeMap<String, AnyValue>` - the generic string-keyed map of values.
pub const ANY_MAP_TYPE_ID: u32 = 11;
/// `HashMap<String, AnyValue>`
pub const ANY_HASH_TYPE_ID: u32 = 12;

/// First id handed out to user types.
///
/// Ids below this value are reserved for builtins; ids at or above it are
/// allocated in registration order without gaps.
pub const USER_TYPE_BASE: u32 = 1024;

// =======================================================================
// Dispatch limits
// =======================================================================

/// Maximum number of parameters of a [`Function`](crate::Function).
pub const MAX_ARITY: usize = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_below_user_base() {
        for id in [
            VOID_TYPE_ID,
            BOOL_TYPE_ID,
            I32_TYPE_ID,
            U32_TYPE_ID,
            I64_TYPE_ID,
            U64_TYPE_ID,
            F32_TYPE_ID,
            F64_TYPE_ID,
            STRING_TYPE_ID,
            ANY_LIST_TYPE_ID,
            ANY_MAP_TYPE_ID,
            ANY_HASH_TYPE_ID,
        ] {
            assert_ne!(id, WILDCARD_TYPE_ID);
            assert!(id < USER_TYPE_BASE);
        }
    }
}
