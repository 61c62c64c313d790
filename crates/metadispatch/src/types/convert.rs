// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Builtin conversion table.
//!
//! - numeric <-> numeric (including `bool`), lossy `as` casts
//! - numeric -> `String` (always succeeds)
//! - `String` -> numeric (fails on parse error)
//! - `AnyHash` <-> `AnyMap`
//!
//! The table answers "is `from -> to` supported" by type pair only; an
//! individual conversion may still fail at runtime (e.g. parsing "abc").

use crate::types::registry::{AnyHash, AnyMap, TypeTable};

/// Register numeric -> numeric conversions for every pair in the list.
macro_rules! numeric_matrix {
    ($table:ident; $($from:ty),+) => {
        $( numeric_matrix!(@row $table; $from; i32, u32, i64, u64, f32, f64); )+
    };
    (@row $table:ident; $from:ty; $($to:ty),+) => {
        $(
            $table.insert_converter::<$from, $to, _>(|v: &$from| Some(*v as $to));
        )+
    };
}

/// Register numeric <-> bool and numeric <-> String conversions.
macro_rules! scalar_conversions {
    ($table:ident; $($ty:ty),+) => {
        $(
            $table.insert_converter::<$ty, bool, _>(|v: &$ty| Some(*v != (0 as $ty)));
            $table.insert_converter::<bool, $ty, _>(|v: &bool| Some(u8::from(*v) as $ty));
            $table.insert_converter::<$ty, String, _>(|v: &$ty| Some(v.to_string()));
            $table.insert_converter::<String, $ty, _>(|v: &String| v.trim().parse::<$ty>().ok());
        )+
    };
}

pub(crate) fn install_builtin_converters(table: &mut TypeTable) {
    numeric_matrix!(table; i32, u32, i64, u64, f32, f64);
    scalar_conversions!(table; i32, u32, i64, u64, f32, f64);

    table.insert_converter::<bool, String, _>(|v: &bool| Some(v.to_string()));
    table.insert_converter::<String, bool, _>(|v: &String| match v.trim() {
        "true" | "1" => Some(true),
        "false" | "0" | "" => Some(false),
        _ => None,
    });

    table.insert_converter::<AnyHash, AnyMap, _>(|v: &AnyHash| {
        Some(v.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    });
    table.insert_converter::<AnyMap, AnyHash, _>(|v: &AnyMap| {
        Some(v.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    });
}

#[cfg(test)]
mod tests {
    use crate::types::{AnyHash, AnyMap, MetaTypeRegistry, TypeId};
    use crate::AnyValue;

    #[test]
    fn test_numeric_pairs_supported() {
        let registry = MetaTypeRegistry::global();
        assert!(registry.can_convert(TypeId::I32, TypeId::F64));
        assert!(registry.can_convert(TypeId::F32, TypeId::U64));
        assert!(registry.can_convert(TypeId::BOOL, TypeId::I64));
        assert!(registry.can_convert(TypeId::U32, TypeId::STRING));
        assert!(registry.can_convert(TypeId::STRING, TypeId::F64));
        assert!(!registry.can_convert(TypeId::ANY_LIST, TypeId::STRING));
    }

    #[test]
    fn test_string_parse() {
        let registry = MetaTypeRegistry::global();
        let ok = registry.convert(&AnyValue::from(" 42 "), TypeId::I32);
        assert_eq!(ok.map(|v| v.value::<i32>()), Some(42));

        let bad = registry.convert(&AnyValue::from("forty-two"), TypeId::I32);
        assert!(bad.is_none());
    }

    #[test]
    fn test_hash_to_map() {
        let mut hash = AnyHash::new();
        hash.insert("gain".to_string(), AnyValue::new(2.5f64));
        let map = AnyValue::new(hash).value::<AnyMap>();
        assert_eq!(map.get("gain").map(|v| v.value::<f64>()), Some(2.5));
    }
}
