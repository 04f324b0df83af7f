// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Datatype codec over randomly generated (seeded) type trees, plus the
// fixed compound example from the wire documentation.

use h5rest::datatype::{self, ByteOrder, CharSet, ReferenceKind, TypeDescriptor};
use serde_json::json;

const SEED: u64 = 0x4835_5245_5354;

fn order(rng: &mut fastrand::Rng) -> ByteOrder {
    if rng.bool() {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    }
}

fn integer(rng: &mut fastrand::Rng) -> TypeDescriptor {
    let width = [8u8, 16, 32, 64][rng.usize(..4)];
    TypeDescriptor::integer(width, rng.bool(), order(rng))
}

fn random_type(rng: &mut fastrand::Rng, depth: u32) -> TypeDescriptor {
    let leaf_only = depth >= 3;
    match rng.u8(..if leaf_only { 5 } else { 8 }) {
        0 => integer(rng),
        1 => TypeDescriptor::float(if rng.bool() { 32 } else { 64 }, order(rng)),
        2 => TypeDescriptor::fixed_string(rng.usize(1..64), CharSet::Ascii),
        3 => TypeDescriptor::variable_string(if rng.bool() { CharSet::Ascii } else { CharSet::Utf8 }),
        4 => TypeDescriptor::Reference(ReferenceKind::Object),
        5 => {
            let n = rng.usize(1..5);
            let fields: Vec<_> = (0..n)
                .map(|i| (format!("f{}", i), random_type(rng, depth + 1)))
                .collect();
            TypeDescriptor::compound(fields).unwrap()
        }
        6 => {
            let n = rng.usize(1..6);
            let mapping: Vec<_> = (0..n).map(|i| (format!("V{}", i), i as i64 - 2)).collect();
            TypeDescriptor::enumeration(integer(rng), mapping).unwrap()
        }
        _ => {
            let rank = rng.usize(1..4);
            let dims = (0..rank).map(|_| rng.u64(1..5)).collect();
            TypeDescriptor::array(random_type(rng, depth + 1), dims).unwrap()
        }
    }
}

#[test]
fn test_random_types_survive_the_wire() {
    let mut rng = fastrand::Rng::with_seed(SEED);
    for _ in 0..200 {
        let ty = random_type(&mut rng, 0);
        let wire = datatype::encode(&ty).unwrap();
        let text = serde_json::to_string(&wire).unwrap();
        let back = datatype::decode_str(&text).unwrap();
        assert_eq!(back, ty, "wire form: {}", text);
        assert_eq!(back.size().unwrap(), ty.size().unwrap());
    }
}

#[test]
fn test_compound_example() {
    let ty = TypeDescriptor::compound([
        ("a", TypeDescriptor::i32_le()),
        ("b", TypeDescriptor::float(64, ByteOrder::BigEndian)),
    ])
    .unwrap();

    let wire = datatype::encode(&ty).unwrap();
    assert_eq!(wire["class"], "H5T_COMPOUND");
    assert_eq!(wire["fields"].as_array().unwrap().len(), 2);
    assert_eq!(wire["fields"][0]["name"], "a");

    let decoded = datatype::decode(&json!({"type": wire})).unwrap();
    let TypeDescriptor::Compound(compound) = decoded else {
        panic!("expected a compound");
    };
    assert_eq!(compound.member("a").unwrap().offset, 0);
    assert_eq!(compound.member("b").unwrap().offset, 4);
    assert_eq!(compound.size(), 12);
}

#[test]
fn test_host_only_classes_are_rejected() {
    let opaque = TypeDescriptor::Opaque {
        size: 4,
        tag: "blob".into(),
    };
    assert!(matches!(
        datatype::encode(&opaque),
        Err(h5rest::Error::UnsupportedType(_))
    ));
    assert!(datatype::decode(&json!({"class": "H5T_TIME"})).is_err());
}
