// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Predefined numeric type names.
//!
//! Names follow `H5T_<STD|IEEE>_<I|U|F><bits><LE|BE>`. Lookup goes through
//! an explicit table rather than character positions in the name.

use super::{ByteOrder, TypeDescriptor};

/// One predefined numeric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predefined {
    pub name: &'static str,
    pub kind: NumericKind,
    /// Width in bits.
    pub width: u8,
    pub order: ByteOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Signed,
    Unsigned,
    Float,
}

const fn entry(name: &'static str, kind: NumericKind, width: u8, order: ByteOrder) -> Predefined {
    Predefined {
        name,
        kind,
        width,
        order,
    }
}

use ByteOrder::{BigEndian as BE, LittleEndian as LE};
use NumericKind::{Float, Signed, Unsigned};

pub const PREDEFINED: &[Predefined] = &[
    entry("H5T_STD_I8LE", Signed, 8, LE),
    entry("H5T_STD_I8BE", Signed, 8, BE),
    entry("H5T_STD_I16LE", Signed, 16, LE),
    entry("H5T_STD_I16BE", Signed, 16, BE),
    entry("H5T_STD_I32LE", Signed, 32, LE),
    entry("H5T_STD_I32BE", Signed, 32, BE),
    entry("H5T_STD_I64LE", Signed, 64, LE),
    entry("H5T_STD_I64BE", Signed, 64, BE),
    entry("H5T_STD_U8LE", Unsigned, 8, LE),
    entry("H5T_STD_U8BE", Unsigned, 8, BE),
    entry("H5T_STD_U16LE", Unsigned, 16, LE),
    entry("H5T_STD_U16BE", Unsigned, 16, BE),
    entry("H5T_STD_U32LE", Unsigned, 32, LE),
    entry("H5T_STD_U32BE", Unsigned, 32, BE),
    entry("H5T_STD_U64LE", Unsigned, 64, LE),
    entry("H5T_STD_U64BE", Unsigned, 64, BE),
    entry("H5T_IEEE_F32LE", Float, 32, LE),
    entry("H5T_IEEE_F32BE", Float, 32, BE),
    entry("H5T_IEEE_F64LE", Float, 64, LE),
    entry("H5T_IEEE_F64BE", Float, 64, BE),
];

/// Table entry for a wire name.
pub fn lookup(name: &str) -> Option<&'static Predefined> {
    PREDEFINED.iter().find(|p| p.name == name)
}

/// Wire name for a numeric descriptor, `None` for anything without one.
pub fn name_of(ty: &TypeDescriptor) -> Option<&'static str> {
    let (kind, width, order) = match *ty {
        TypeDescriptor::Integer {
            width,
            signed,
            order,
        } => (if signed { Signed } else { Unsigned }, width, order),
        TypeDescriptor::Float { width, order } => (Float, width, order),
        _ => return None,
    };
    PREDEFINED
        .iter()
        .find(|p| p.kind == kind && p.width == width && p.order == order)
        .map(|p| p.name)
}

impl Predefined {
    pub fn descriptor(&self) -> TypeDescriptor {
        match self.kind {
            Signed | Unsigned => TypeDescriptor::Integer {
                width: self.width,
                signed: self.kind == Signed,
                order: self.order,
            },
            Float => TypeDescriptor::Float {
                width: self.width,
                order: self.order,
            },
        }
    }
}
