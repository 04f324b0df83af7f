// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Datatype descriptors and their JSON wire form.
//!
//! ```text
//!   TypeDescriptor ──encode──► {"class": "H5T_*", "base": ..., ...}
//!         ▲                                │
//!         └──────────────decode────────────┘
//! ```
//!
//! Compound, enum and array types recurse into their member/base types.
//! A committed (named) type short-circuits to its remote id string.

mod codec;
pub mod predefined;

pub use codec::{decode, decode_str, encode, encode_for_server, type_body};

use crate::error::{Error, Result};

/// Maximum rank of array types and simple shapes.
pub const MAX_RANK: usize = 32;

/// Size in bytes of a variable-length string element (a pointer).
pub const VARIABLE_STRING_SIZE: usize = 8;

/// Size in bytes of an object reference element.
pub const OBJECT_REF_SIZE: usize = 8;

/// Size in bytes of a dataset region reference element.
pub const REGION_REF_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharSet {
    Ascii,
    Utf8,
}

impl CharSet {
    pub fn wire_name(self) -> &'static str {
        match self {
            CharSet::Ascii => "H5T_CSET_ASCII",
            CharSet::Utf8 => "H5T_CSET_UTF8",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "H5T_CSET_ASCII" => Some(CharSet::Ascii),
            "H5T_CSET_UTF8" => Some(CharSet::Utf8),
            _ => None,
        }
    }
}

/// What a reference-typed element points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Object,
    Region,
}

impl ReferenceKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            ReferenceKind::Object => "H5T_STD_REF_OBJ",
            ReferenceKind::Region => "H5T_STD_REF_DSETREG",
        }
    }
}

/// One member of a compound type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundMember {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Byte offset inside the packed compound element.
    pub offset: usize,
}

/// Ordered, packed member list of a compound type.
///
/// Only constructible through [`CompoundType::packed`], so offsets are
/// always the running sum of the member sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundType {
    members: Vec<CompoundMember>,
    size: usize,
}

impl CompoundType {
    /// Lay out `fields` back to back.
    pub fn packed<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, TypeDescriptor)>,
        S: Into<String>,
    {
        let mut members = Vec::new();
        let mut offset = 0usize;
        for (name, ty) in fields {
            let name = name.into();
            if name.is_empty() {
                return Err(Error::InvalidArgument("compound member name is empty".into()));
            }
            if members.iter().any(|m: &CompoundMember| m.name == name) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate compound member '{}'",
                    name
                )));
            }
            let size = ty.size()?;
            members.push(CompoundMember { name, ty, offset });
            offset = offset
                .checked_add(size)
                .ok_or_else(|| Error::InvalidArgument("compound type too large".into()))?;
        }
        if members.is_empty() {
            return Err(Error::InvalidArgument("compound type has no members".into()));
        }
        Ok(CompoundType {
            members,
            size: offset,
        })
    }

    pub fn members(&self) -> &[CompoundMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&CompoundMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Native datatype descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Two's-complement or unsigned integer, `width` in bits.
    Integer {
        width: u8,
        signed: bool,
        order: ByteOrder,
    },
    /// IEEE float, `width` in bits.
    Float { width: u8, order: ByteOrder },
    FixedString { length: usize, charset: CharSet },
    VariableString { charset: CharSet },
    Compound(CompoundType),
    /// Enumeration over an integer base; mapping order is preserved.
    Enum {
        base: Box<TypeDescriptor>,
        mapping: Vec<(String, i64)>,
    },
    Array {
        base: Box<TypeDescriptor>,
        dims: Vec<u64>,
    },
    Reference(ReferenceKind),
    /// A committed datatype stored on the server, named by its id.
    NamedTypeRef(String),

    // Host classes without a wire form.
    Opaque { size: usize, tag: String },
    Bitfield { width: u8, order: ByteOrder },
    VarLen(Box<TypeDescriptor>),
    Time,
}

impl TypeDescriptor {
    pub fn integer(width: u8, signed: bool, order: ByteOrder) -> Self {
        TypeDescriptor::Integer {
            width,
            signed,
            order,
        }
    }

    pub fn float(width: u8, order: ByteOrder) -> Self {
        TypeDescriptor::Float { width, order }
    }

    pub fn i32_le() -> Self {
        Self::integer(32, true, ByteOrder::LittleEndian)
    }

    pub fn i64_le() -> Self {
        Self::integer(64, true, ByteOrder::LittleEndian)
    }

    pub fn u8_le() -> Self {
        Self::integer(8, false, ByteOrder::LittleEndian)
    }

    pub fn f32_le() -> Self {
        Self::float(32, ByteOrder::LittleEndian)
    }

    pub fn f64_le() -> Self {
        Self::float(64, ByteOrder::LittleEndian)
    }

    pub fn fixed_string(length: usize, charset: CharSet) -> Self {
        TypeDescriptor::FixedString { length, charset }
    }

    pub fn variable_string(charset: CharSet) -> Self {
        TypeDescriptor::VariableString { charset }
    }

    /// Packed compound type.
    pub fn compound<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, TypeDescriptor)>,
        S: Into<String>,
    {
        Ok(TypeDescriptor::Compound(CompoundType::packed(fields)?))
    }

    /// Enumeration over an integer base type.
    pub fn enumeration<I, S>(base: TypeDescriptor, mapping: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let ty = TypeDescriptor::Enum {
            base: Box::new(base),
            mapping: mapping.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        };
        ty.validate()?;
        Ok(ty)
    }

    /// Fixed-size array of `base`.
    pub fn array(base: TypeDescriptor, dims: Vec<u64>) -> Result<Self> {
        let ty = TypeDescriptor::Array {
            base: Box::new(base),
            dims,
        };
        ty.validate()?;
        Ok(ty)
    }

    /// Wire class name of the descriptor.
    pub fn class_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Integer { .. } => "H5T_INTEGER",
            TypeDescriptor::Float { .. } => "H5T_FLOAT",
            TypeDescriptor::FixedString { .. } | TypeDescriptor::VariableString { .. } => {
                "H5T_STRING"
            }
            TypeDescriptor::Compound(_) => "H5T_COMPOUND",
            TypeDescriptor::Enum { .. } => "H5T_ENUM",
            TypeDescriptor::Array { .. } => "H5T_ARRAY",
            TypeDescriptor::Reference(_) => "H5T_REFERENCE",
            TypeDescriptor::NamedTypeRef(_) => "H5T_COMMITTED",
            TypeDescriptor::Opaque { .. } => "H5T_OPAQUE",
            TypeDescriptor::Bitfield { .. } => "H5T_BITFIELD",
            TypeDescriptor::VarLen(_) => "H5T_VLEN",
            TypeDescriptor::Time => "H5T_TIME",
        }
    }

    /// Size in bytes of one element in native memory.
    pub fn size(&self) -> Result<usize> {
        match self {
            TypeDescriptor::Integer { width, .. }
            | TypeDescriptor::Float { width, .. }
            | TypeDescriptor::Bitfield { width, .. } => Ok(usize::from(*width) / 8),
            TypeDescriptor::FixedString { length, .. } => Ok(*length),
            TypeDescriptor::VariableString { .. } | TypeDescriptor::VarLen(_) => {
                Ok(VARIABLE_STRING_SIZE)
            }
            TypeDescriptor::Compound(c) => Ok(c.size()),
            TypeDescriptor::Enum { base, .. } => base.size(),
            TypeDescriptor::Array { base, dims } => {
                let elems = dims
                    .iter()
                    .try_fold(1u64, |acc, d| acc.checked_mul(*d))
                    .ok_or_else(|| Error::InvalidArgument("array type too large".into()))?;
                let elems = usize::try_from(elems)
                    .map_err(|_| Error::InvalidArgument("array type too large".into()))?;
                base.size()?
                    .checked_mul(elems)
                    .ok_or_else(|| Error::InvalidArgument("array type too large".into()))
            }
            TypeDescriptor::Reference(ReferenceKind::Object) => Ok(OBJECT_REF_SIZE),
            TypeDescriptor::Reference(ReferenceKind::Region) => Ok(REGION_REF_SIZE),
            TypeDescriptor::Opaque { size, .. } => Ok(*size),
            TypeDescriptor::Time => Ok(8),
            TypeDescriptor::NamedTypeRef(uri) => Err(Error::unsupported_type(format!(
                "size of committed type '{}' is not known locally",
                uri
            ))),
        }
    }

    /// Check structural invariants (recursively).
    pub fn validate(&self) -> Result<()> {
        match self {
            TypeDescriptor::Integer { width, .. } => match width {
                8 | 16 | 32 | 64 => Ok(()),
                _ => Err(Error::unsupported_type(format!("{}-bit integer", width))),
            },
            TypeDescriptor::Float { width, .. } => match width {
                32 | 64 => Ok(()),
                _ => Err(Error::unsupported_type(format!("{}-bit float", width))),
            },
            TypeDescriptor::FixedString { length, .. } => {
                if *length == 0 {
                    Err(Error::InvalidArgument("fixed-length string of length 0".into()))
                } else {
                    Ok(())
                }
            }
            TypeDescriptor::Compound(c) => c.members().iter().try_for_each(|m| m.ty.validate()),
            TypeDescriptor::Enum { base, mapping } => {
                if !matches!(**base, TypeDescriptor::Integer { .. }) {
                    return Err(Error::InvalidArgument(format!(
                        "enum base must be an integer type, got {}",
                        base.class_name()
                    )));
                }
                base.validate()?;
                for (i, (name, _)) in mapping.iter().enumerate() {
                    if mapping[..i].iter().any(|(other, _)| other == name) {
                        return Err(Error::InvalidArgument(format!(
                            "duplicate enum member '{}'",
                            name
                        )));
                    }
                }
                Ok(())
            }
            TypeDescriptor::Array { base, dims } => {
                if dims.is_empty() || dims.len() > MAX_RANK {
                    return Err(Error::InvalidArgument(format!(
                        "array rank {} outside 1..={}",
                        dims.len(),
                        MAX_RANK
                    )));
                }
                if dims.contains(&0) {
                    return Err(Error::InvalidArgument("array dimension of 0".into()));
                }
                base.validate()
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_offsets_are_packed() {
        let ty = TypeDescriptor::compound([
            ("a", TypeDescriptor::i32_le()),
            ("b", TypeDescriptor::float(64, ByteOrder::BigEndian)),
            ("c", TypeDescriptor::fixed_string(5, CharSet::Ascii)),
        ])
        .unwrap();
        let TypeDescriptor::Compound(c) = &ty else {
            panic!("expected compound");
        };
        let offsets: Vec<usize> = c.members().iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 4, 12]);
        assert_eq!(ty.size().unwrap(), 17);
    }

    #[test]
    fn test_compound_rejects_named_member_and_duplicates() {
        let err = TypeDescriptor::compound([("t", TypeDescriptor::NamedTypeRef("t-1".into()))]);
        assert!(matches!(err, Err(Error::UnsupportedType(_))));

        let err = TypeDescriptor::compound([
            ("x", TypeDescriptor::i32_le()),
            ("x", TypeDescriptor::f32_le()),
        ]);
        assert!(matches!(err, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_enum_requires_integer_base() {
        assert!(TypeDescriptor::enumeration(TypeDescriptor::f32_le(), [("A", 0)]).is_err());
        let e = TypeDescriptor::enumeration(TypeDescriptor::u8_le(), [("RED", 0), ("GREEN", 1)])
            .unwrap();
        assert_eq!(e.size().unwrap(), 1);
    }

    #[test]
    fn test_array_rank_bounds() {
        assert!(TypeDescriptor::array(TypeDescriptor::i32_le(), vec![]).is_err());
        assert!(TypeDescriptor::array(TypeDescriptor::i32_le(), vec![1; MAX_RANK + 1]).is_err());
        let a = TypeDescriptor::array(TypeDescriptor::i32_le(), vec![2, 3]).unwrap();
        assert_eq!(a.size().unwrap(), 24);
    }

    #[test]
    fn test_reference_sizes() {
        assert_eq!(
            TypeDescriptor::Reference(ReferenceKind::Object).size().unwrap(),
            OBJECT_REF_SIZE
        );
        assert_eq!(
            TypeDescriptor::Reference(ReferenceKind::Region).size().unwrap(),
            REGION_REF_SIZE
        );
    }
}
