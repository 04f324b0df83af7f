// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object references in their binary transfer form.
//!
//! Each reference occupies one fixed slot of [`REF_SLOT_SIZE`] bytes holding
//! `"<collection>/<id>"` in ASCII, NUL-padded. An all-zero slot is a null
//! reference.

use crate::datatype::ReferenceKind;
use crate::error::{Error, Result};
use crate::object::ObjectKind;

/// Width of one reference slot on the wire.
pub const REF_SLOT_SIZE: usize = 48;

/// A reference to a remote object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjRef {
    pub kind: ReferenceKind,
    /// Referenced object's id; empty for a null reference.
    pub uri: String,
    pub target: ObjectKind,
}

impl ObjRef {
    pub fn object(uri: impl Into<String>, target: ObjectKind) -> Self {
        ObjRef {
            kind: ReferenceKind::Object,
            uri: uri.into(),
            target,
        }
    }

    pub fn is_null(&self) -> bool {
        self.uri.is_empty()
    }
}

/// Pack references into `refs.len() * REF_SLOT_SIZE` bytes.
pub fn encode_refs(refs: &[ObjRef]) -> Result<Vec<u8>> {
    let mut out = vec![0u8; refs.len() * REF_SLOT_SIZE];
    for (slot, r) in out.chunks_exact_mut(REF_SLOT_SIZE).zip(refs) {
        if r.is_null() {
            continue;
        }
        let text = format!("{}/{}", r.target.collection(), r.uri);
        // one byte stays NUL
        if text.len() >= REF_SLOT_SIZE {
            return Err(Error::malformed(format!(
                "reference '{}' does not fit a {}-byte slot",
                text, REF_SLOT_SIZE
            )));
        }
        slot[..text.len()].copy_from_slice(text.as_bytes());
    }
    log::trace!("[reference] packed {} references", refs.len());
    Ok(out)
}

/// Unpack `count` slots from `bytes`.
pub fn decode_refs(bytes: &[u8], count: usize) -> Result<Vec<ObjRef>> {
    let needed = count
        .checked_mul(REF_SLOT_SIZE)
        .ok_or_else(|| Error::malformed("reference count overflows"))?;
    if bytes.len() < needed {
        return Err(Error::malformed(format!(
            "reference buffer holds {} bytes, {} references need {}",
            bytes.len(),
            count,
            needed
        )));
    }

    bytes[..needed]
        .chunks_exact(REF_SLOT_SIZE)
        .map(decode_slot)
        .collect()
}

fn decode_slot(slot: &[u8]) -> Result<ObjRef> {
    let end = slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
    let text = std::str::from_utf8(&slot[..end])
        .map_err(|_| Error::malformed("reference slot is not valid UTF-8"))?;

    let Some((_, uri)) = text.split_once('/') else {
        return Ok(ObjRef::object("", ObjectKind::Group));
    };
    let target = ObjectKind::from_id(uri)
        .ok_or_else(|| Error::malformed(format!("reference '{}' has an unknown id prefix", text)))?;
    Ok(ObjRef::object(uri, target))
}
