// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Attribute tables and iteration.
//!
//! Same ordering, restart-index and callback rules as link iteration, over
//! the flat `attributes` listing of one object.

use std::cmp::Ordering;

use serde_json::Value;

use crate::dataspace::{decode_shape, ShapeDescriptor};
use crate::datatype::{self, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json;
use crate::link::{IndexType, IterOrder, IterParams};
use crate::object::RemoteObject;
use crate::path;
use crate::session::Session;

/// Longest accepted attribute name, in bytes.
pub const ATTRIBUTE_NAME_MAX_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq)]
pub struct AttrEntry {
    pub name: String,
    pub creation_time: f64,
    /// Decoded `type`, when the listing carries it.
    pub datatype: Option<TypeDescriptor>,
    /// Decoded `shape`, when the listing carries it.
    pub shape: Option<ShapeDescriptor>,
}

impl AttrEntry {
    /// Bytes of the attribute's value in native memory, when type and shape
    /// are both known and the size fits in a `u64`.
    pub fn data_size(&self) -> Option<u64> {
        let elem = self.datatype.as_ref()?.size().ok()?;
        (elem as u64).checked_mul(self.shape.as_ref()?.npoints()?)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttrTable {
    entries: Vec<AttrEntry>,
}

impl AttrTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AttrEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&AttrEntry> {
        self.entries.get(idx)
    }
}

pub type AttrComparator = fn(&AttrEntry, &AttrEntry) -> Ordering;

fn by_name(a: &AttrEntry, b: &AttrEntry) -> Ordering {
    a.name.as_bytes().cmp(b.name.as_bytes())
}

fn by_name_rev(a: &AttrEntry, b: &AttrEntry) -> Ordering {
    by_name(b, a)
}

fn by_creation(a: &AttrEntry, b: &AttrEntry) -> Ordering {
    a.creation_time.total_cmp(&b.creation_time)
}

fn by_creation_rev(a: &AttrEntry, b: &AttrEntry) -> Ordering {
    by_creation(b, a)
}

pub fn attr_comparator(index: IndexType, order: IterOrder) -> AttrComparator {
    match (index, order.is_decreasing()) {
        (IndexType::Name, false) => by_name,
        (IndexType::Name, true) => by_name_rev,
        (IndexType::CreationOrder, false) => by_creation,
        (IndexType::CreationOrder, true) => by_creation_rev,
    }
}

/// Build the table for an `{"attributes": [...]}` response.
pub fn build_attr_table(response: &Value, sort: Option<AttrComparator>) -> Result<AttrTable> {
    let attrs = json::require_array(response, &["attributes"])?;
    let mut entries = attrs.iter().map(parse_attr_entry).collect::<Result<Vec<_>>>()?;
    if let Some(cmp) = sort {
        entries.sort_by(cmp);
    }
    Ok(AttrTable { entries })
}

fn parse_attr_entry(attr: &Value) -> Result<AttrEntry> {
    let name = json::require_str(attr, &["name"])?;
    if name.len() > ATTRIBUTE_NAME_MAX_LENGTH {
        return Err(Error::malformed(format!(
            "attribute name of {} bytes exceeds {}",
            name.len(),
            ATTRIBUTE_NAME_MAX_LENGTH
        )));
    }
    let datatype = attr.get("type").map(datatype::decode).transpose()?;
    let shape = attr.get("shape").map(decode_shape).transpose()?;
    Ok(AttrEntry {
        name: name.to_string(),
        creation_time: json::require_f64(attr, &["created"])?,
        datatype,
        shape,
    })
}

/// Walk `table` in `params.order`, starting at `params.idx`.
///
/// Returns 0 when the walk completed or the positive value the callback
/// stopped with; a negative callback return is [`Error::CallbackError`].
/// The stopping index (or the end reached) is written back to `idx`.
pub fn traverse_attr_table<F>(table: &AttrTable, params: &mut IterParams<'_>, mut callback: F) -> Result<i32>
where
    F: FnMut(&str, &AttrEntry) -> i32,
{
    let len = table.len();
    let decreasing = params.order.is_decreasing();
    let start = params.idx.as_deref().copied();

    let positions: Vec<usize> = match (len, decreasing) {
        (0, _) => Vec::new(),
        (_, true) => {
            let first = start.unwrap_or(len - 1);
            if first >= len {
                return Err(Error::InvalidArgument(format!(
                    "start index {} out of range for {} attributes",
                    first, len
                )));
            }
            (0..=first).rev().collect()
        }
        (_, false) => {
            let first = start.unwrap_or(0);
            if first > len {
                return Err(Error::InvalidArgument(format!(
                    "start index {} out of range for {} attributes",
                    first, len
                )));
            }
            (first..len).collect()
        }
    };

    let mut ret = 0;
    let mut last = if decreasing || len == 0 { 0 } else { len };
    for i in positions {
        let entry = &table.entries[i];
        let code = callback(&entry.name, entry);
        if code < 0 {
            log::debug!("[attr] callback failed with {} on '{}'", code, entry.name);
            return Err(Error::CallbackError(code));
        }
        if code > 0 {
            ret = code;
            last = i;
            break;
        }
    }

    if let Some(idx) = params.idx.as_deref_mut() {
        *idx = last;
    }
    Ok(ret)
}

fn attributes_endpoint(object: &RemoteObject) -> String {
    format!("{}/attributes", object.endpoint())
}

/// Fetch and walk the attributes of `object`.
pub fn iterate_attributes<F>(
    session: &mut Session,
    object: &RemoteObject,
    params: &mut IterParams<'_>,
    callback: F,
) -> Result<i32>
where
    F: FnMut(&str, &AttrEntry) -> i32,
{
    let response = session.get(&attributes_endpoint(object))?;
    let sort = attr_comparator(params.index_type, IterOrder::Increasing);
    let table = build_attr_table(&response, Some(sort))?;
    log::debug!("[attr] iterating {} attributes of {}", table.len(), object.uri);
    traverse_attr_table(&table, params, callback)
}

/// Whether `object` has an attribute called `name`.
pub fn attribute_exists(session: &mut Session, object: &RemoteObject, name: &str) -> Result<bool> {
    if name.is_empty() || name.len() > ATTRIBUTE_NAME_MAX_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "attribute name must be 1..={} bytes, got {}",
            ATTRIBUTE_NAME_MAX_LENGTH,
            name.len()
        )));
    }
    let endpoint = format!(
        "{}/{}",
        attributes_endpoint(object),
        path::escape_component(name)
    );
    Ok(session.get_optional(&endpoint)?.is_some())
}
