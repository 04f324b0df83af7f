// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Links: named edges from a group to another object.
//!
//! # Modules
//!
//! - `table` - builds ordered (optionally recursive) tables of a group's links
//! - `traverse` - walks a table with a user callback and a restartable index
//! - `ops` - iterate/visit, name-by-index, existence and value lookups
//!
//! Link JSON appears either bare (entries of a `links` listing) or wrapped
//! in a `link` object (single-link responses); every field is looked up in
//! both places.

pub mod ops;
pub mod table;
pub mod traverse;

pub use ops::{
    get_link_info, get_link_value, iterate_links, link_exists, link_name_by_index, visit_links,
};
pub use table::{build_link_table, IndexType, IterOrder, LinkEntry, LinkTable};
pub use traverse::{traverse_link_table, IterParams};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::json;
use crate::object::{ObjectKind, RemoteObject};

/// Longest accepted link name, in bytes.
pub const LINK_NAME_MAX_LENGTH: usize = 2048;

/// Version nibble of a packed external link value.
pub const EXT_LINK_VERSION: u8 = 0;
/// Flags nibble of a packed external link value.
pub const EXT_LINK_FLAGS_ALL: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Hard,
    Soft,
    External,
    UserDefined,
}

impl LinkKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            LinkKind::Hard => "H5L_TYPE_HARD",
            LinkKind::Soft => "H5L_TYPE_SOFT",
            LinkKind::External => "H5L_TYPE_EXTERNAL",
            LinkKind::UserDefined => "H5L_TYPE_UD",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "H5L_TYPE_HARD" => Some(LinkKind::Hard),
            "H5L_TYPE_SOFT" => Some(LinkKind::Soft),
            "H5L_TYPE_EXTERNAL" => Some(LinkKind::External),
            "H5L_TYPE_UD" => Some(LinkKind::UserDefined),
            _ => None,
        }
    }
}

/// Where a link leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Hard link to an object by id.
    Object(RemoteObject),
    /// Path inside the same domain.
    Soft { path: String },
    /// Path inside another domain.
    External { domain: String, path: String },
    UserDefined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    pub target: LinkTarget,
}

impl LinkInfo {
    pub fn kind(&self) -> LinkKind {
        match self.target {
            LinkTarget::Object(_) => LinkKind::Hard,
            LinkTarget::Soft { .. } => LinkKind::Soft,
            LinkTarget::External { .. } => LinkKind::External,
            LinkTarget::UserDefined => LinkKind::UserDefined,
        }
    }

    /// Hard-link target, if any.
    pub fn object(&self) -> Option<&RemoteObject> {
        match &self.target {
            LinkTarget::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// True for a hard link to a group.
    pub fn is_group_link(&self) -> bool {
        matches!(self.object(), Some(obj) if obj.kind == ObjectKind::Group)
    }

    /// Byte length of the link value; 0 for hard and user-defined links.
    ///
    /// Soft: path plus NUL. External: flags byte, domain plus NUL, path plus
    /// NUL.
    pub fn value_size(&self) -> usize {
        match &self.target {
            LinkTarget::Soft { path } => path.len() + 1,
            LinkTarget::External { domain, path } => 1 + (domain.len() + 1) + (path.len() + 1),
            LinkTarget::Object(_) | LinkTarget::UserDefined => 0,
        }
    }

    /// Link value as the host library expects it.
    pub fn value_bytes(&self) -> Option<Vec<u8>> {
        match &self.target {
            LinkTarget::Soft { path } => {
                let mut out = Vec::with_capacity(path.len() + 1);
                out.extend_from_slice(path.as_bytes());
                out.push(0);
                Some(out)
            }
            LinkTarget::External { domain, path } => Some(external_link_value(domain, path)),
            LinkTarget::Object(_) | LinkTarget::UserDefined => None,
        }
    }
}

fn link_field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    json::get_any(value, &[&["link", key], &[key]])
}

fn link_str<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    link_field(value, key)
        .ok_or_else(|| Error::malformed(format!("link has no '{}'", key)))?
        .as_str()
        .ok_or_else(|| Error::malformed(format!("link '{}' is not a string", key)))
}

/// Decode one link object (bare or wrapped in `link`).
pub fn parse_link_info(value: &Value) -> Result<LinkInfo> {
    let class = link_str(value, "class")?;
    let kind = LinkKind::from_wire(class)
        .ok_or_else(|| Error::malformed(format!("invalid link class '{}'", class)))?;

    let target = match kind {
        LinkKind::Hard => {
            let collection = link_str(value, "collection")?;
            let obj_kind = ObjectKind::from_collection(collection).ok_or_else(|| {
                Error::malformed(format!("invalid link collection '{}'", collection))
            })?;
            LinkTarget::Object(RemoteObject::new(link_str(value, "id")?, obj_kind))
        }
        LinkKind::Soft => LinkTarget::Soft {
            path: link_str(value, "h5path")?.to_string(),
        },
        LinkKind::External => LinkTarget::External {
            domain: link_str(value, "h5domain")?.to_string(),
            path: link_str(value, "h5path")?.to_string(),
        },
        LinkKind::UserDefined => LinkTarget::UserDefined,
    };
    Ok(LinkInfo { target })
}

/// Kind of object a hard link points at, from its `collection`.
pub fn parse_link_object_kind(value: &Value) -> Result<ObjectKind> {
    let collection = link_str(value, "collection")?;
    ObjectKind::from_collection(collection)
        .ok_or_else(|| Error::malformed(format!("invalid link collection '{}'", collection)))
}

/// Pack an external link value: `(version << 4) | flags`, then the
/// NUL-terminated domain and path.
pub fn external_link_value(domain: &str, path: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + domain.len() + 1 + path.len() + 1);
    out.push((EXT_LINK_VERSION << 4) | EXT_LINK_FLAGS_ALL);
    out.extend_from_slice(domain.as_bytes());
    out.push(0);
    out.extend_from_slice(path.as_bytes());
    out.push(0);
    out
}

/// Reverse of [`external_link_value`]: `(flags, domain, path)`.
pub fn unpack_external_link_value(bytes: &[u8]) -> Result<(u8, String, String)> {
    let (&head, rest) = bytes
        .split_first()
        .ok_or_else(|| Error::malformed("empty external link value"))?;
    if head >> 4 != EXT_LINK_VERSION {
        return Err(Error::malformed(format!(
            "unknown external link version {}",
            head >> 4
        )));
    }

    let mut parts = rest.splitn(3, |b| *b == 0);
    let mut next = |what: &str| -> Result<String> {
        let part = parts
            .next()
            .ok_or_else(|| Error::malformed(format!("external link value has no {}", what)))?;
        String::from_utf8(part.to_vec())
            .map_err(|_| Error::malformed(format!("external link {} is not UTF-8", what)))
    };
    let domain = next("domain")?;
    let path = next("path")?;
    if !rest.ends_with(&[0]) || rest.iter().filter(|b| **b == 0).count() < 2 {
        return Err(Error::malformed("external link value is not NUL-terminated"));
    }
    Ok((head & 0x0f, domain, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hard_link_wrapped_and_bare() {
        let wrapped = json!({
            "link": {"class": "H5L_TYPE_HARD", "collection": "datasets", "id": "d-7", "title": "dset"},
            "hrefs": []
        });
        let info = parse_link_info(&wrapped).unwrap();
        assert_eq!(info.kind(), LinkKind::Hard);
        assert_eq!(info.object(), Some(&RemoteObject::new("d-7", ObjectKind::Dataset)));
        assert_eq!(info.value_size(), 0);

        let bare = json!({"class": "H5L_TYPE_HARD", "collection": "groups", "id": "g-1"});
        assert!(parse_link_info(&bare).unwrap().is_group_link());
    }

    #[test]
    fn test_soft_and_external_values() {
        let soft = parse_link_info(&json!({"class": "H5L_TYPE_SOFT", "h5path": "/a/b"})).unwrap();
        assert_eq!(soft.value_size(), 5);
        assert_eq!(soft.value_bytes().unwrap(), b"/a/b\0".to_vec());

        let ext = parse_link_info(&json!({
            "link": {"class": "H5L_TYPE_EXTERNAL", "h5domain": "/home/x.h5", "h5path": "/g"}
        }))
        .unwrap();
        assert_eq!(ext.value_size(), 1 + 11 + 3);
        let bytes = ext.value_bytes().unwrap();
        assert_eq!(bytes.len(), ext.value_size());
        assert_eq!(bytes[0], 0);
        let (flags, domain, path) = unpack_external_link_value(&bytes).unwrap();
        assert_eq!((flags, domain.as_str(), path.as_str()), (0, "/home/x.h5", "/g"));
    }

    #[test]
    fn test_bad_links() {
        assert!(parse_link_info(&json!({"class": "H5L_TYPE_WEIRD"})).is_err());
        assert!(parse_link_info(&json!({"class": "H5L_TYPE_HARD", "collection": "files", "id": "x"})).is_err());
        assert!(parse_link_info(&json!({"class": "H5L_TYPE_SOFT"})).is_err());
        assert!(unpack_external_link_value(&[0x10, b'a', 0, b'b', 0]).is_err());
        assert!(unpack_external_link_value(&[0x00, b'a', 0, b'b']).is_err());
        assert!(unpack_external_link_value(&[]).is_err());
    }
}
