// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Remote object kinds and the info records parsed from object responses.

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::json;

/// Kind of object a remote id designates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Group,
    Dataset,
    NamedType,
}

impl ObjectKind {
    /// Server URL namespace for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            ObjectKind::Group => "groups",
            ObjectKind::Dataset => "datasets",
            ObjectKind::NamedType => "datatypes",
        }
    }

    pub fn from_collection(name: &str) -> Option<Self> {
        match name {
            "groups" => Some(ObjectKind::Group),
            "datasets" => Some(ObjectKind::Dataset),
            "datatypes" => Some(ObjectKind::NamedType),
            _ => None,
        }
    }

    /// Kind encoded in the first character of a server-assigned id.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.as_bytes().first() {
            Some(b'g') => Some(ObjectKind::Group),
            Some(b'd') => Some(ObjectKind::Dataset),
            Some(b't') => Some(ObjectKind::NamedType),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Group => "group",
            ObjectKind::Dataset => "dataset",
            ObjectKind::NamedType => "datatype",
        };
        f.write_str(name)
    }
}

/// Handle on a remote object: its id and what it is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteObject {
    pub uri: String,
    pub kind: ObjectKind,
}

impl RemoteObject {
    pub fn new(uri: impl Into<String>, kind: ObjectKind) -> Self {
        RemoteObject {
            uri: uri.into(),
            kind,
        }
    }

    pub fn group(uri: impl Into<String>) -> Self {
        RemoteObject::new(uri, ObjectKind::Group)
    }

    /// `/<collection>/<uri>`
    pub fn endpoint(&self) -> String {
        format!("/{}/{}", self.kind.collection(), self.uri)
    }
}

/// Summary of one object, as returned by its GET response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub kind: ObjectKind,
    pub uri: String,
    /// Hash of the object's home domain; equal for objects in one domain.
    pub fileno: u64,
    pub num_attrs: u64,
}

/// Summary of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupInfo {
    pub num_links: u64,
}

/// djb2 string hash.
pub fn hash_str(s: &str) -> u32 {
    s.bytes()
        .fold(5381u32, |h, b| h.wrapping_shl(5).wrapping_add(h).wrapping_add(b as u32))
}

/// Parse `hrefs`, `id` and `attributeCount` out of an object response.
pub fn parse_object_info(response: &Value) -> Result<ObjectInfo> {
    let hrefs = json::require_array(response, &["hrefs"])?;
    let home = hrefs
        .iter()
        .find(|h| h.get("rel").and_then(Value::as_str) == Some("home"))
        .and_then(|h| h.get("href"))
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed("object response has no 'home' href"))?;

    let uri = json::require_str(response, &["id"])?;
    let kind = ObjectKind::from_id(uri)
        .ok_or_else(|| Error::malformed(format!("object id '{}' has no known kind prefix", uri)))?;
    let num_attrs = json::require_u64(response, &["attributeCount"])?;

    Ok(ObjectInfo {
        kind,
        uri: uri.to_string(),
        fileno: hash_str(home) as u64,
        num_attrs,
    })
}

pub fn parse_group_info(response: &Value) -> Result<GroupInfo> {
    Ok(GroupInfo {
        num_links: json::require_u64(response, &["linkCount"])?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_id_and_collection() {
        assert_eq!(ObjectKind::from_id("g-1234"), Some(ObjectKind::Group));
        assert_eq!(ObjectKind::from_id("d-1"), Some(ObjectKind::Dataset));
        assert_eq!(ObjectKind::from_id("t-1"), Some(ObjectKind::NamedType));
        assert_eq!(ObjectKind::from_id("x-1"), None);
        assert_eq!(ObjectKind::from_id(""), None);
        assert_eq!(
            ObjectKind::from_collection(ObjectKind::NamedType.collection()),
            Some(ObjectKind::NamedType)
        );
        assert_eq!(RemoteObject::group("g-1").endpoint(), "/groups/g-1");
    }

    #[test]
    fn test_djb2() {
        assert_eq!(hash_str(""), 5381);
        assert_eq!(hash_str("a"), 5381 * 33 + 97);
    }

    #[test]
    fn test_parse_object_info() {
        let resp = json!({
            "id": "d-42",
            "attributeCount": 3,
            "hrefs": [
                {"rel": "self", "href": "http://hsds/datasets/d-42"},
                {"rel": "home", "href": "http://hsds/?domain=/home/test/a.h5"}
            ]
        });
        let info = parse_object_info(&resp).unwrap();
        assert_eq!(info.kind, ObjectKind::Dataset);
        assert_eq!(info.num_attrs, 3);
        assert_eq!(info.fileno, hash_str("http://hsds/?domain=/home/test/a.h5") as u64);

        let missing_home = json!({"id": "g-1", "attributeCount": 0, "hrefs": []});
        assert!(parse_object_info(&missing_home).is_err());
    }

    #[test]
    fn test_parse_group_info() {
        assert_eq!(parse_group_info(&json!({"linkCount": 7})).unwrap().num_links, 7);
        assert!(parse_group_info(&json!({"linkCount": -1})).is_err());
    }
}
