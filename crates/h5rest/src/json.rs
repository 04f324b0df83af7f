// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Key-path lookups over parsed JSON responses.
//!
//! Each helper takes a key path (`&["link", "class"]`) and reports a
//! `MalformedWireData` error naming the path when the key is missing or has
//! the wrong JSON kind.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Walk `keys` from `root`.
pub fn get<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(root, |node, key| node.get(*key))
}

/// First key path in `paths` that resolves.
pub fn get_any<'a>(root: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|keys| get(root, keys))
}

fn describe(keys: &[&str]) -> String {
    keys.join(".")
}

pub fn require<'a>(root: &'a Value, keys: &[&str]) -> Result<&'a Value> {
    get(root, keys).ok_or_else(|| Error::malformed(format!("missing key '{}'", describe(keys))))
}

pub fn require_str<'a>(root: &'a Value, keys: &[&str]) -> Result<&'a str> {
    require(root, keys)?
        .as_str()
        .ok_or_else(|| Error::malformed(format!("'{}' is not a string", describe(keys))))
}

pub fn require_u64(root: &Value, keys: &[&str]) -> Result<u64> {
    require(root, keys)?
        .as_u64()
        .ok_or_else(|| Error::malformed(format!("'{}' is not a non-negative integer", describe(keys))))
}

pub fn require_f64(root: &Value, keys: &[&str]) -> Result<f64> {
    require(root, keys)?
        .as_f64()
        .ok_or_else(|| Error::malformed(format!("'{}' is not a number", describe(keys))))
}

pub fn require_array<'a>(root: &'a Value, keys: &[&str]) -> Result<&'a Vec<Value>> {
    require(root, keys)?
        .as_array()
        .ok_or_else(|| Error::malformed(format!("'{}' is not an array", describe(keys))))
}

pub fn require_object<'a>(root: &'a Value, keys: &[&str]) -> Result<&'a Map<String, Value>> {
    require(root, keys)?
        .as_object()
        .ok_or_else(|| Error::malformed(format!("'{}' is not an object", describe(keys))))
}

/// Array of non-negative integers.
pub fn u64_array(value: &Value, what: &str) -> Result<Vec<u64>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::malformed(format!("'{}' is not an array", what)))?;
    items
        .iter()
        .map(|v| {
            v.as_u64()
                .ok_or_else(|| Error::malformed(format!("'{}' holds a non-integer entry", what)))
        })
        .collect()
}

/// String value found under the first matching key path.
pub fn any_str<'a>(root: &'a Value, paths: &[&[&str]], what: &str) -> Result<&'a str> {
    get_any(root, paths)
        .ok_or_else(|| Error::malformed(format!("missing {}", what)))?
        .as_str()
        .ok_or_else(|| Error::malformed(format!("{} is not a string", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let v = json!({"link": {"class": "H5L_TYPE_HARD", "id": "g-1"}});
        assert_eq!(require_str(&v, &["link", "class"]).unwrap(), "H5L_TYPE_HARD");
        assert!(get(&v, &["link", "title"]).is_none());
    }

    #[test]
    fn test_any_prefers_first_path() {
        let v = json!({"link": {"class": "H5L_TYPE_SOFT"}, "class": "H5L_TYPE_HARD"});
        let class = any_str(&v, &[&["link", "class"], &["class"]], "link class").unwrap();
        assert_eq!(class, "H5L_TYPE_SOFT");
    }

    #[test]
    fn test_wrong_kind_reports_path() {
        let v = json!({"shape": {"dims": "ten"}});
        let err = require_array(&v, &["shape", "dims"]).unwrap_err();
        assert!(err.to_string().contains("shape.dims"));
    }

    #[test]
    fn test_u64_array_rejects_negative() {
        assert!(u64_array(&json!([1, -2]), "dims").is_err());
        assert_eq!(u64_array(&json!([4, 5]), "dims").unwrap(), vec![4, 5]);
    }
}
