// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Link table traversal with a user callback.
//!
//! Callback contract: a negative return aborts with
//! [`Error::CallbackError`], a positive return stops the walk and is handed
//! back to the caller, zero continues.

use super::table::{IndexType, IterOrder, LinkEntry, LinkTable};
use crate::error::{Error, Result};
use crate::path;

/// Traversal parameters.
#[derive(Debug, Default)]
pub struct IterParams<'a> {
    pub index_type: IndexType,
    pub order: IterOrder,
    /// Start position at the top level; receives where the walk ended.
    pub idx: Option<&'a mut usize>,
    /// Descend into subgroup tables.
    pub recursive: bool,
}

impl<'a> IterParams<'a> {
    pub fn new(index_type: IndexType, order: IterOrder) -> Self {
        IterParams {
            index_type,
            order,
            idx: None,
            recursive: false,
        }
    }

    pub fn with_idx(mut self, idx: &'a mut usize) -> Self {
        self.idx = Some(idx);
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

/// Walk `table`, calling `callback(relative_path, entry)` for each link.
///
/// Increasing and native walks ascend from `idx` (default 0), decreasing
/// walks descend from `idx` (default `len - 1`). Subgroup tables are walked
/// in full, right after their link, with paths prefixed by the link name.
///
/// On success the top-level position is written back to `idx`: the index
/// of the entry that stopped the walk, or the end reached (`len` ascending,
/// `0` descending).
pub fn traverse_link_table<F>(
    table: &LinkTable,
    params: &mut IterParams<'_>,
    mut callback: F,
) -> Result<i32>
where
    F: FnMut(&str, &LinkEntry) -> i32,
{
    if table.is_empty() {
        if let Some(idx) = params.idx.as_deref_mut() {
            *idx = 0;
        }
        return Ok(0);
    }

    let start = params.idx.as_deref().copied();
    let (ret, last) = walk(
        table,
        params.order,
        params.recursive,
        start,
        None,
        0,
        &mut callback,
    )?;

    if let Some(idx) = params.idx.as_deref_mut() {
        *idx = last;
    }
    Ok(ret)
}

fn walk<F>(
    table: &LinkTable,
    order: IterOrder,
    recursive: bool,
    start: Option<usize>,
    prefix: Option<&str>,
    depth: usize,
    callback: &mut F,
) -> Result<(i32, usize)>
where
    F: FnMut(&str, &LinkEntry) -> i32,
{
    let len = table.len();
    if len == 0 {
        return Ok((0, 0));
    }

    let positions: Box<dyn Iterator<Item = usize>> = if order.is_decreasing() {
        let first = start.unwrap_or(len - 1);
        if first >= len {
            return Err(Error::InvalidArgument(format!(
                "start index {} out of range for {} links",
                first, len
            )));
        }
        Box::new((0..=first).rev())
    } else {
        let first = start.unwrap_or(0);
        if first > len {
            return Err(Error::InvalidArgument(format!(
                "start index {} out of range for {} links",
                first, len
            )));
        }
        Box::new(first..len)
    };

    for i in positions {
        let Some(entry) = table.get(i) else { break };
        let rel_path = path::join(prefix, &entry.name);

        let ret = callback(&rel_path, entry);
        if ret < 0 {
            log::debug!("[link] callback failed with {} on '{}'", ret, rel_path);
            return Err(Error::CallbackError(ret));
        }
        if ret > 0 {
            return Ok((ret, i));
        }

        if let (true, Some(sub)) = (recursive, entry.subgroup.as_ref()) {
            log::trace!("[link] descending into '{}' (depth {})", rel_path, depth + 1);
            let (sub_ret, _) = walk(sub, order, recursive, None, Some(&rel_path), depth + 1, callback)?;
            if sub_ret > 0 {
                return Ok((sub_ret, i));
            }
        }
    }

    let end = if order.is_decreasing() { 0 } else { len };
    Ok((0, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{LinkInfo, LinkTarget};
    use crate::object::RemoteObject;

    fn leaf(name: &str) -> LinkEntry {
        LinkEntry {
            name: name.to_string(),
            creation_time: 0.0,
            info: LinkInfo {
                target: LinkTarget::Soft {
                    path: format!("/{}", name),
                },
            },
            subgroup: None,
        }
    }

    fn group(name: &str, children: Vec<LinkEntry>) -> LinkEntry {
        LinkEntry {
            name: name.to_string(),
            creation_time: 0.0,
            info: LinkInfo {
                target: LinkTarget::Object(RemoteObject::group(format!("g-{}", name))),
            },
            subgroup: Some(LinkTable::new(children)),
        }
    }

    fn collect(table: &LinkTable, params: &mut IterParams<'_>) -> (i32, Vec<String>) {
        let mut seen = Vec::new();
        let ret = traverse_link_table(table, params, |path, _| {
            seen.push(path.to_string());
            0
        })
        .unwrap();
        (ret, seen)
    }

    #[test]
    fn test_orders() {
        let table = LinkTable::new(vec![leaf("a"), leaf("b"), leaf("c")]);

        let (_, inc) = collect(&table, &mut IterParams::new(IndexType::Name, IterOrder::Increasing));
        assert_eq!(inc, ["a", "b", "c"]);
        let (_, native) = collect(&table, &mut IterParams::new(IndexType::Name, IterOrder::Native));
        assert_eq!(native, inc);
        let (_, dec) = collect(&table, &mut IterParams::new(IndexType::Name, IterOrder::Decreasing));
        assert_eq!(dec, ["c", "b", "a"]);
    }

    #[test]
    fn test_stop_and_restart() {
        let table = LinkTable::new(vec![leaf("a"), leaf("b"), leaf("c"), leaf("d")]);
        let mut idx = 0usize;

        let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).with_idx(&mut idx);
        let ret = traverse_link_table(&table, &mut params, |path, _| if path == "c" { 7 } else { 0 })
            .unwrap();
        assert_eq!(ret, 7);
        assert_eq!(idx, 2);

        let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).with_idx(&mut idx);
        let (ret, rest) = collect(&table, &mut params);
        assert_eq!(ret, 0);
        assert_eq!(rest, ["c", "d"]);
        assert_eq!(idx, 4);
    }

    #[test]
    fn test_decreasing_from_index() {
        let table = LinkTable::new(vec![leaf("a"), leaf("b"), leaf("c")]);
        let mut idx = 1usize;
        let mut params = IterParams::new(IndexType::Name, IterOrder::Decreasing).with_idx(&mut idx);
        let (_, seen) = collect(&table, &mut params);
        assert_eq!(seen, ["b", "a"]);
        assert_eq!(idx, 0);

        let mut bad = 3usize;
        let mut params = IterParams::new(IndexType::Name, IterOrder::Decreasing).with_idx(&mut bad);
        assert!(traverse_link_table(&table, &mut params, |_, _| 0).is_err());
    }

    #[test]
    fn test_recursive_paths() {
        let table = LinkTable::new(vec![
            group("g1", vec![leaf("x"), group("g2", vec![leaf("y")])]),
            leaf("z"),
        ]);

        let (_, flat) = collect(&table, &mut IterParams::new(IndexType::Name, IterOrder::Increasing));
        assert_eq!(flat, ["g1", "z"]);

        let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).recursive(true);
        let (_, deep) = collect(&table, &mut params);
        assert_eq!(deep, ["g1", "g1/x", "g1/g2", "g1/g2/y", "z"]);
    }

    #[test]
    fn test_stop_inside_subgroup_propagates() {
        let table = LinkTable::new(vec![group("g1", vec![leaf("x")]), leaf("z")]);
        let mut idx = 0usize;
        let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing)
            .with_idx(&mut idx)
            .recursive(true);
        let mut seen = Vec::new();
        let ret = traverse_link_table(&table, &mut params, |path, _| {
            seen.push(path.to_string());
            if path == "g1/x" {
                3
            } else {
                0
            }
        })
        .unwrap();
        assert_eq!(ret, 3);
        assert_eq!(seen, ["g1", "g1/x"]);
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_negative_callback_is_error() {
        let table = LinkTable::new(vec![leaf("a"), leaf("b")]);
        let mut calls = 0;
        let err = traverse_link_table(
            &table,
            &mut IterParams::new(IndexType::Name, IterOrder::Increasing),
            |_, _| {
                calls += 1;
                -2
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::CallbackError(-2)));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_empty_table() {
        let mut idx = 5usize;
        let mut params = IterParams::new(IndexType::Name, IterOrder::Decreasing).with_idx(&mut idx);
        assert_eq!(traverse_link_table(&LinkTable::default(), &mut params, |_, _| 1).unwrap(), 0);
        assert_eq!(idx, 0);
    }
}
