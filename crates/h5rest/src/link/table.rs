// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Link tables.
//!
//! A [`LinkTable`] holds one group's links in the order a traversal will
//! see them. Built recursively, every hard link to a group not seen before
//! carries the table of that subgroup; a group reached a second time (a
//! hard-link cycle or a shared subgroup) stays a leaf.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::Value;

use super::{parse_link_info, LinkInfo, LINK_NAME_MAX_LENGTH};
use crate::error::{Error, Result};
use crate::json;
use crate::session::Session;

/// Remote ids of groups already expanded during one recursive build.
pub type VisitedSet = HashSet<String>;

/// Key a table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    #[default]
    Name,
    CreationOrder,
}

/// Direction of a traversal or sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IterOrder {
    #[default]
    Increasing,
    Decreasing,
    /// As returned by the server; sorts and scans like `Increasing`.
    Native,
}

impl IterOrder {
    pub fn is_decreasing(self) -> bool {
        self == IterOrder::Decreasing
    }
}

/// Comparator used to order a table in place.
pub type LinkComparator = fn(&LinkEntry, &LinkEntry) -> Ordering;

/// One link of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEntry {
    pub name: String,
    /// Server timestamp (seconds since the epoch).
    pub creation_time: f64,
    pub info: LinkInfo,
    /// Links of the target group, for recursive tables.
    pub subgroup: Option<LinkTable>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkTable {
    entries: Vec<LinkEntry>,
}

impl LinkTable {
    pub fn new(entries: Vec<LinkEntry>) -> Self {
        LinkTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LinkEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&LinkEntry> {
        self.entries.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinkEntry> {
        self.entries.iter()
    }

    /// Entries here and in every nested subgroup table.
    pub fn total_len(&self) -> usize {
        self.entries
            .iter()
            .map(|e| 1 + e.subgroup.as_ref().map_or(0, LinkTable::total_len))
            .sum()
    }

    /// Sort this table and every nested table.
    pub fn sort_by(&mut self, cmp: LinkComparator) {
        self.entries.sort_by(cmp);
        for entry in &mut self.entries {
            if let Some(sub) = entry.subgroup.as_mut() {
                sub.sort_by(cmp);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Comparators
// ---------------------------------------------------------------------------

pub fn cmp_by_creation_order_inc(a: &LinkEntry, b: &LinkEntry) -> Ordering {
    a.creation_time.total_cmp(&b.creation_time)
}

pub fn cmp_by_creation_order_dec(a: &LinkEntry, b: &LinkEntry) -> Ordering {
    b.creation_time.total_cmp(&a.creation_time)
}

pub fn cmp_by_name_inc(a: &LinkEntry, b: &LinkEntry) -> Ordering {
    a.name.as_bytes().cmp(b.name.as_bytes())
}

pub fn cmp_by_name_dec(a: &LinkEntry, b: &LinkEntry) -> Ordering {
    b.name.as_bytes().cmp(a.name.as_bytes())
}

/// Comparator for an index and direction. `Native` sorts increasing.
pub fn comparator(index: IndexType, order: IterOrder) -> LinkComparator {
    match (index, order.is_decreasing()) {
        (IndexType::Name, false) => cmp_by_name_inc,
        (IndexType::Name, true) => cmp_by_name_dec,
        (IndexType::CreationOrder, false) => cmp_by_creation_order_inc,
        (IndexType::CreationOrder, true) => cmp_by_creation_order_dec,
    }
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build the table for a `{"links": [...]}` response.
///
/// With `recursive`, hard links to groups whose id is not yet in `visited`
/// are expanded by fetching `/groups/<id>/links`; the id is inserted before
/// descending.
pub fn build_link_table(
    session: &mut Session,
    links_json: &Value,
    recursive: bool,
    sort: Option<LinkComparator>,
    visited: &mut VisitedSet,
) -> Result<LinkTable> {
    let links = json::require_array(links_json, &["links"])?;
    let mut entries = Vec::with_capacity(links.len());

    for link in links {
        let mut entry = parse_link_entry(link)?;

        if recursive && entry.info.is_group_link() {
            if let Some(target) = entry.info.object() {
                if visited.insert(target.uri.clone()) {
                    let endpoint = format!("/groups/{}/links", target.uri);
                    let sub_json = session.get(&endpoint)?;
                    let sub = build_link_table(session, &sub_json, recursive, sort, visited)
                        .map_err(|e| match e {
                            Error::MalformedWireData(msg) => Error::MalformedWireData(format!(
                                "in subgroup '{}': {}",
                                entry.name, msg
                            )),
                            other => other,
                        })?;
                    entry.subgroup = Some(sub);
                } else {
                    log::debug!(
                        "[link] '{}' leads to already visited group {}, not descending",
                        entry.name,
                        target.uri
                    );
                }
            }
        }
        entries.push(entry);
    }

    let mut table = LinkTable::new(entries);
    if let Some(cmp) = sort {
        table.entries.sort_by(cmp);
    }
    log::trace!("[link] built table of {} links", table.len());
    Ok(table)
}

/// One element of a `links` array.
pub fn parse_link_entry(link: &Value) -> Result<LinkEntry> {
    let name = json::require_str(link, &["title"])?;
    if name.len() > LINK_NAME_MAX_LENGTH {
        return Err(Error::malformed(format!(
            "link name of {} bytes exceeds {}",
            name.len(),
            LINK_NAME_MAX_LENGTH
        )));
    }
    Ok(LinkEntry {
        name: name.to_string(),
        creation_time: json::require_f64(link, &["created"])?,
        info: parse_link_info(link)?,
        subgroup: None,
    })
}
