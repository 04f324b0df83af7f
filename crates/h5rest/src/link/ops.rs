// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Group-level link operations.

use super::table::{self, build_link_table, comparator, IndexType, IterOrder, LinkEntry, VisitedSet};
use super::traverse::{traverse_link_table, IterParams};
use super::{parse_link_info, LinkInfo, LINK_NAME_MAX_LENGTH};
use crate::error::{Error, Result};
use crate::object::{ObjectKind, RemoteObject};
use crate::path;
use crate::session::Session;

fn links_endpoint(group: &RemoteObject) -> Result<String> {
    if group.kind != ObjectKind::Group {
        return Err(Error::InvalidArgument(format!(
            "links live on groups, not on {} {}",
            group.kind, group.uri
        )));
    }
    Ok(format!("/groups/{}/links", group.uri))
}

fn link_endpoint(group: &RemoteObject, name: &str) -> Result<String> {
    if name.is_empty() || name.len() > LINK_NAME_MAX_LENGTH {
        return Err(Error::InvalidArgument(format!(
            "link name must be 1..={} bytes, got {}",
            LINK_NAME_MAX_LENGTH,
            name.len()
        )));
    }
    Ok(format!("{}/{}", links_endpoint(group)?, path::escape_component(name)))
}

/// Table order used by iterate and visit. Direction is applied by the walk.
fn iteration_sort(index_type: IndexType) -> table::LinkComparator {
    comparator(index_type, IterOrder::Increasing)
}

/// Call `callback` for every link of `group`.
///
/// Returns 0 when the walk completed or the positive value the callback
/// stopped with.
pub fn iterate_links<F>(
    session: &mut Session,
    group: &RemoteObject,
    params: &mut IterParams<'_>,
    callback: F,
) -> Result<i32>
where
    F: FnMut(&str, &LinkEntry) -> i32,
{
    let endpoint = links_endpoint(group)?;
    let links = session.get(&endpoint)?;

    let mut visited = VisitedSet::new();
    let table = build_link_table(
        session,
        &links,
        false,
        Some(iteration_sort(params.index_type)),
        &mut visited,
    )?;
    log::debug!("[link] iterating {} links of {}", table.len(), group.uri);

    params.recursive = false;
    traverse_link_table(&table, params, callback)
}

/// Call `callback` for every link reachable from `group`, depth first.
///
/// Each group is expanded once; a hard link back to a group already
/// expanded (including `group` itself) is reported but not entered.
pub fn visit_links<F>(
    session: &mut Session,
    group: &RemoteObject,
    params: &mut IterParams<'_>,
    callback: F,
) -> Result<i32>
where
    F: FnMut(&str, &LinkEntry) -> i32,
{
    let endpoint = links_endpoint(group)?;
    let links = session.get(&endpoint)?;

    let mut visited = VisitedSet::new();
    visited.insert(group.uri.clone());
    let table = build_link_table(
        session,
        &links,
        true,
        Some(iteration_sort(params.index_type)),
        &mut visited,
    )?;
    log::debug!(
        "[link] visiting {} links under {} ({} groups)",
        table.total_len(),
        group.uri,
        visited.len()
    );

    params.recursive = true;
    traverse_link_table(&table, params, callback)
}

/// Name of the `n`-th link of `group` in the requested order.
pub fn link_name_by_index(
    session: &mut Session,
    group: &RemoteObject,
    index_type: IndexType,
    order: IterOrder,
    n: usize,
) -> Result<String> {
    let endpoint = links_endpoint(group)?;
    let links = session.get(&endpoint)?;
    let mut visited = VisitedSet::new();
    let table = build_link_table(
        session,
        &links,
        false,
        Some(comparator(index_type, order)),
        &mut visited,
    )?;

    table
        .get(n)
        .map(|e| e.name.clone())
        .ok_or_else(|| {
            Error::NotFound(format!(
                "link index {} of group {} ({} links)",
                n,
                group.uri,
                table.len()
            ))
        })
}

/// Whether `group` has a link called `name`.
pub fn link_exists(session: &mut Session, group: &RemoteObject, name: &str) -> Result<bool> {
    let endpoint = link_endpoint(group, name)?;
    Ok(session.get_optional(&endpoint)?.is_some())
}

pub fn get_link_info(session: &mut Session, group: &RemoteObject, name: &str) -> Result<LinkInfo> {
    let endpoint = link_endpoint(group, name)?;
    let response = session.get(&endpoint)?;
    parse_link_info(&response)
}

/// Packed value of a soft or external link.
pub fn get_link_value(session: &mut Session, group: &RemoteObject, name: &str) -> Result<Vec<u8>> {
    let info = get_link_info(session, group, name)?;
    info.value_bytes().ok_or_else(|| {
        Error::InvalidArgument(format!(
            "link '{}' is {} and has no value",
            name,
            info.kind().wire_name()
        ))
    })
}
