// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recursive object visit.
//!
//! Unlike link visiting, the callback runs once per distinct object rather
//! than once per link: the starting object first (as `"."`), then every
//! object reachable through hard links, depth first. Soft and external
//! links are skipped.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::link::table::{build_link_table, comparator, VisitedSet};
use crate::link::{IterOrder, IterParams, LinkTable};
use crate::object::{parse_object_info, ObjectInfo, ObjectKind, RemoteObject};
use crate::path;
use crate::session::Session;

/// Fetch the info record of one object.
pub fn get_object_info(session: &mut Session, object: &RemoteObject) -> Result<ObjectInfo> {
    let response = session.get(&object.endpoint())?;
    parse_object_info(&response)
}

/// Visit `start` and everything reachable from it.
///
/// `params.index_type` and `params.order` set the order links are followed
/// in; `idx` and `recursive` are not used. Returns 0 when the visit
/// completed or the positive value the callback stopped with.
pub fn visit_objects<F>(
    session: &mut Session,
    start: &RemoteObject,
    params: &IterParams<'_>,
    mut callback: F,
) -> Result<i32>
where
    F: FnMut(&str, &ObjectInfo) -> i32,
{
    let info = get_object_info(session, start)?;
    let ret = check(callback(".", &info), ".")?;
    if ret > 0 || start.kind != ObjectKind::Group {
        return Ok(ret);
    }

    let links = session.get(&format!("/groups/{}/links", start.uri))?;
    let mut visited_groups = VisitedSet::new();
    visited_groups.insert(start.uri.clone());
    let table = build_link_table(
        session,
        &links,
        true,
        Some(comparator(params.index_type, IterOrder::Increasing)),
        &mut visited_groups,
    )?;

    let mut visited_objects = HashSet::new();
    visited_objects.insert(start.uri.clone());
    let mut walker = Walker {
        session,
        order: params.order,
        visited: visited_objects,
        callback: &mut callback,
    };
    let ret = walker.walk(&table, None)?;
    log::debug!(
        "[visit] {} objects under {} ({} groups expanded)",
        walker.visited.len(),
        start.uri,
        visited_groups.len()
    );
    Ok(ret)
}

fn check(code: i32, path: &str) -> Result<i32> {
    if code < 0 {
        log::debug!("[visit] callback failed with {} on '{}'", code, path);
        return Err(Error::CallbackError(code));
    }
    Ok(code)
}

struct Walker<'s, 'c, F> {
    session: &'s mut Session,
    order: IterOrder,
    visited: HashSet<String>,
    callback: &'c mut F,
}

impl<F> Walker<'_, '_, F>
where
    F: FnMut(&str, &ObjectInfo) -> i32,
{
    fn walk(&mut self, table: &LinkTable, prefix: Option<&str>) -> Result<i32> {
        let entries = table.entries();
        let positions: Box<dyn Iterator<Item = usize>> = if self.order.is_decreasing() {
            Box::new((0..entries.len()).rev())
        } else {
            Box::new(0..entries.len())
        };

        for i in positions {
            let entry = &entries[i];
            let Some(target) = entry.info.object() else {
                continue;
            };
            let path = path::join(prefix, &entry.name);

            if self.visited.insert(target.uri.clone()) {
                let info = get_object_info(self.session, target)?;
                let ret = check((self.callback)(&path, &info), &path)?;
                if ret > 0 {
                    return Ok(ret);
                }
            }

            if let Some(sub) = entry.subgroup.as_ref() {
                let ret = self.walk(sub, Some(&path))?;
                if ret > 0 {
                    return Ok(ret);
                }
            }
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use serde_json::{json, Value};

    fn object(id: &str, attrs: u64) -> Value {
        json!({
            "id": id,
            "attributeCount": attrs,
            "hrefs": [{"rel": "home", "href": "http://hsds/?domain=/t.h5"}]
        })
    }

    fn hard(name: &str, collection: &str, id: &str) -> Value {
        json!({"class": "H5L_TYPE_HARD", "collection": collection, "id": id, "title": name, "created": 1.0})
    }

    fn cyclic_domain() -> MemoryTransport {
        let mem = MemoryTransport::new();
        mem.get_json("/groups/g-root", &object("g-root", 0));
        mem.get_json("/groups/g-a", &object("g-a", 1));
        mem.get_json("/datasets/d-x", &object("d-x", 2));
        mem.get_json(
            "/groups/g-root/links",
            &json!({"links": [
                hard("a", "groups", "g-a"),
                hard("x", "datasets", "d-x"),
                {"class": "H5L_TYPE_SOFT", "h5path": "/a", "title": "s", "created": 1.0},
            ]}),
        );
        mem.get_json(
            "/groups/g-a/links",
            &json!({"links": [hard("up", "groups", "g-root"), hard("x2", "datasets", "d-x")]}),
        );
        mem
    }

    #[test]
    fn test_each_object_once() {
        let mut session = Session::new(cyclic_domain());
        let mut seen = Vec::new();
        let params = IterParams::default();
        let ret = visit_objects(&mut session, &RemoteObject::group("g-root"), &params, |path, info| {
            seen.push((path.to_string(), info.uri.clone()));
            0
        })
        .unwrap();
        assert_eq!(ret, 0);
        assert_eq!(
            seen,
            [
                (".".to_string(), "g-root".to_string()),
                ("a".to_string(), "g-a".to_string()),
                ("a/x2".to_string(), "d-x".to_string()),
            ]
        );
    }

    #[test]
    fn test_stop_on_start_object() {
        let mem = cyclic_domain();
        let mut session = Session::new(mem.clone());
        let ret = visit_objects(
            &mut session,
            &RemoteObject::group("g-root"),
            &IterParams::default(),
            |_, _| 9,
        )
        .unwrap();
        assert_eq!(ret, 9);
        assert_eq!(mem.request_count("/groups/g-root/links"), 0);
    }

    #[test]
    fn test_dataset_start_has_no_links() {
        let mut session = Session::new(cyclic_domain());
        let mut count = 0;
        visit_objects(
            &mut session,
            &RemoteObject::new("d-x", ObjectKind::Dataset),
            &IterParams::default(),
            |_, info| {
                assert_eq!(info.num_attrs, 2);
                count += 1;
                0
            },
        )
        .unwrap();
        assert_eq!(count, 1);
    }
}
