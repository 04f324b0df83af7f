// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Link iteration and visit against a scripted server.
//
// Domain layout used throughout:
//
//   /            g-root
//   ├── b        hard -> g-b          (created 1.0)
//   │   ├── back hard -> g-root       (cycle)
//   │   └── d    hard -> d-d
//   ├── a        soft -> /b/d         (created 3.0)
//   └── c        hard -> g-c          (created 2.0)
//       └── e    external -> /other.h5:/e

#![allow(clippy::float_cmp)]

use h5rest::link::{self, IndexType, IterOrder, IterParams, LinkEntry};
use h5rest::{Error, MemoryTransport, RemoteObject, Session};
use serde_json::{json, Value};

fn hard(title: &str, collection: &str, id: &str, created: f64) -> Value {
    json!({"class": "H5L_TYPE_HARD", "collection": collection, "id": id, "title": title, "created": created})
}

fn scripted_domain() -> MemoryTransport {
    let mem = MemoryTransport::new();
    mem.get_json(
        "/groups/g-root/links",
        &json!({"links": [
            hard("b", "groups", "g-b", 1.0),
            {"class": "H5L_TYPE_SOFT", "h5path": "/b/d", "title": "a", "created": 3.0},
            hard("c", "groups", "g-c", 2.0),
        ]}),
    );
    mem.get_json(
        "/groups/g-b/links",
        &json!({"links": [
            hard("back", "groups", "g-root", 4.0),
            hard("d", "datasets", "d-d", 5.0),
        ]}),
    );
    mem.get_json(
        "/groups/g-c/links",
        &json!({"links": [
            {"class": "H5L_TYPE_EXTERNAL", "h5domain": "/other.h5", "h5path": "/e", "title": "e", "created": 6.0},
        ]}),
    );
    mem
}

fn root() -> RemoteObject {
    RemoteObject::group("g-root")
}

fn names_of(session: &mut Session, params: &mut IterParams<'_>, recursive: bool) -> Vec<String> {
    let mut names = Vec::new();
    let cb = |path: &str, _: &LinkEntry| {
        names.push(path.to_string());
        0
    };
    let ret = if recursive {
        link::visit_links(session, &root(), params, cb)
    } else {
        link::iterate_links(session, &root(), params, cb)
    };
    assert_eq!(ret.unwrap(), 0);
    names
}

#[test]
fn test_iterate_by_name_sorts_server_listing() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing);
    assert_eq!(names_of(&mut session, &mut params, false), ["a", "b", "c"]);

    let mut params = IterParams::new(IndexType::Name, IterOrder::Decreasing);
    assert_eq!(names_of(&mut session, &mut params, false), ["c", "b", "a"]);
}

#[test]
fn test_iterate_by_creation_order() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::new(IndexType::CreationOrder, IterOrder::Native);
    assert_eq!(names_of(&mut session, &mut params, false), ["b", "c", "a"]);

    let mut params = IterParams::new(IndexType::CreationOrder, IterOrder::Decreasing);
    assert_eq!(names_of(&mut session, &mut params, false), ["a", "c", "b"]);
}

#[test]
fn test_iterate_does_not_descend() {
    let mem = scripted_domain();
    let mut session = Session::new(mem.clone());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).recursive(true);
    assert_eq!(names_of(&mut session, &mut params, false), ["a", "b", "c"]);
    assert_eq!(mem.request_count("/groups/g-b/links"), 0);
}

#[test]
fn test_visit_terminates_on_cycle() {
    let mem = scripted_domain();
    let mut session = Session::new(mem.clone());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing);
    let names = names_of(&mut session, &mut params, true);

    assert_eq!(names, ["a", "b", "b/back", "b/d", "c", "c/e"]);
    // each group listed exactly once, the start group included
    assert_eq!(mem.request_count("/groups/g-root/links"), 1);
    assert_eq!(mem.request_count("/groups/g-b/links"), 1);
    assert_eq!(mem.request_count("/groups/g-c/links"), 1);
}

#[test]
fn test_visit_decreasing_walks_subgroups_in_reverse() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Decreasing);
    let names = names_of(&mut session, &mut params, true);
    assert_eq!(names, ["c", "c/e", "b", "b/d", "b/back", "a"]);
}

#[test]
fn test_restart_from_stored_index() {
    let mut session = Session::new(scripted_domain());
    let mut idx = 0usize;

    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).with_idx(&mut idx);
    let ret = link::iterate_links(&mut session, &root(), &mut params, |name, _| {
        if name == "b" {
            42
        } else {
            0
        }
    })
    .unwrap();
    assert_eq!(ret, 42);
    assert_eq!(idx, 1);

    let mut rest = Vec::new();
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing).with_idx(&mut idx);
    link::iterate_links(&mut session, &root(), &mut params, |name, _| {
        rest.push(name.to_string());
        0
    })
    .unwrap();
    assert_eq!(rest, ["b", "c"]);
    assert_eq!(idx, 3);
}

#[test]
fn test_callback_error_aborts() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing);
    let err = link::visit_links(&mut session, &root(), &mut params, |name, _| {
        if name == "b/d" {
            -1
        } else {
            0
        }
    })
    .unwrap_err();
    assert!(matches!(err, Error::CallbackError(-1)));
}

#[test]
fn test_link_kinds_reach_callback() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing);
    let mut ext = None;
    link::visit_links(&mut session, &root(), &mut params, |name, entry| {
        if name == "c/e" {
            ext = entry.info.value_bytes();
        }
        0
    })
    .unwrap();

    let (flags, domain, path) = link::unpack_external_link_value(&ext.unwrap()).unwrap();
    assert_eq!(flags, 0);
    assert_eq!(domain, "/other.h5");
    assert_eq!(path, "/e");
}

#[test]
fn test_missing_group_is_not_found() {
    let mut session = Session::new(scripted_domain());
    let mut params = IterParams::default();
    let err = link::iterate_links(&mut session, &RemoteObject::group("g-zzz"), &mut params, |_, _| 0)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_name_by_index_matches_iteration() {
    let mut session = Session::new(scripted_domain());
    for (index_type, order) in [
        (IndexType::Name, IterOrder::Increasing),
        (IndexType::Name, IterOrder::Decreasing),
        (IndexType::CreationOrder, IterOrder::Increasing),
        (IndexType::CreationOrder, IterOrder::Decreasing),
    ] {
        let mut params = IterParams::new(index_type, order);
        let expected = names_of(&mut session, &mut params, false);
        for (n, name) in expected.iter().enumerate() {
            let got = link::link_name_by_index(&mut session, &root(), index_type, order, n).unwrap();
            assert_eq!(&got, name, "{:?}/{:?} index {}", index_type, order, n);
        }
    }
}
