// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Path resolution.
//!
//! Two phases:
//!
//! 1. **Type discovery**, only when the caller does not know what the path
//!    names: resolve the dirname as a group, then fetch the link for the
//!    basename and read its class (and, for hard links, its collection).
//! 2. **Object fetch**: one request using server-side path lookup, anchored
//!    at the root for absolute paths and at the parent's id for relative
//!    ones.
//!
//! ```text
//! group     /groups/<id>                  "." or "/"
//!           /groups/<parent>?h5path=<p>   relative
//!           /groups/?h5path=<p>           absolute
//! datatype  /datatypes/?grpid=<parent>&h5path=<p>
//! dataset   /datasets/?grpid=<parent>&h5path=<p>
//! ```

use serde_json::Value;

use crate::error::{Error, Result};
use crate::json;
use crate::link::{self, LinkInfo, LinkTarget};
use crate::object::{ObjectKind, RemoteObject};
use crate::path;
use crate::session::Session;

/// Soft links followed by [`find_object_following_links`] before giving up.
pub const MAX_SOFT_LINK_HOPS: usize = 16;

/// Outcome of a path lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The object exists. `response` is the object's GET response.
    Found {
        object: RemoteObject,
        response: Value,
    },
    /// The path ends in a soft, external or user-defined link. Found, but
    /// there is no object id to report.
    Symbolic(LinkInfo),
    /// The server answered "not found".
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }

    pub fn object(&self) -> Option<&RemoteObject> {
        match self {
            Resolution::Found { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// Resolve `path` relative to `parent`.
///
/// `kind_hint` skips type discovery when the caller already knows what the
/// path names.
pub fn find_object_by_path(
    session: &mut Session,
    parent: &RemoteObject,
    path: &str,
    kind_hint: Option<ObjectKind>,
) -> Result<Resolution> {
    find_object_by_path_with(session, parent, path, kind_hint, &mut |_| Ok(()))
}

/// Same as [`find_object_by_path`], running `on_found` on the object's
/// response before returning.
pub fn find_object_by_path_with(
    session: &mut Session,
    parent: &RemoteObject,
    path: &str,
    kind_hint: Option<ObjectKind>,
    on_found: &mut dyn FnMut(&Value) -> Result<()>,
) -> Result<Resolution> {
    let path = path.trim_start_matches(' ');

    let (path, kind) = match path {
        "." => (path, Some(parent.kind)),
        "/" => (path, Some(ObjectKind::Group)),
        _ if path::is_absolute(path) => (path, kind_hint),
        // '..' does not name a parent group; collapse leading dots to one
        _ => (skip_dot_runs(path), kind_hint),
    };

    let kind = match kind {
        Some(kind) => kind,
        None => match discover_kind(session, parent, path)? {
            Discovered::Kind(kind) => kind,
            Discovered::Symbolic(info) => {
                log::debug!("[resolver] '{}' is a {:?} link", path, info.kind());
                return Ok(Resolution::Symbolic(info));
            }
            Discovered::NotFound => return Ok(Resolution::NotFound),
        },
    };

    let endpoint = fetch_endpoint(session, parent, path, kind)?;
    log::trace!("[resolver] GET {}", endpoint);
    let Some(response) = session.get_optional(&endpoint)? else {
        return Ok(Resolution::NotFound);
    };

    on_found(&response)?;
    let uri = copy_object_uri(&response)?
        .ok_or_else(|| Error::malformed(format!("response for '{}' carries no object id", path)))?;
    Ok(Resolution::Found {
        object: RemoteObject::new(uri, kind),
        response,
    })
}

/// Resolve `path`, following soft links inside the same domain.
///
/// A relative soft-link value is taken relative to the group holding the
/// link. External and user-defined links are still reported as
/// [`Resolution::Symbolic`].
pub fn find_object_following_links(
    session: &mut Session,
    parent: &RemoteObject,
    path: &str,
) -> Result<Resolution> {
    let mut current = path.to_string();
    for _ in 0..MAX_SOFT_LINK_HOPS {
        match find_object_by_path(session, parent, &current, None)? {
            Resolution::Symbolic(LinkInfo {
                target: LinkTarget::Soft { path: next },
            }) => {
                log::debug!("[resolver] following soft link '{}' -> '{}'", current, next);
                current = if path::is_absolute(&next) {
                    next
                } else {
                    format!("{}{}", path::dirname(current.trim_start()), next)
                };
            }
            other => return Ok(other),
        }
    }
    Err(Error::PathError(format!(
        "more than {} soft links while resolving '{}'",
        MAX_SOFT_LINK_HOPS, path
    )))
}

enum Discovered {
    Kind(ObjectKind),
    Symbolic(LinkInfo),
    NotFound,
}

fn discover_kind(session: &mut Session, parent: &RemoteObject, path: &str) -> Result<Discovered> {
    let dir = path::dirname(path);
    let group = if dir.is_empty() || dir == "./" {
        parent.clone()
    } else {
        match find_object_by_path(session, parent, dir, Some(ObjectKind::Group)) {
            Ok(Resolution::Found { object, .. }) => object,
            Ok(_) => {
                return Err(Error::PathError(format!(
                    "can't locate parent group '{}' of '{}'",
                    dir, path
                )))
            }
            Err(e) => {
                return Err(Error::PathError(format!(
                    "can't locate parent group '{}' of '{}': {}",
                    dir, path, e
                )))
            }
        }
    };

    let endpoint = format!(
        "/groups/{}/links/{}",
        group.uri,
        path::escape_component(path::basename(path))
    );
    let Some(response) = session.get_optional(&endpoint)? else {
        return Ok(Discovered::NotFound);
    };

    let info = link::parse_link_info(&response)?;
    Ok(match info.object() {
        Some(obj) => Discovered::Kind(obj.kind),
        None => Discovered::Symbolic(info),
    })
}

fn fetch_endpoint(
    session: &mut Session,
    parent: &RemoteObject,
    path: &str,
    kind: ObjectKind,
) -> Result<String> {
    let relative = !path::is_absolute(path);
    let collection = kind.collection();

    if path == "." {
        return Ok(format!("/{}/{}", collection, parent.uri));
    }
    if path == "/" {
        let root = root_group(session)?;
        return Ok(format!("/groups/{}", root.uri));
    }

    let encoded = path::url_encode_path(path);
    Ok(match (kind, relative) {
        (ObjectKind::Group, true) => format!("/groups/{}?h5path={}", parent.uri, encoded),
        (ObjectKind::Group, false) => format!("/groups/?h5path={}", encoded),
        (_, true) => format!("/{}/?grpid={}&h5path={}", collection, parent.uri, encoded),
        (_, false) => format!("/{}/?h5path={}", collection, encoded),
    })
}

/// Root group of the session's domain.
fn root_group(session: &mut Session) -> Result<RemoteObject> {
    if let Some(root) = session.root() {
        return Ok(root.clone());
    }
    let resp = session.get("/")?;
    Ok(RemoteObject::group(json::require_str(&resp, &["root"])?))
}

fn skip_dot_runs(mut path: &str) -> &str {
    while path.starts_with("..") {
        path = &path[1..];
    }
    path
}

/// Object id from a response: `link.id`, then `id`, then `root`.
pub fn copy_object_uri(response: &Value) -> Result<Option<String>> {
    match json::get_any(response, &[&["link", "id"], &["id"], &["root"]]) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::malformed("object id is not a string")),
    }
}

/// Object id plus the domain the response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub uri: String,
    pub domain: String,
}

/// Read `domain` and the object id, for responses that may cross into
/// another domain.
pub fn copy_object_uri_and_domain(response: &Value) -> Result<ObjectLocation> {
    let domain = json::require_str(response, &["domain"])?.to_string();
    json::require_str(response, &["root"])?;
    let uri = copy_object_uri(response)?
        .ok_or_else(|| Error::malformed("response carries no object id"))?;
    Ok(ObjectLocation { uri, domain })
}
