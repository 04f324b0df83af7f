// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Link path helpers.

use url::form_urlencoded;

/// Everything after the last `/`.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Everything up to and including the last `/`; empty without one.
pub fn dirname(path: &str) -> &str {
    &path[..path.len() - basename(path).len()]
}

/// Percent-escape one path component. Spaces become `%20`.
pub fn escape_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for piece in form_urlencoded::byte_serialize(name.as_bytes()) {
        match piece {
            "+" => out.push_str("%20"),
            "*" => out.push_str("%2A"),
            other => out.push_str(other),
        }
    }
    out
}

/// Escape every component of `path` separately.
///
/// A leading run of `/` and `.` is kept as-is so absolute and relative
/// forms survive; empty components are dropped.
pub fn url_encode_path(path: &str) -> String {
    let rest = path.trim_start_matches(['/', '.']);
    let prefix = &path[..path.len() - rest.len()];
    let components: Vec<String> = rest
        .split('/')
        .filter(|c| !c.is_empty())
        .map(escape_component)
        .collect();
    format!("{}{}", prefix, components.join("/"))
}

/// `prefix/name`, or `name` alone at the top level.
pub fn join(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}/{}", p, name),
        _ => name.to_string(),
    }
}

pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}
