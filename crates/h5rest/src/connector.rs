// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connector capability trait.
//!
//! [`RestConnector`] lists the operations a host library dispatches to a
//! remote-storage connector. [`Connector`] implements it over a
//! [`Session`]; tests and alternative backends can provide their own
//! implementation.
//!
//! ```text
//! host library ──> RestConnector ──> Connector ──> Session ──> Transport
//!                                                   │
//!                            resolver / link / attribute / visit
//! ```

use crate::attribute::{self, AttrEntry};
use crate::dataspace::{decode_shape, ShapeDescriptor};
use crate::datatype::{self, TypeDescriptor};
use crate::error::{Error, Result};
use crate::json;
use crate::link::{self, IterParams, LinkEntry, LinkInfo};
use crate::object::{parse_group_info, GroupInfo, ObjectInfo, ObjectKind, RemoteObject};
use crate::resolver::{self, Resolution};
use crate::session::Session;
use crate::visit;

/// Link callback: `(relative_path, entry) -> code`.
pub type LinkCallback<'a> = dyn FnMut(&str, &LinkEntry) -> i32 + 'a;
/// Attribute callback: `(name, entry) -> code`.
pub type AttrCallback<'a> = dyn FnMut(&str, &AttrEntry) -> i32 + 'a;
/// Object callback: `(relative_path, info) -> code`.
pub type ObjectCallback<'a> = dyn FnMut(&str, &ObjectInfo) -> i32 + 'a;

/// Operations a remote-storage connector provides.
///
/// Iteration methods follow one contract: the callback returns a negative
/// code to abort (surfacing as [`Error::CallbackError`]), a positive code
/// to stop early (returned as `Ok(code)`), or zero to continue.
pub trait RestConnector {
    /// Open a domain and return its root group.
    ///
    /// # Arguments
    /// * `domain` - Server-side domain path, e.g. `/home/user/file.h5`
    ///
    /// # Returns
    /// * `Ok(root)` with the root group handle
    /// * `Err` if the domain does not exist or the server is unreachable
    fn open_domain(&mut self, domain: &str) -> Result<RemoteObject>;

    /// Resolve `path` relative to `parent`.
    ///
    /// # Arguments
    /// * `parent` - Object the path is anchored at (ignored for absolute paths)
    /// * `path` - Link path; `.` names `parent`, `/` names the root group
    /// * `kind` - Expected kind, or `None` to discover it from the last link
    ///
    /// # Returns
    /// * `Ok(Resolution::Found { .. })` when the path names an object
    /// * `Ok(Resolution::Symbolic(_))` when it ends in a soft/external link
    /// * `Ok(Resolution::NotFound)` when the server has no such path
    fn open_object(
        &mut self,
        parent: &RemoteObject,
        path: &str,
        kind: Option<ObjectKind>,
    ) -> Result<Resolution>;

    /// Datatype of a dataset or committed datatype.
    fn object_datatype(&mut self, object: &RemoteObject) -> Result<TypeDescriptor>;

    /// Shape of a dataset.
    fn object_shape(&mut self, dataset: &RemoteObject) -> Result<ShapeDescriptor>;

    /// Kind, home hash and attribute count of an object.
    fn object_info(&mut self, object: &RemoteObject) -> Result<ObjectInfo>;

    /// Link count of a group.
    fn group_info(&mut self, group: &RemoteObject) -> Result<GroupInfo>;

    fn link_exists(&mut self, group: &RemoteObject, name: &str) -> Result<bool>;

    fn link_info(&mut self, group: &RemoteObject, name: &str) -> Result<LinkInfo>;

    /// Iterate the links of one group.
    fn iterate_links(
        &mut self,
        group: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut LinkCallback<'_>,
    ) -> Result<i32>;

    /// Visit every link reachable from a group.
    fn visit_links(
        &mut self,
        group: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut LinkCallback<'_>,
    ) -> Result<i32>;

    /// Iterate the attributes of an object.
    fn iterate_attributes(
        &mut self,
        object: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut AttrCallback<'_>,
    ) -> Result<i32>;

    /// Visit every object reachable from `start`, starting object first.
    fn visit_objects(
        &mut self,
        start: &RemoteObject,
        params: &IterParams<'_>,
        callback: &mut ObjectCallback<'_>,
    ) -> Result<i32>;
}

/// [`RestConnector`] over a [`Session`].
#[derive(Debug)]
pub struct Connector {
    session: Session,
}

impl Connector {
    pub fn new(session: Session) -> Self {
        Connector { session }
    }

    /// Connect over HTTP; opens the configured domain when there is one.
    #[cfg(feature = "http")]
    pub fn connect(config: &crate::config::ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let mut session = Session::connect(config)?;
        if let Some(domain) = config.domain.as_deref() {
            session.open_domain(domain)?;
        }
        Ok(Connector { session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }
}

impl RestConnector for Connector {
    fn open_domain(&mut self, domain: &str) -> Result<RemoteObject> {
        self.session.open_domain(domain)
    }

    fn open_object(
        &mut self,
        parent: &RemoteObject,
        path: &str,
        kind: Option<ObjectKind>,
    ) -> Result<Resolution> {
        resolver::find_object_by_path(&mut self.session, parent, path, kind)
    }

    fn object_datatype(&mut self, object: &RemoteObject) -> Result<TypeDescriptor> {
        if object.kind == ObjectKind::Group {
            return Err(Error::InvalidArgument(format!(
                "group {} has no datatype",
                object.uri
            )));
        }
        let response = self.session.get(&object.endpoint())?;
        datatype::decode(json::require(&response, &["type"])?)
    }

    fn object_shape(&mut self, dataset: &RemoteObject) -> Result<ShapeDescriptor> {
        if dataset.kind != ObjectKind::Dataset {
            return Err(Error::InvalidArgument(format!(
                "{} {} has no shape",
                dataset.kind, dataset.uri
            )));
        }
        let response = self.session.get(&dataset.endpoint())?;
        decode_shape(json::require(&response, &["shape"])?)
    }

    fn object_info(&mut self, object: &RemoteObject) -> Result<ObjectInfo> {
        visit::get_object_info(&mut self.session, object)
    }

    fn group_info(&mut self, group: &RemoteObject) -> Result<GroupInfo> {
        if group.kind != ObjectKind::Group {
            return Err(Error::InvalidArgument(format!(
                "{} {} is not a group",
                group.kind, group.uri
            )));
        }
        let response = self.session.get(&group.endpoint())?;
        parse_group_info(&response)
    }

    fn link_exists(&mut self, group: &RemoteObject, name: &str) -> Result<bool> {
        link::link_exists(&mut self.session, group, name)
    }

    fn link_info(&mut self, group: &RemoteObject, name: &str) -> Result<LinkInfo> {
        link::get_link_info(&mut self.session, group, name)
    }

    fn iterate_links(
        &mut self,
        group: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut LinkCallback<'_>,
    ) -> Result<i32> {
        link::iterate_links(&mut self.session, group, params, callback)
    }

    fn visit_links(
        &mut self,
        group: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut LinkCallback<'_>,
    ) -> Result<i32> {
        link::visit_links(&mut self.session, group, params, callback)
    }

    fn iterate_attributes(
        &mut self,
        object: &RemoteObject,
        params: &mut IterParams<'_>,
        callback: &mut AttrCallback<'_>,
    ) -> Result<i32> {
        attribute::iterate_attributes(&mut self.session, object, params, callback)
    }

    fn visit_objects(
        &mut self,
        start: &RemoteObject,
        params: &IterParams<'_>,
        callback: &mut ObjectCallback<'_>,
    ) -> Result<i32> {
        visit::visit_objects(&mut self.session, start, params, callback)
    }
}
