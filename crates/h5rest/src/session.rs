// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection context passed to every core operation.
//!
//! A [`Session`] owns the transport, the reusable response buffer, the
//! current domain and the server version. Core functions take
//! `&mut Session`, so one session serves one caller at a time.

use serde_json::Value;

use crate::buffer::GrowableBuffer;
#[cfg(feature = "http")]
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::json;
use crate::object::RemoteObject;
use crate::transport::{Method, Request, Transport, TransportStats};
use crate::version::ServerVersion;

pub struct Session {
    transport: Box<dyn Transport>,
    buffer: GrowableBuffer,
    domain: Option<String>,
    root: Option<RemoteObject>,
    version: ServerVersion,
}

impl Session {
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Session {
            transport: Box::new(transport),
            buffer: GrowableBuffer::new(),
            domain: None,
            root: None,
            version: ServerVersion::UNKNOWN_LATEST,
        }
    }

    /// HTTP session for `config`; the configured domain becomes current.
    #[cfg(feature = "http")]
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let transport = crate::transport::HttpTransport::new(config)?;
        let mut session = Session::new(transport);
        session.domain = config.domain.clone();
        Ok(session)
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Switching domains forgets the cached root group.
    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = Some(domain.into());
        self.root = None;
    }

    /// Root group of the current domain, once [`open_domain`](Self::open_domain) ran.
    pub fn root(&self) -> Option<&RemoteObject> {
        self.root.as_ref()
    }

    pub fn server_version(&self) -> ServerVersion {
        self.version
    }

    pub fn set_server_version(&mut self, version: ServerVersion) {
        self.version = version;
    }

    pub fn transport_stats(&self) -> TransportStats {
        self.transport.stats()
    }

    // ------------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------------

    /// Run one request and classify its status.
    ///
    /// The buffer is reset first; on success it holds the response body.
    fn execute(&mut self, method: Method, endpoint: &str, body: Option<&[u8]>) -> Result<u16> {
        self.buffer.reset();
        let mut request = Request::new(method, endpoint).with_domain(self.domain.as_deref());
        if let Some(body) = body {
            request = request.with_body(body);
        }
        let status = self.transport.execute(&request, &mut self.buffer)?;
        match status {
            200..=299 => Ok(status),
            404 => Err(Error::NotFound(endpoint.to_string())),
            _ => {
                log::debug!(
                    "[session] {} {} -> {}: {}",
                    method,
                    endpoint,
                    status,
                    String::from_utf8_lossy(self.buffer.as_bytes())
                );
                Err(Error::Http {
                    status,
                    endpoint: endpoint.to_string(),
                })
            }
        }
    }

    fn body_json(&self) -> Result<Value> {
        if self.buffer.is_empty() {
            return Ok(Value::Null);
        }
        self.buffer.to_json()
    }

    /// GET and parse. 404 is [`Error::NotFound`].
    pub fn get(&mut self, endpoint: &str) -> Result<Value> {
        self.execute(Method::Get, endpoint, None)?;
        self.body_json()
    }

    /// GET and parse, mapping 404 to `None`.
    pub fn get_optional(&mut self, endpoint: &str) -> Result<Option<Value>> {
        match self.get(endpoint) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Raw response bytes of a GET (binary transfers).
    pub fn get_bytes(&mut self, endpoint: &str) -> Result<Vec<u8>> {
        self.execute(Method::Get, endpoint, None)?;
        Ok(self.buffer.to_vec())
    }

    pub fn put(&mut self, endpoint: &str, body: &Value) -> Result<Value> {
        let bytes = serde_json::to_vec(body)?;
        self.execute(Method::Put, endpoint, Some(&bytes))?;
        self.body_json()
    }

    pub fn post(&mut self, endpoint: &str, body: &Value) -> Result<Value> {
        let bytes = serde_json::to_vec(body)?;
        self.execute(Method::Post, endpoint, Some(&bytes))?;
        self.body_json()
    }

    pub fn delete(&mut self, endpoint: &str) -> Result<()> {
        self.execute(Method::Delete, endpoint, None).map(|_| ())
    }

    // ------------------------------------------------------------------------
    // Domain
    // ------------------------------------------------------------------------

    /// Make `domain` current and return its root group.
    ///
    /// Also records the server version when `/about` reports one.
    pub fn open_domain(&mut self, domain: &str) -> Result<RemoteObject> {
        self.set_domain(domain);
        let resp = self.get("/")?;
        let root = json::require_str(&resp, &["root"])?.to_string();
        log::debug!("[session] opened domain {} (root {})", domain, root);
        let root = RemoteObject::group(root);
        self.root = Some(root.clone());

        match self.fetch_server_version() {
            Ok(Some(v)) => self.version = v,
            Ok(None) => {}
            Err(e) => log::warn!("[session] server version unavailable: {}", e),
        }
        Ok(root)
    }

    /// Ask `/about` for the server version.
    pub fn fetch_server_version(&mut self) -> Result<Option<ServerVersion>> {
        let Some(about) = self.get_optional("/about")? else {
            return Ok(None);
        };
        match json::get_any(&about, &[&["hsds_version"], &["version"]]).and_then(Value::as_str) {
            Some(text) => text.parse().map(Some),
            None => Ok(None),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("domain", &self.domain)
            .field("root", &self.root)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
