// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request/response transport.
//!
//! Every server round trip goes through a [`Transport`]:
//!
//! ```ignore
//! pub trait Transport: Send {
//!     fn execute(&mut self, request: &Request<'_>, response: &mut GrowableBuffer) -> Result<u16>;
//! }
//! ```
//!
//! # Implementations
//!
//! - `HttpTransport` - blocking HTTP client (feature `http`)
//! - `MemoryTransport` - scripted routes for tests and offline use

#[cfg(feature = "http")]
pub mod http;
pub mod memory;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use memory::MemoryTransport;

use std::fmt;

use crate::buffer::GrowableBuffer;
use crate::error::Result;

/// Header carrying the domain (server-side file path).
pub const DOMAIN_HEADER: &str = "X-Hdf-domain";

/// HTTP verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request. `endpoint` is the path plus query, relative to the base URL.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub method: Method,
    pub endpoint: &'a str,
    pub domain: Option<&'a str>,
    pub body: Option<&'a [u8]>,
}

impl<'a> Request<'a> {
    pub fn new(method: Method, endpoint: &'a str) -> Self {
        Request {
            method,
            endpoint,
            domain: None,
            body: None,
        }
    }

    pub fn get(endpoint: &'a str) -> Self {
        Request::new(Method::Get, endpoint)
    }

    pub fn with_domain(mut self, domain: Option<&'a str>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = Some(body);
        self
    }
}

/// Round-trip counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransportStats {
    pub requests: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Responses with a status outside 2xx.
    pub error_responses: u64,
}

impl TransportStats {
    pub(crate) fn record(&mut self, request: &Request<'_>, status: u16, received: usize) {
        self.requests += 1;
        self.bytes_sent += request.body.map_or(0, |b| b.len() as u64);
        self.bytes_received += received as u64;
        if !(200..300).contains(&status) {
            self.error_responses += 1;
        }
    }
}

/// Carries requests to the server.
pub trait Transport: Send {
    /// Perform one round trip.
    ///
    /// # Arguments
    /// * `request` - Method, endpoint, domain header and optional body
    /// * `response` - Receives the response body (appended)
    ///
    /// # Returns
    /// * `Ok(status)` for any HTTP answer, including 4xx/5xx
    /// * `Err` when no answer could be obtained
    fn execute(&mut self, request: &Request<'_>, response: &mut GrowableBuffer) -> Result<u16>;

    /// Round-trip counters.
    ///
    /// Default implementation returns empty statistics.
    fn stats(&self) -> TransportStats {
        TransportStats::default()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&mut self, request: &Request<'_>, response: &mut GrowableBuffer) -> Result<u16> {
        (**self).execute(request, response)
    }

    fn stats(&self) -> TransportStats {
        (**self).stats()
    }
}
