// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-memory transport with scripted routes.
//!
//! Routes are keyed by method and the exact endpoint string (path plus
//! query). Unscripted requests answer 404. Clones share routes and the
//! request log, so a test can keep a handle after moving one into a
//! session.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use super::{Method, Request, Transport, TransportStats};
use crate::buffer::GrowableBuffer;
use crate::error::Result;

/// A request as the transport saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub endpoint: String,
    pub domain: Option<String>,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<(Method, String), Route>,
    requests: Vec<RecordedRequest>,
    stats: TransportStats,
}

/// Scripted transport.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method endpoint` with `status` and `body`.
    pub fn route(&self, method: Method, endpoint: &str, status: u16, body: impl Into<Vec<u8>>) -> &Self {
        self.inner.lock().routes.insert(
            (method, endpoint.to_string()),
            Route {
                status,
                body: body.into(),
            },
        );
        self
    }

    /// Answer `GET endpoint` with 200 and `body`.
    pub fn get_json(&self, endpoint: &str, body: &Value) -> &Self {
        self.route(Method::Get, endpoint, 200, body.to_string())
    }

    /// Every request executed so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().requests.clone()
    }

    /// Number of executed requests whose endpoint equals `endpoint`.
    pub fn request_count(&self, endpoint: &str) -> usize {
        self.inner
            .lock()
            .requests
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().requests.clear();
    }
}

impl Transport for MemoryTransport {
    fn execute(&mut self, request: &Request<'_>, response: &mut GrowableBuffer) -> Result<u16> {
        let mut inner = self.inner.lock();
        inner.requests.push(RecordedRequest {
            method: request.method,
            endpoint: request.endpoint.to_string(),
            domain: request.domain.map(str::to_string),
            body: request.body.map(<[u8]>::to_vec),
        });

        let route = inner
            .routes
            .get(&(request.method, request.endpoint.to_string()))
            .cloned();
        let (status, body) = match route {
            Some(r) => (r.status, r.body),
            None => {
                log::trace!("[memory] no route for {} {}", request.method, request.endpoint);
                (404, br#"{"message": "not found"}"#.to_vec())
            }
        };
        response.extend_from_slice(&body)?;
        inner.stats.record(request, status, body.len());
        Ok(status)
    }

    fn stats(&self) -> TransportStats {
        self.inner.lock().stats.clone()
    }
}
