// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Blocking HTTP transport.

use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use super::{Method, Request, Transport, TransportStats, DOMAIN_HEADER};
use crate::buffer::GrowableBuffer;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};

/// Talks to a server over HTTP with optional basic credentials.
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    username: Option<String>,
    password: Option<String>,
    stats: TransportStats,
}

impl HttpTransport {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("h5rest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("cannot build HTTP client: {}", e)))?;

        log::debug!("[http] endpoint {}", config.endpoint);
        Ok(HttpTransport {
            client,
            base_url: config.base_url()?,
            username: config.username.clone(),
            password: config.password.clone(),
            stats: TransportStats::default(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoints are appended to the base URL, keeping any base path.
    fn url_for(&self, endpoint: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, endpoint))
            .map_err(|e| Error::Transport(format!("bad endpoint '{}': {}", endpoint, e)))
    }
}

impl Transport for HttpTransport {
    fn execute(&mut self, request: &Request<'_>, response: &mut GrowableBuffer) -> Result<u16> {
        let url = self.url_for(request.endpoint)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Put => self.client.put(url),
            Method::Post => self.client.post(url),
            Method::Delete => self.client.delete(url),
        };

        if let Some(domain) = request.domain {
            builder = builder.header(DOMAIN_HEADER, domain);
        }
        if let Some(user) = self.username.as_deref() {
            builder = builder.basic_auth(user, self.password.as_deref());
        }
        if let Some(body) = request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        log::trace!("[http] {} {}", request.method, request.endpoint);
        let resp = builder.send().map_err(|e| {
            Error::Transport(format!("{} {} failed: {}", request.method, request.endpoint, e))
        })?;
        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .map_err(|e| Error::Transport(format!("reading response body failed: {}", e)))?;
        response.extend_from_slice(&bytes)?;

        self.stats.record(request, status, bytes.len());
        log::debug!(
            "[http] {} {} -> {} ({} bytes)",
            request.method,
            request.endpoint,
            status,
            bytes.len()
        );
        Ok(status)
    }

    fn stats(&self) -> TransportStats {
        self.stats.clone()
    }
}
