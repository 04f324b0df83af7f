// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Connection configuration.
//!
//! Sources, first match wins:
//!
//! 1. `HSDS_ENDPOINT` (plus `HSDS_USERNAME` / `HSDS_PASSWORD`) in the
//!    environment
//! 2. `~/.hscfg`, a `key = value` file with `hs_endpoint`, `hs_username`
//!    and `hs_password`
//!
//! A TOML file can also be loaded explicitly with
//! [`ConnectionConfig::from_file`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const ENV_ENDPOINT: &str = "HSDS_ENDPOINT";
pub const ENV_USERNAME: &str = "HSDS_USERNAME";
pub const ENV_PASSWORD: &str = "HSDS_PASSWORD";

/// Name of the per-user key/value file in the home directory.
pub const HSCFG_FILE_NAME: &str = ".hscfg";

/// Where to connect and as whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the server, e.g. `http://localhost:5101`.
    pub endpoint: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Domain (server-side file path) sent with every request.
    #[serde(default)]
    pub domain: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ConnectionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: None,
            password: None,
            domain: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the process environment. `Ok(None)` when no endpoint is set.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_env_with<F>(lookup: F) -> Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|e| !e.is_empty()) else {
            return Ok(None);
        };
        let mut config = Self::new(endpoint);
        config.username = lookup(ENV_USERNAME).filter(|v| !v.is_empty());
        config.password = lookup(ENV_PASSWORD).filter(|v| !v.is_empty());
        config.validate()?;
        Ok(Some(config))
    }

    /// Parse an `.hscfg` file.
    pub fn from_hscfg<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::parse_hscfg(&content)?;
        log::debug!("[config] loaded {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse `.hscfg` text. Lines starting with `#` are comments; keys and
    /// values are separated by spaces and/or `=`.
    pub fn parse_hscfg(content: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut username = None;
        let mut password = None;

        for line in content.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let mut tokens = line
                .split(|c: char| c == ' ' || c == '=' || c == '\t')
                .filter(|t| !t.is_empty());
            let (Some(key), value) = (tokens.next(), tokens.next()) else {
                continue;
            };
            let value = value.map(str::to_string);
            match key {
                "hs_endpoint" => endpoint = value,
                "hs_username" => username = value,
                "hs_password" => password = value,
                other => log::trace!("[config] ignoring key '{}'", other),
            }
        }

        let endpoint =
            endpoint.ok_or_else(|| Error::Config("no 'hs_endpoint' entry in configuration".into()))?;
        let config = Self {
            username,
            password,
            ..Self::new(endpoint)
        };
        config.validate()?;
        Ok(config)
    }

    /// Environment first, then `~/.hscfg`.
    pub fn load() -> Result<Self> {
        if let Some(config) = Self::from_env()? {
            log::debug!("[config] endpoint from {}", ENV_ENDPOINT);
            return Ok(config);
        }
        let path = hscfg_path().ok_or_else(|| {
            Error::Config(format!(
                "{} is not set and the home directory is unknown",
                ENV_ENDPOINT
            ))
        })?;
        if !path.exists() {
            return Err(Error::Config(format!(
                "{} is not set and {} does not exist",
                ENV_ENDPOINT,
                path.display()
            )));
        }
        Self::from_hscfg(path)
    }

    /// Parsed endpoint URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", self.endpoint, e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(Error::Config("endpoint is empty".into()));
        }
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "endpoint scheme '{}' is not http or https",
                url.scheme()
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

/// `$HOME/.hscfg` (or `%HOMEDRIVE%%HOMEPATH%\.hscfg` on Windows).
pub fn hscfg_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from).or_else(|| {
        let drive = std::env::var_os("HOMEDRIVE")?;
        let path = std::env::var_os("HOMEPATH")?;
        let mut home = PathBuf::from(drive);
        home.push(path);
        Some(home)
    })?;
    Some(home.join(HSCFG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_hscfg() {
        let text = "# HDF Server\nhs_endpoint = http://hsds.example:5101\nhs_username=alice\nhs_password = s3cret\nhs_ad_app_id = ignored\n";
        let config = ConnectionConfig::parse_hscfg(text).unwrap();
        assert_eq!(config.endpoint, "http://hsds.example:5101");
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.password.as_deref(), Some("s3cret"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_hscfg_without_endpoint() {
        let err = ConnectionConfig::parse_hscfg("hs_username = bob\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_ENDPOINT, "https://hsds.example"),
            (ENV_USERNAME, "carol"),
            (ENV_PASSWORD, ""),
        ]
        .into_iter()
        .collect();
        let config = ConnectionConfig::from_env_with(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap()
            .unwrap();
        assert_eq!(config.username.as_deref(), Some("carol"));
        assert_eq!(config.password, None);

        assert!(ConnectionConfig::from_env_with(|_| None).unwrap().is_none());
    }

    #[test]
    fn test_from_files() {
        let mut toml_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            toml_file,
            "endpoint = \"http://localhost:5101\"\ndomain = \"/home/test/data.h5\"\ntimeout_secs = 5"
        )
        .unwrap();
        let config = ConnectionConfig::from_file(toml_file.path()).unwrap();
        assert_eq!(config.domain.as_deref(), Some("/home/test/data.h5"));
        assert_eq!(config.timeout_secs, 5);

        let mut hscfg = tempfile::NamedTempFile::new().unwrap();
        writeln!(hscfg, "hs_endpoint = http://127.0.0.1:5101").unwrap();
        let config = ConnectionConfig::from_hscfg(hscfg.path()).unwrap();
        assert_eq!(config.base_url().unwrap().port(), Some(5101));
    }

    #[test]
    fn test_validate() {
        assert!(ConnectionConfig::new("").validate().is_err());
        assert!(ConnectionConfig::new("not a url").validate().is_err());
        assert!(ConnectionConfig::new("ftp://host").validate().is_err());
        assert!(ConnectionConfig::new("http://host:5101")
            .with_credentials("u", "p")
            .with_domain("/d.h5")
            .validate()
            .is_ok());
    }
}
