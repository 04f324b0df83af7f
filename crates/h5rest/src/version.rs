// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Server API version and the feature gates keyed on it.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// `major.minor.patch` version reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        ServerVersion {
            major,
            minor,
            patch,
        }
    }

    /// Assumed when the server does not report a version.
    pub const UNKNOWN_LATEST: ServerVersion = ServerVersion::new(u32::MAX, 0, 0);

    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        *self >= ServerVersion::new(major, minor, patch)
    }

    pub fn supports_fill_value_encoding(&self) -> bool {
        self.at_least(0, 8, 1)
    }

    pub fn supports_storage_size(&self) -> bool {
        self.at_least(0, 8, 5)
    }

    pub fn supports_fixed_length_utf8(&self) -> bool {
        self.at_least(0, 8, 5)
    }

    pub fn supports_long_names(&self) -> bool {
        self.at_least(0, 8, 6)
    }

    pub fn supports_member_selection(&self) -> bool {
        self.at_least(0, 8, 6)
    }
}

impl FromStr for ServerVersion {
    type Err = Error;

    /// Accepts `0.8.6`, `0.8` and suffixed forms such as `0.9.0-beta`.
    fn from_str(s: &str) -> Result<Self> {
        let core = s.trim().trim_start_matches('v');
        let core = core
            .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        let mut parts = core.split('.');
        let mut next = |what: &str, required: bool| -> Result<u32> {
            match parts.next() {
                Some(p) => p.parse::<u32>().map_err(|_| {
                    Error::malformed(format!("invalid {} component in server version '{}'", what, s))
                }),
                None if required => Err(Error::malformed(format!(
                    "server version '{}' is missing its {} component",
                    s, what
                ))),
                None => Ok(0),
            }
        };

        let major = next("major", true)?;
        let minor = next("minor", true)?;
        let patch = next("patch", false)?;
        Ok(ServerVersion::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!("0.8.6".parse::<ServerVersion>().unwrap(), ServerVersion::new(0, 8, 6));
        assert_eq!("0.9".parse::<ServerVersion>().unwrap(), ServerVersion::new(0, 9, 0));
        assert_eq!(
            "v0.9.0-beta.2".parse::<ServerVersion>().unwrap(),
            ServerVersion::new(0, 9, 0)
        );
        assert!("latest".parse::<ServerVersion>().is_err());
        assert!("1".parse::<ServerVersion>().is_err());
    }

    #[test]
    fn test_feature_gates() {
        let old = ServerVersion::new(0, 8, 4);
        assert!(old.supports_fill_value_encoding());
        assert!(!old.supports_fixed_length_utf8());
        assert!(!old.supports_long_names());

        let new = ServerVersion::new(0, 8, 6);
        assert!(new.supports_fixed_length_utf8());
        assert!(new.supports_long_names());
        assert!(new.supports_member_selection());

        assert!(ServerVersion::new(1, 0, 0).supports_storage_size());
        assert!(ServerVersion::UNKNOWN_LATEST.supports_long_names());
    }

    #[test]
    fn test_display() {
        assert_eq!(ServerVersion::new(0, 8, 5).to_string(), "0.8.5");
    }
}
