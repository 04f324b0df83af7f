// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the codecs, the resolver and the link engine.

use thiserror::Error;

/// Errors produced by the connector core.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================================================
    // Unsupported features
    // ========================================================================
    /// The datatype class (or a property of it) has no wire encoding.
    #[error("unsupported datatype: {0}")]
    UnsupportedType(String),

    /// The selection is not a regular hyperslab pattern.
    #[error("unsupported selection: {0}")]
    UnsupportedSelection(String),

    /// The value is valid but cannot be expressed in the requested form
    /// (for example a point selection as a URL parameter).
    #[error("unsupported in this context: {0}")]
    UnsupportedInContext(String),

    // ========================================================================
    // Wire data
    // ========================================================================
    /// JSON is missing a key, has the wrong kind, or a binary payload is
    /// malformed.
    #[error("malformed wire data: {0}")]
    MalformedWireData(String),

    /// The response body could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Resolution
    // ========================================================================
    /// The remote store reported that the object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An intermediate path segment could not be resolved.
    #[error("path error: {0}")]
    PathError(String),

    /// A user iteration callback returned a negative value.
    #[error("iteration callback failed with {0}")]
    CallbackError(i32),

    // ========================================================================
    // Transport
    // ========================================================================
    /// Non-success HTTP status other than 404.
    #[error("HTTP {status} from {endpoint}")]
    Http { status: u16, endpoint: String },

    /// The transport could not complete the round trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// A buffer could not grow.
    #[error("allocation failure: could not grow buffer to {0} bytes")]
    AllocationFailure(usize),

    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Caller passed an argument the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Error::MalformedWireData(msg.into())
    }

    pub(crate) fn unsupported_type(msg: impl Into<String>) -> Self {
        Error::UnsupportedType(msg.into())
    }

    /// True for a remote "does not exist" answer, which callers usually
    /// treat as a negative existence check rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// True for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Http { status, .. } if (500..600).contains(status))
    }
}

/// Result alias for connector operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(Error::NotFound("/groups/g-1".into()).is_not_found());
        assert!(!Error::PathError("a/b".into()).is_not_found());
    }

    #[test]
    fn test_server_error_classification() {
        let e = Error::Http {
            status: 503,
            endpoint: "/groups/g-1/links".into(),
        };
        assert!(e.is_server_error());
        assert_eq!(e.to_string(), "HTTP 503 from /groups/g-1/links");

        let e = Error::Http {
            status: 403,
            endpoint: "/".into(),
        };
        assert!(!e.is_server_error());
    }

    #[test]
    fn test_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::Json(_)));
    }
}
