// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Growable byte buffer used for request bodies and response collection.
//!
//! The buffer always keeps one spare byte past its logical length so a
//! terminator can be appended without reallocating. Growth doubles the
//! capacity until the request fits; a reset keeps the allocation.

use std::io;

use crate::error::{Error, Result};

/// Initial capacity of a session's response buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Reallocation-on-demand byte accumulator.
#[derive(Debug, Clone)]
pub struct GrowableBuffer {
    data: Vec<u8>,
}

impl GrowableBuffer {
    /// Buffer with [`DEFAULT_BUFFER_CAPACITY`] bytes reserved.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Buffer with at least `capacity` bytes reserved (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        GrowableBuffer {
            data: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Logical length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reserved bytes; always at least `len() + 1`.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Drop the content, keep the allocation.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Append raw bytes, doubling the capacity as needed.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_room(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append UTF-8 text.
    pub fn push_str(&mut self, s: &str) -> Result<()> {
        self.extend_from_slice(s.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Content as UTF-8 text.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| Error::malformed(format!("response body is not UTF-8: {}", e)))
    }

    /// Parse the content as a JSON document.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        if self.data.is_empty() {
            return Err(Error::malformed("empty response body"));
        }
        Ok(serde_json::from_slice(&self.data)?)
    }

    /// Copy the content out so the buffer can be reused.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn ensure_room(&mut self, additional: usize) -> Result<()> {
        let needed = self
            .data
            .len()
            .checked_add(additional)
            .and_then(|n| n.checked_add(1))
            .ok_or(Error::AllocationFailure(usize::MAX))?;

        let mut target = self.data.capacity().max(1);
        while target < needed {
            target = target.checked_mul(2).unwrap_or(needed);
        }

        if target > self.data.capacity() {
            log::trace!(
                "[buffer] growing {} -> {} bytes",
                self.data.capacity(),
                target
            );
            self.data
                .try_reserve_exact(target - self.data.len())
                .map_err(|_| Error::AllocationFailure(target))?;
        }
        Ok(())
    }
}

impl Default for GrowableBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl io::Write for GrowableBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.extend_from_slice(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
