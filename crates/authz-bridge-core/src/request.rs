// crates/authz-bridge-core/src/request.rs
// ============================================================================
// Module: Decision Request Builder
// Description: Bounded JSON bodies for authentication and access checks.
// Purpose: Serialize request fields in a fixed key order through the escaper.
// Dependencies: crate::escape, crate::decision
// ============================================================================

//! ## Overview
//! Two request shapes are supported, each with a fixed key order:
//! - [`AuthRequest`]: `{"username":"..","password":"..","client_id":".."}`
//! - [`AclRequest`]: `{"username":"..","client_id":"..","topic":"..","access":N}`
//!
//! Invariants:
//! - String fields always pass through [`escape_json_bytes`].
//! - A serialized body is strictly smaller than [`MAX_REQUEST_BODY_BYTES`];
//!   larger documents fail with [`DecisionError::BodyTooLarge`] and are never
//!   truncated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::decision::DecisionError;
use crate::escape::escape_json_bytes;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Upper bound (exclusive) on serialized request body size, in bytes.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024;

// ============================================================================
// SECTION: Request Body
// ============================================================================

/// Serialized JSON request body ready to be sent to the authorization service.
///
/// # Invariants
/// - Length is below [`MAX_REQUEST_BODY_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody(Vec<u8>);

impl RequestBody {
    /// Returns the serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the body is empty. Built bodies never are.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the body and returns the serialized bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Incremental writer for flat JSON objects with a fixed key order.
struct ObjectWriter {
    /// Serialized document so far.
    buf: Vec<u8>,
    /// Whether a field has been written yet.
    has_fields: bool,
}

impl ObjectWriter {
    /// Starts a new object.
    fn new() -> Self {
        let mut buf = Vec::with_capacity(128);
        buf.push(b'{');
        Self {
            buf,
            has_fields: false,
        }
    }

    /// Writes `"key":` with a leading separator when needed.
    fn key(&mut self, key: &str) {
        if self.has_fields {
            self.buf.push(b',');
        }
        self.has_fields = true;
        self.buf.push(b'"');
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.extend_from_slice(b"\":");
    }

    /// Writes an escaped string field. Absent values become empty strings.
    fn string(mut self, key: &str, value: Option<&[u8]>) -> Self {
        self.key(key);
        self.buf.push(b'"');
        self.buf.extend_from_slice(&escape_json_bytes(value));
        self.buf.push(b'"');
        self
    }

    /// Writes a decimal integer field.
    fn integer(mut self, key: &str, value: i32) -> Self {
        self.key(key);
        self.buf.extend_from_slice(value.to_string().as_bytes());
        self
    }

    /// Closes the object and enforces the size bound.
    fn finish(mut self) -> Result<RequestBody, DecisionError> {
        self.buf.push(b'}');
        if self.buf.len() >= MAX_REQUEST_BODY_BYTES {
            return Err(DecisionError::BodyTooLarge {
                size: self.buf.len(),
                limit: MAX_REQUEST_BODY_BYTES,
            });
        }
        Ok(RequestBody(self.buf))
    }
}

// ============================================================================
// SECTION: Request Shapes
// ============================================================================

/// Connection authentication request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuthRequest<'a> {
    /// Username presented by the connecting client.
    pub username: Option<&'a str>,
    /// Password presented by the connecting client (may be binary).
    pub password: Option<&'a [u8]>,
    /// Client identifier of the connecting client.
    pub client_id: Option<&'a str>,
}

impl AuthRequest<'_> {
    /// Serializes the request into a bounded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::BodyTooLarge`] when the escaped document would
    /// reach [`MAX_REQUEST_BODY_BYTES`].
    pub fn to_body(&self) -> Result<RequestBody, DecisionError> {
        ObjectWriter::new()
            .string("username", self.username.map(str::as_bytes))
            .string("password", self.password)
            .string("client_id", self.client_id.map(str::as_bytes))
            .finish()
    }
}

/// Topic access-check request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AclRequest<'a> {
    /// Username bound to the client session.
    pub username: Option<&'a str>,
    /// Client identifier bound to the client session.
    pub client_id: Option<&'a str>,
    /// Topic being accessed.
    pub topic: Option<&'a str>,
    /// Host access code, passed through uninterpreted.
    pub access: i32,
}

impl AclRequest<'_> {
    /// Serializes the request into a bounded JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError::BodyTooLarge`] when the escaped document would
    /// reach [`MAX_REQUEST_BODY_BYTES`].
    pub fn to_body(&self) -> Result<RequestBody, DecisionError> {
        ObjectWriter::new()
            .string("username", self.username.map(str::as_bytes))
            .string("client_id", self.client_id.map(str::as_bytes))
            .string("topic", self.topic.map(str::as_bytes))
            .integer("access", self.access)
            .finish()
    }
}

#[cfg(test)]
mod tests;
