// crates/authz-bridge-core/src/host.rs
// ============================================================================
// Module: Broker Host Contract
// Description: Event records, client accessors, and host return signals.
// Purpose: Describe the narrow surface through which the broker host is consumed.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The broker host raises two event kinds, each identified by a stable string:
//! `basic-auth` for connection authentication and `acl-check` for topic access.
//! Event records borrow host-owned data for the duration of one callback and
//! expose the client session through [`ClientSession`] accessors.
//! Invariants:
//! - Records may be missing fields; consumers must fail closed on absence.
//! - Nothing here retains host data beyond the callback.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

// ============================================================================
// SECTION: Event Kinds
// ============================================================================

/// Host event types the bridge subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    /// Connection authentication with username and password.
    BasicAuth,
    /// Topic access check.
    AclCheck,
}

impl EventKind {
    /// Returns the host's identifier for the event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasicAuth => "basic-auth",
            Self::AclCheck => "acl-check",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Host Signals
// ============================================================================

/// Value returned to the host from an event callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    /// The host should let the operation proceed.
    Success,
    /// The connection must be refused as unauthenticated.
    AuthDenied,
    /// The topic access must be refused.
    AclDenied,
}

// ============================================================================
// SECTION: Event Records
// ============================================================================

/// Host accessors for the client session behind an event.
pub trait ClientSession {
    /// Returns the client identifier, if the session has one.
    fn client_id(&self) -> Option<&str>;

    /// Returns the username bound to the session, if any.
    fn username(&self) -> Option<&str>;
}

/// Connection authentication event.
#[derive(Clone, Copy, Default)]
pub struct BasicAuthEvent<'a> {
    /// Client session raising the event.
    pub client: Option<&'a dyn ClientSession>,
    /// Username presented in the connect packet.
    pub username: Option<&'a str>,
    /// Password presented in the connect packet.
    pub password: Option<&'a [u8]>,
}

/// Topic access-check event.
#[derive(Clone, Copy, Default)]
pub struct AclCheckEvent<'a> {
    /// Client session raising the event.
    pub client: Option<&'a dyn ClientSession>,
    /// Topic being accessed.
    pub topic: Option<&'a str>,
    /// Host access code (read, write, subscribe, ...), passed through as-is.
    pub access: i32,
}

// ============================================================================
// SECTION: Registration Errors
// ============================================================================

/// Failures the host reports when (un)registering event callbacks.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// A callback for this plugin and event is already registered.
    #[error("plugin can only be loaded once")]
    AlreadyExists,
    /// The host could not allocate the registration.
    #[error("out of memory")]
    OutOfMemory,
    /// Any other host error code.
    #[error("unexpected host error {0}")]
    Other(i32),
}
