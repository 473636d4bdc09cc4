// crates/authz-bridge-core/src/decision.rs
// ============================================================================
// Module: Decision Contract
// Description: Verdicts, decision errors, and the decision client interface.
// Purpose: Reduce every delegated decision outcome to a fail-closed verdict.
// Dependencies: crate::config, crate::request, thiserror, tracing
// ============================================================================

//! ## Overview
//! A [`DecisionClient`] performs one outbound call per check and reports either
//! success (the service answered HTTP 200) or a [`DecisionError`]. The
//! reduction in [`Verdict::from_outcome`] is the single place where outcomes
//! become verdicts: only success allows, and every error kind denies after it
//! has been logged.
//! Invariants:
//! - Error detail is visible only through logging, never through the verdict.
//! - There is no retry and no caching of verdicts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;

use crate::config::Endpoint;
use crate::request::RequestBody;

// ============================================================================
// SECTION: Check Kinds
// ============================================================================

/// Kind of authorization check being delegated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckKind {
    /// Connection authentication.
    Auth,
    /// Topic access check.
    Acl,
}

impl CheckKind {
    /// Returns the stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Acl => "acl",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Binary outcome of one authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// The authorization service approved the check.
    Allow,
    /// The check was refused or could not be decided.
    Deny,
}

impl Verdict {
    /// Reduces a decision outcome to a verdict, logging any failure.
    #[must_use]
    pub fn from_outcome(kind: CheckKind, outcome: Result<(), DecisionError>) -> Self {
        match outcome {
            Ok(()) => Self::Allow,
            Err(err) => {
                tracing::error!(check = %kind, error_kind = err.kind(), "{err}");
                Self::Deny
            }
        }
    }

    /// Returns true for [`Verdict::Allow`].
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ============================================================================
// SECTION: Decision Errors
// ============================================================================

/// Reasons a delegated decision did not end in approval.
///
/// # Invariants
/// - Every variant reduces to [`Verdict::Deny`].
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// No destination is configured for this check type.
    #[error("no {0} url configured")]
    MissingEndpoint(CheckKind),
    /// Escaped request body reached the size limit.
    #[error("json body too large for request ({size} bytes, limit {limit})")]
    BodyTooLarge {
        /// Serialized size in bytes.
        size: usize,
        /// Exclusive size limit in bytes.
        limit: usize,
    },
    /// Authorization header could not be formed from the username.
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),
    /// Request could not be completed (DNS, connect, TLS, timeout).
    #[error("transport failure: {0}")]
    Transport(String),
    /// Authorization service answered with a status other than 200.
    #[error("auth service responded with http {status}")]
    Rejected {
        /// HTTP status code returned by the service.
        status: u16,
    },
}

impl DecisionError {
    /// Returns the error category label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingEndpoint(_) => "configuration",
            Self::BodyTooLarge {
                ..
            }
            | Self::InvalidHeader(_) => "protocol",
            Self::Transport(_) => "transport",
            Self::Rejected {
                ..
            } => "remote_rejection",
        }
    }
}

// ============================================================================
// SECTION: Decision Client
// ============================================================================

/// One delegated decision call.
///
/// # Invariants
/// - `body` was produced by the request builder and is already escaped.
/// - `bearer` is the raw username; it is sent as the bearer token verbatim.
#[derive(Debug, Clone, Copy)]
pub struct DecisionRequest<'a> {
    /// Kind of check, used for logging.
    pub kind: CheckKind,
    /// Destination of the decision request.
    pub endpoint: &'a Endpoint,
    /// Raw username used as the bearer token.
    pub bearer: Option<&'a str>,
    /// Serialized request body.
    pub body: &'a RequestBody,
}

/// Performs delegated authorization decisions.
///
/// Implementations are shared across host threads and must not hold mutable
/// state on the call path.
pub trait DecisionClient: Send + Sync {
    /// Sends one decision request.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] for any outcome other than an HTTP 200 answer.
    fn send(&self, request: &DecisionRequest<'_>) -> Result<(), DecisionError>;

    /// Sends one decision request and reduces the outcome to a verdict.
    fn decide(&self, request: &DecisionRequest<'_>) -> Verdict {
        Verdict::from_outcome(request.kind, self.send(request))
    }
}
