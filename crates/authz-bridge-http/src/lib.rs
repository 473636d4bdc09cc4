// crates/authz-bridge-http/src/lib.rs
// ============================================================================
// Module: Authz Bridge HTTP Client
// Description: Blocking HTTP implementation of the decision client.
// Purpose: Delegate authorization decisions to an external HTTP service.
// Dependencies: authz-bridge-core, reqwest, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`HttpDecisionClient`] sends one `POST` per check with a JSON body, a fixed
//! user agent and a bearer token carrying the raw username. Only HTTP 200
//! approves; every other status and every transport failure denies.
//! Invariants:
//! - Exactly one attempt per call; no retries.
//! - Redirects are not followed.
//! - The configured timeout bounds the full request lifecycle.
//! - Response bodies are never read.
//!
//! Security posture: the authorization service is trusted only for its status
//! code; usernames are untrusted and validated before use as header values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ClientBuildError;
pub use client::HttpDecisionClient;
pub use client::MAX_AUTH_HEADER_BYTES;
