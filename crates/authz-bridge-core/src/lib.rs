// crates/authz-bridge-core/src/lib.rs
// ============================================================================
// Module: Authz Bridge Core
// Description: Request shapes, escaping, verdicts, and host-facing contracts.
// Purpose: Provide the backend-agnostic core of the broker authorization bridge.
// Dependencies: serde, thiserror, toml, tracing, url
// ============================================================================

//! ## Overview
//! The core crate defines everything the bridge needs that does not depend on a
//! concrete HTTP stack or broker host: the narrow JSON escaper, the bounded
//! request builder, the [`Verdict`] type and its fail-closed reduction, the
//! immutable [`BridgeConfig`], and the traits through which the host and the
//! decision client are consumed.
//! Invariants:
//! - Every request field passes through [`escape_json_bytes`] before it is
//!   embedded in a request body.
//! - Request bodies never reach [`MAX_REQUEST_BODY_BYTES`].
//! - Every error path reduces to [`Verdict::Deny`].
//!
//! Security posture: all event fields are untrusted broker client input.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod decision;
pub mod escape;
pub mod host;
pub mod request;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::BridgeConfig;
pub use config::BridgeSettings;
pub use config::ConfigError;
pub use config::DecisionClientConfig;
pub use config::Endpoint;
pub use config::PluginOption;
pub use decision::CheckKind;
pub use decision::DecisionClient;
pub use decision::DecisionError;
pub use decision::DecisionRequest;
pub use decision::Verdict;
pub use escape::escape_json_bytes;
pub use host::AclCheckEvent;
pub use host::BasicAuthEvent;
pub use host::ClientSession;
pub use host::EventKind;
pub use host::HostSignal;
pub use host::RegistrationError;
pub use request::AclRequest;
pub use request::AuthRequest;
pub use request::MAX_REQUEST_BODY_BYTES;
pub use request::RequestBody;
