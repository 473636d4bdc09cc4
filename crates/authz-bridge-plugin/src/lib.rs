// crates/authz-bridge-plugin/src/lib.rs
// ============================================================================
// Module: Authz Bridge Plugin
// Description: Broker event handlers and the plugin lifecycle manager.
// Purpose: Install the authorization bridge into a broker host and run checks.
// Dependencies: authz-bridge-core, authz-bridge-http, thiserror, tracing
// ============================================================================

//! ## Overview
//! The plugin crate wires the core request/decision pipeline into a broker
//! host. [`AuthzPlugin::init`] parses the host's option list, builds the HTTP
//! decision client, and registers [`on_basic_auth`] and [`on_acl_check`] with
//! the host through a [`PluginRegistrar`]. Registration is all-or-nothing.
//! Invariants:
//! - Handlers deny on any missing input, configuration, or failed decision.
//! - Shared handler state is immutable after init and lock-free to read.
//! - A partially registered plugin is never left behind.
//!
//! Security posture: broker client input is untrusted; the authorization
//! service is trusted only for its status code.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod handlers;
pub mod lifecycle;
pub mod registration;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use handlers::HandlerState;
pub use handlers::on_acl_check;
pub use handlers::on_basic_auth;
pub use lifecycle::AuthzPlugin;
pub use lifecycle::LifecycleError;
pub use lifecycle::PLUGIN_API_VERSION;
pub use lifecycle::negotiate_version;
pub use registration::AclCheckCallback;
pub use registration::BasicAuthCallback;
pub use registration::EventCallback;
pub use registration::PluginId;
pub use registration::PluginRegistrar;
