// crates/authz-bridge-plugin/src/registration.rs
// ============================================================================
// Module: Callback Registration
// Description: Callback signatures and the host registration interface.
// Purpose: Let the lifecycle manager (un)register handlers with any host.
// Dependencies: authz-bridge-core
// ============================================================================

//! ## Overview
//! Hosts implement [`PluginRegistrar`] to accept event callbacks keyed by
//! [`EventKind`]. Each registration carries the shared [`HandlerState`] that
//! the host passes back into every callback invocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use authz_bridge_core::AclCheckEvent;
use authz_bridge_core::BasicAuthEvent;
use authz_bridge_core::EventKind;
use authz_bridge_core::HostSignal;
use authz_bridge_core::RegistrationError;

use crate::handlers::HandlerState;

// ============================================================================
// SECTION: Callback Types
// ============================================================================

/// Callback invoked for `basic-auth` events.
pub type BasicAuthCallback =
    fn(Option<&BasicAuthEvent<'_>>, Option<&HandlerState>) -> HostSignal;

/// Callback invoked for `acl-check` events.
pub type AclCheckCallback = fn(Option<&AclCheckEvent<'_>>, Option<&HandlerState>) -> HostSignal;

/// Event callback tagged with the event type it handles.
#[derive(Clone, Copy)]
pub enum EventCallback {
    /// Connection authentication callback.
    BasicAuth(BasicAuthCallback),
    /// Topic access-check callback.
    AclCheck(AclCheckCallback),
}

impl EventCallback {
    /// Returns the event type this callback is registered for.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::BasicAuth(_) => EventKind::BasicAuth,
            Self::AclCheck(_) => EventKind::AclCheck,
        }
    }
}

// ============================================================================
// SECTION: Host Registration
// ============================================================================

/// Opaque plugin identifier assigned by the host at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(pub u64);

/// Host-side callback registry.
pub trait PluginRegistrar {
    /// Registers `callback` for its event type on behalf of `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the host refuses the registration.
    fn register(
        &self,
        plugin: PluginId,
        callback: EventCallback,
        state: Arc<HandlerState>,
    ) -> Result<(), RegistrationError>;

    /// Removes a callback previously registered by `plugin`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the host cannot remove the callback.
    fn unregister(&self, plugin: PluginId, callback: EventCallback)
    -> Result<(), RegistrationError>;
}
