// crates/authz-bridge-plugin/src/lifecycle.rs
// ============================================================================
// Module: Plugin Lifecycle
// Description: Initialization, registration rollback, and teardown.
// Purpose: Install and remove the bridge without leaving partial registrations.
// Dependencies: authz-bridge-core, authz-bridge-http, thiserror, tracing
// ============================================================================

//! ## Overview
//! The lifecycle is `Uninitialized -> Registered -> Torn Down`. A value of
//! [`AuthzPlugin`] exists only in the `Registered` state: [`AuthzPlugin::init`]
//! produces it, and [`AuthzPlugin::teardown`] consumes it.
//! Invariants:
//! - `basic-auth` is registered before `acl-check`.
//! - If `acl-check` registration fails, `basic-auth` is unregistered before
//!   init reports failure.
//! - Configuration is dropped on every failure path and at teardown.
//! - Init and teardown are never run concurrently with each other or with
//!   dispatch; the host guarantees this.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use authz_bridge_core::BridgeConfig;
use authz_bridge_core::DecisionClient;
use authz_bridge_core::DecisionClientConfig;
use authz_bridge_core::EventKind;
use authz_bridge_core::PluginOption;
use authz_bridge_core::RegistrationError;
use authz_bridge_http::ClientBuildError;
use authz_bridge_http::HttpDecisionClient;
use thiserror::Error;

use crate::handlers::HandlerState;
use crate::handlers::on_acl_check;
use crate::handlers::on_basic_auth;
use crate::registration::EventCallback;
use crate::registration::PluginId;
use crate::registration::PluginRegistrar;

// ============================================================================
// SECTION: Version Negotiation
// ============================================================================

/// Host plugin API version implemented by the bridge.
pub const PLUGIN_API_VERSION: i32 = 5;

/// Picks the plugin API version to use from the versions the host supports.
#[must_use]
pub fn negotiate_version(supported: &[i32]) -> Option<i32> {
    supported.contains(&PLUGIN_API_VERSION).then_some(PLUGIN_API_VERSION)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort plugin initialization.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - No registration survives when any of these is returned.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Host supplied unusable initialization parameters.
    #[error("invalid initialization parameters: {0}")]
    InvalidParameters(&'static str),
    /// Decision client could not be created.
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    /// Host refused a callback registration.
    #[error("failed to register {event} callback: {source}")]
    Registration {
        /// Event whose registration failed.
        event: EventKind,
        /// Host-reported failure.
        source: RegistrationError,
    },
}

// ============================================================================
// SECTION: Plugin
// ============================================================================

/// The `basic-auth` registration entry.
const BASIC_AUTH: EventCallback = EventCallback::BasicAuth(on_basic_auth);
/// The `acl-check` registration entry.
const ACL_CHECK: EventCallback = EventCallback::AclCheck(on_acl_check);

/// A registered authorization bridge instance.
///
/// # Invariants
/// - Both callbacks are registered with the host for `id`.
/// - `state` is shared with the host registrations and never mutated.
pub struct AuthzPlugin {
    /// Identifier the host assigned at load time.
    id: PluginId,
    /// Shared handler state owning the configuration.
    state: Arc<HandlerState>,
}

impl AuthzPlugin {
    /// Initializes the bridge with the HTTP decision client.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when parameters are invalid, the HTTP client
    /// cannot be built, or the host refuses a registration. Bad option values
    /// never fail init; they leave the affected checks denying.
    pub fn init(
        host: &dyn PluginRegistrar,
        id: Option<PluginId>,
        options: &[PluginOption],
    ) -> Result<Self, LifecycleError> {
        Self::init_with(host, id, options, |config| {
            let client: Arc<dyn DecisionClient> = Arc::new(HttpDecisionClient::new(config)?);
            Ok(client)
        })
    }

    /// Initializes the bridge with a caller-supplied decision client factory.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError`] when parameters are invalid, the factory
    /// fails, or the host refuses a registration.
    pub fn init_with<F>(
        host: &dyn PluginRegistrar,
        id: Option<PluginId>,
        options: &[PluginOption],
        build_client: F,
    ) -> Result<Self, LifecycleError>
    where
        F: FnOnce(&DecisionClientConfig) -> Result<Arc<dyn DecisionClient>, LifecycleError>,
    {
        let Some(id) = id else {
            tracing::error!("invalid initialization parameters");
            return Err(LifecycleError::InvalidParameters("missing plugin identifier"));
        };
        let config = BridgeConfig::from_options(options);
        if config.auth_endpoint.is_none() && config.acl_endpoint.is_none() {
            tracing::warn!("no usable auth urls configured; every check will be denied");
        }
        let client = build_client(&config.client).inspect_err(|err| {
            tracing::error!(error = %err, "failed to create decision client");
        })?;
        let state = Arc::new(HandlerState::new(config, client));

        register(host, id, BASIC_AUTH, &state)?;
        if let Err(err) = register(host, id, ACL_CHECK, &state) {
            if let Err(rollback) = host.unregister(id, BASIC_AUTH) {
                tracing::error!(error = %rollback, "failed to roll back basic-auth registration");
            }
            return Err(err);
        }

        tracing::info!("authz bridge plugin initialized successfully");
        Ok(Self {
            id,
            state,
        })
    }

    /// Returns the host-assigned plugin identifier.
    #[must_use]
    pub const fn id(&self) -> PluginId {
        self.id
    }

    /// Returns the shared handler state.
    #[must_use]
    pub fn state(&self) -> &HandlerState {
        &self.state
    }

    /// Unregisters both callbacks and releases the configuration.
    ///
    /// Unregistration is best-effort: failures are logged and do not stop the
    /// remaining steps.
    pub fn teardown(self, host: &dyn PluginRegistrar) {
        for callback in [BASIC_AUTH, ACL_CHECK] {
            if let Err(err) = host.unregister(self.id, callback) {
                tracing::warn!(event = %callback.kind(), error = %err, "unregister failed");
            }
        }
        drop(self.state);
        tracing::info!("authz bridge plugin cleaned up");
    }

    /// Tears down the plugin held in `slot`, if any.
    ///
    /// Calling this on an empty slot is a no-op, so repeated cleanup is safe.
    pub fn cleanup(slot: &mut Option<Self>, host: &dyn PluginRegistrar) {
        if let Some(plugin) = slot.take() {
            plugin.teardown(host);
        }
    }
}

/// Registers one callback, logging host failures by kind.
fn register(
    host: &dyn PluginRegistrar,
    id: PluginId,
    callback: EventCallback,
    state: &Arc<HandlerState>,
) -> Result<(), LifecycleError> {
    let event = callback.kind();
    host.register(id, callback, Arc::clone(state)).map_err(|source| {
        match source {
            RegistrationError::AlreadyExists => {
                tracing::error!("authz bridge plugin can only be loaded once");
            }
            RegistrationError::OutOfMemory => tracing::error!("out of memory"),
            RegistrationError::Other(code) => {
                tracing::error!(%event, code, "unexpected error registering callback");
            }
        }
        LifecycleError::Registration {
            event,
            source,
        }
    })
}
