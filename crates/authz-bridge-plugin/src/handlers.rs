// crates/authz-bridge-plugin/src/handlers.rs
// ============================================================================
// Module: Event Handlers
// Description: Authentication and access-check callbacks.
// Purpose: Turn host events into delegated decisions and host signals.
// Dependencies: authz-bridge-core, tracing
// ============================================================================

//! ## Overview
//! Both handlers follow the same path: guard the host-supplied references,
//! extract fields, return a denial immediately when no destination is
//! configured, otherwise build the request body and delegate to the decision
//! client. Any failure along the way denies.
//! Invariants:
//! - No HTTP call is attempted when the destination for a check is absent.
//! - Passwords never appear in logs.
//! - Handlers touch only immutable shared state and are safe to run
//!   concurrently from any number of host threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use authz_bridge_core::AclCheckEvent;
use authz_bridge_core::AclRequest;
use authz_bridge_core::AuthRequest;
use authz_bridge_core::BasicAuthEvent;
use authz_bridge_core::BridgeConfig;
use authz_bridge_core::CheckKind;
use authz_bridge_core::DecisionClient;
use authz_bridge_core::DecisionError;
use authz_bridge_core::DecisionRequest;
use authz_bridge_core::HostSignal;
use authz_bridge_core::RequestBody;
use authz_bridge_core::Verdict;

// ============================================================================
// SECTION: Handler State
// ============================================================================

/// Shared, read-only state handed to every callback invocation.
///
/// # Invariants
/// - Never mutated after construction.
pub struct HandlerState {
    /// Validated bridge configuration.
    config: BridgeConfig,
    /// Decision client shared across host threads.
    client: Arc<dyn DecisionClient>,
}

// Handler state is shared across host threads.
const _: () = {
    const fn require_send_sync<T: Send + Sync>() {}
    require_send_sync::<HandlerState>();
};

impl HandlerState {
    /// Creates handler state from configuration and a decision client.
    #[must_use]
    pub fn new(config: BridgeConfig, client: Arc<dyn DecisionClient>) -> Self {
        Self {
            config,
            client,
        }
    }

    /// Returns the bridge configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Decides an authentication request.
    #[must_use]
    pub fn authenticate(&self, request: &AuthRequest<'_>) -> Verdict {
        self.delegate(CheckKind::Auth, request.username, || request.to_body())
    }

    /// Decides an access-check request.
    #[must_use]
    pub fn check_access(&self, request: &AclRequest<'_>) -> Verdict {
        self.delegate(CheckKind::Acl, request.username, || request.to_body())
    }

    /// Resolves the destination, builds the body, and sends one decision request.
    fn delegate<F>(&self, kind: CheckKind, bearer: Option<&str>, build_body: F) -> Verdict
    where
        F: FnOnce() -> Result<RequestBody, DecisionError>,
    {
        let outcome = self
            .config
            .endpoint(kind)
            .ok_or(DecisionError::MissingEndpoint(kind))
            .and_then(|endpoint| {
                let body = build_body()?;
                self.client.send(&DecisionRequest {
                    kind,
                    endpoint,
                    bearer,
                    body: &body,
                })
            });
        Verdict::from_outcome(kind, outcome)
    }
}

// ============================================================================
// SECTION: Callbacks
// ============================================================================

/// Handles a `basic-auth` event.
#[must_use]
pub fn on_basic_auth(
    event: Option<&BasicAuthEvent<'_>>,
    state: Option<&HandlerState>,
) -> HostSignal {
    let (Some(event), Some(state)) = (event, state) else {
        tracing::error!("invalid parameters in basic auth callback");
        return HostSignal::AuthDenied;
    };
    let Some(client) = event.client else {
        tracing::error!("no client in auth event");
        return HostSignal::AuthDenied;
    };
    let request = AuthRequest {
        username: event.username,
        password: event.password,
        client_id: client.client_id(),
    };
    tracing::info!(
        client = request.client_id.unwrap_or("NULL"),
        username = request.username.unwrap_or("NULL"),
        "auth attempt"
    );
    match state.authenticate(&request) {
        Verdict::Allow => HostSignal::Success,
        Verdict::Deny => HostSignal::AuthDenied,
    }
}

/// Handles an `acl-check` event.
#[must_use]
pub fn on_acl_check(event: Option<&AclCheckEvent<'_>>, state: Option<&HandlerState>) -> HostSignal {
    let (Some(event), Some(state)) = (event, state) else {
        tracing::error!("invalid parameters in acl check callback");
        return HostSignal::AclDenied;
    };
    let Some(client) = event.client else {
        tracing::error!("no client in acl event");
        return HostSignal::AclDenied;
    };
    let request = AclRequest {
        username: client.username(),
        client_id: client.client_id(),
        topic: event.topic,
        access: event.access,
    };
    tracing::info!(
        client = request.client_id.unwrap_or("NULL"),
        username = request.username.unwrap_or("NULL"),
        topic = request.topic.unwrap_or("NULL"),
        access = request.access,
        "acl check"
    );
    match state.check_access(&request) {
        Verdict::Allow => HostSignal::Success,
        Verdict::Deny => HostSignal::AclDenied,
    }
}
