// crates/authz-bridge-plugin/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: In-memory broker host and stub authorization service.
// Purpose: Run the plugin end to end without a real broker.
// Dependencies: authz-bridge-plugin, tiny_http
// ============================================================================

//! ## Overview
//! [`MockHost`] stores registered callbacks with their state and dispatches
//! events through them the way a broker would. [`StubService`] is a
//! `tiny_http` server on `127.0.0.1:0` that records requests.

#![allow(dead_code, reason = "Common module may have unused helpers.")]
#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use authz_bridge_core::AclCheckEvent;
use authz_bridge_core::BasicAuthEvent;
use authz_bridge_core::ClientSession;
use authz_bridge_core::EventKind;
use authz_bridge_core::HostSignal;
use authz_bridge_core::RegistrationError;
use authz_bridge_plugin::EventCallback;
use authz_bridge_plugin::HandlerState;
use authz_bridge_plugin::PluginId;
use authz_bridge_plugin::PluginRegistrar;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Mock Host
// ============================================================================

/// Broker stand-in holding at most one callback per event type.
#[derive(Default)]
pub struct MockHost {
    /// Registered callbacks keyed by event type.
    slots: Mutex<BTreeMap<EventKind, (PluginId, EventCallback, Arc<HandlerState>)>>,
}

impl MockHost {
    /// Returns the registered event types.
    pub fn registered(&self) -> Vec<EventKind> {
        self.slots.lock().unwrap().keys().copied().collect()
    }

    /// Dispatches a `basic-auth` event, or `None` when nothing is registered.
    pub fn basic_auth(
        &self,
        session: &dyn ClientSession,
        username: Option<&str>,
        password: Option<&[u8]>,
    ) -> Option<HostSignal> {
        let (callback, state) = self.slot(EventKind::BasicAuth)?;
        let EventCallback::BasicAuth(handler) = callback else {
            panic!("basic-auth slot holds the wrong callback");
        };
        let event = BasicAuthEvent {
            client: Some(session),
            username,
            password,
        };
        Some(handler(Some(&event), Some(&state)))
    }

    /// Dispatches an `acl-check` event, or `None` when nothing is registered.
    pub fn acl_check(
        &self,
        session: &dyn ClientSession,
        topic: Option<&str>,
        access: i32,
    ) -> Option<HostSignal> {
        let (callback, state) = self.slot(EventKind::AclCheck)?;
        let EventCallback::AclCheck(handler) = callback else {
            panic!("acl-check slot holds the wrong callback");
        };
        let event = AclCheckEvent {
            client: Some(session),
            topic,
            access,
        };
        Some(handler(Some(&event), Some(&state)))
    }

    /// Clones the callback and state registered for `event`.
    fn slot(&self, event: EventKind) -> Option<(EventCallback, Arc<HandlerState>)> {
        let slots = self.slots.lock().unwrap();
        slots.get(&event).map(|(_, callback, state)| (*callback, Arc::clone(state)))
    }
}

impl PluginRegistrar for MockHost {
    fn register(
        &self,
        plugin: PluginId,
        callback: EventCallback,
        state: Arc<HandlerState>,
    ) -> Result<(), RegistrationError> {
        let mut slots = self.slots.lock().unwrap();
        let event = callback.kind();
        if slots.contains_key(&event) {
            return Err(RegistrationError::AlreadyExists);
        }
        slots.insert(event, (plugin, callback, state));
        Ok(())
    }

    fn unregister(
        &self,
        plugin: PluginId,
        callback: EventCallback,
    ) -> Result<(), RegistrationError> {
        let mut slots = self.slots.lock().unwrap();
        match slots.get(&callback.kind()) {
            Some((owner, _, _)) if *owner == plugin => {
                slots.remove(&callback.kind());
                Ok(())
            }
            _ => Err(RegistrationError::Other(-1)),
        }
    }
}

/// Connected broker client.
pub struct Session {
    /// Client identifier.
    pub client_id: Option<String>,
    /// Authenticated username.
    pub username: Option<String>,
}

impl Session {
    /// Creates a session with both fields present.
    pub fn new(client_id: &str, username: &str) -> Self {
        Self {
            client_id: Some(client_id.to_string()),
            username: Some(username.to_string()),
        }
    }
}

impl ClientSession for Session {
    fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

// ============================================================================
// SECTION: Stub Service
// ============================================================================

/// Request observed by a stub service.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// Request path.
    pub path: String,
    /// Authorization header, if any.
    pub authorization: Option<String>,
    /// Parsed JSON body.
    pub body: serde_json::Value,
}

/// Stub authorization service answering every request with one status.
pub struct StubService {
    /// Base URL of the stub.
    pub base_url: String,
    /// Receives captured requests from the server thread.
    captured: mpsc::Receiver<CapturedRequest>,
    /// Server thread handle.
    handle: thread::JoinHandle<()>,
}

impl StubService {
    /// Starts a stub that answers up to `max_requests` requests with `status`.
    pub fn start(status: u16, max_requests: usize) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, captured) = mpsc::channel();
        let handle = thread::spawn(move || {
            for _ in 0..max_requests {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_secs(10)) else {
                    break;
                };
                let mut body = Vec::new();
                request.as_reader().read_to_end(&mut body).unwrap();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.as_str().to_string());
                let _ = tx.send(CapturedRequest {
                    path: request.url().to_string(),
                    authorization,
                    body: serde_json::from_slice(&body).unwrap(),
                });
                let _ = request.respond(Response::empty(status));
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            captured,
            handle,
        }
    }

    /// Returns a URL on the stub for the given path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Waits for the server thread and returns every captured request.
    pub fn finish(self) -> Vec<CapturedRequest> {
        self.handle.join().unwrap();
        self.captured.try_iter().collect()
    }
}
