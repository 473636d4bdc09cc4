// crates/authz-bridge-http/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Stub authorization services for decision client tests.
// Purpose: Capture outbound decision requests and answer with fixed statuses.
// Dependencies: tiny_http
// ============================================================================

//! ## Overview
//! Provides a `tiny_http` stub service bound to `127.0.0.1:0` that records every
//! request it receives, plus raw TCP helpers for refused and stalled peers.

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

use std::net::SocketAddr;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Captured Requests
// ============================================================================

/// Request observed by a stub service.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw request body.
    pub body: Vec<u8>,
}

impl CapturedRequest {
    /// Returns the first header matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

// ============================================================================
// SECTION: Stub Service
// ============================================================================

/// Stub authorization service answering every request with one status.
pub struct StubService {
    /// Base URL of the stub, e.g. `http://127.0.0.1:1234`.
    pub base_url: String,
    /// Receives captured requests from the server thread.
    captured: mpsc::Receiver<CapturedRequest>,
    /// Server thread handle.
    handle: thread::JoinHandle<()>,
}

impl StubService {
    /// Starts a stub that answers up to `max_requests` requests with `status`.
    pub fn start(status: u16, max_requests: usize) -> Self {
        Self::start_with(max_requests, move || Response::empty(status).boxed())
    }

    /// Starts a stub that answers with responses produced by `respond`.
    pub fn start_with<F>(max_requests: usize, respond: F) -> Self
    where
        F: Fn() -> tiny_http::ResponseBox + Send + 'static,
    {
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
                let headers = request
                    .headers()
                    .iter()
                    .map(|header| {
                        let field = header.field.as_str().as_str().to_string();
                        (field, header.value.as_str().to_string())
                    })
                    .collect();
                let captured = CapturedRequest {
                    method: request.method().to_string(),
                    path: request.url().to_string(),
                    headers,
                    body,
                };
                let _ = tx.send(captured);
                let _ = request.respond(respond());
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

/// Builds a redirect response pointing at `location`.
pub fn redirect_response(location: &str) -> tiny_http::ResponseBox {
    let header = Header::from_bytes(&b"Location"[..], location.as_bytes()).unwrap();
    Response::empty(302).with_header(header).boxed()
}

// ============================================================================
// SECTION: Raw Peers
// ============================================================================

/// Returns an address that refuses connections.
pub fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Accepts one connection and holds it open without answering for `stall`.
pub fn stalled_peer(stall: Duration) -> (SocketAddr, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            thread::sleep(stall);
            drop(stream);
        }
    });
    (addr, handle)
}
