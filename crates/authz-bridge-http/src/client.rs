// crates/authz-bridge-http/src/client.rs
// ============================================================================
// Module: HTTP Decision Client
// Description: reqwest-backed decision requests with a bounded timeout.
// Purpose: Map one HTTP exchange to a decision outcome.
// Dependencies: authz-bridge-core, reqwest, thiserror, tracing
// ============================================================================

//! ## Overview
//! The client is built once at plugin initialization and shared by every host
//! thread. `reqwest`'s blocking client is `Send + Sync` and enforces timeouts
//! without process signals, so a slow service can only block the calling
//! thread for the configured duration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use authz_bridge_core::DecisionClient;
use authz_bridge_core::DecisionClientConfig;
use authz_bridge_core::DecisionError;
use authz_bridge_core::DecisionRequest;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Upper bound (exclusive) on the full `Authorization: Bearer <username>`
/// header line, in bytes.
pub const MAX_AUTH_HEADER_BYTES: usize = 1024;

/// Header name and separator counted against [`MAX_AUTH_HEADER_BYTES`].
const AUTH_HEADER_PREFIX: &str = "Authorization: ";

/// Content type of every decision request body.
const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to construct the underlying HTTP client.
#[derive(Debug, Error)]
#[error("http client build failed: {0}")]
pub struct ClientBuildError(String);

// ============================================================================
// SECTION: Client
// ============================================================================

/// Decision client that delegates to an HTTP authorization service.
///
/// # Invariants
/// - The inner client never follows redirects.
/// - The inner client carries the configured timeout and user agent.
#[derive(Debug, Clone)]
pub struct HttpDecisionClient {
    /// Shared blocking HTTP client.
    client: Client,
}

impl HttpDecisionClient {
    /// Creates a client from decision client settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the TLS backend or client cannot be
    /// initialized.
    pub fn new(config: &DecisionClientConfig) -> Result<Self, ClientBuildError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| ClientBuildError(err.to_string()))?;
        Ok(Self {
            client,
        })
    }
}

impl DecisionClient for HttpDecisionClient {
    fn send(&self, request: &DecisionRequest<'_>) -> Result<(), DecisionError> {
        let authorization = bearer_header(request.bearer)?;
        let response = self
            .client
            .post(request.endpoint.as_str())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, authorization)
            .body(request.body.as_bytes().to_vec())
            .send()
            .map_err(|err| DecisionError::Transport(describe_transport_error(&err)))?;
        let status = response.status();
        tracing::debug!(
            check = %request.kind,
            endpoint = %request.endpoint,
            status = status.as_u16(),
            "authorization service answered"
        );
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(DecisionError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the `Authorization: Bearer <username>` header value.
fn bearer_header(username: Option<&str>) -> Result<HeaderValue, DecisionError> {
    let token = format!("Bearer {}", username.unwrap_or_default());
    if AUTH_HEADER_PREFIX.len() + token.len() >= MAX_AUTH_HEADER_BYTES {
        return Err(DecisionError::InvalidHeader("username too long for auth header".to_string()));
    }
    let mut value = HeaderValue::from_str(&token).map_err(|_| {
        DecisionError::InvalidHeader("username is not a valid header value".to_string())
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Classifies a transport error for logging.
fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connect failed: {err}")
    } else {
        err.to_string()
    }
}
