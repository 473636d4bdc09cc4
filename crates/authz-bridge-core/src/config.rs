// crates/authz-bridge-core/src/config.rs
// ============================================================================
// Module: Bridge Configuration
// Description: Destination endpoints and decision client settings.
// Purpose: Parse host option lists and TOML files into validated configuration.
// Dependencies: serde, thiserror, toml, tracing, url
// ============================================================================

//! ## Overview
//! Configuration is built once, either from the ordered key/value option list
//! the broker hands to the plugin at load time ([`BridgeConfig::from_options`])
//! or from a TOML file ([`BridgeConfig::load`]). Both paths go through
//! [`BridgeSettings`] and the same validation.
//! Invariants:
//! - A [`BridgeConfig`] is immutable once built.
//! - Endpoints are absolute `http` or `https` URLs; a value without a scheme
//!   is read as `http`.
//! - An absent or unusable endpoint disables its check type, which then
//!   always denies. Bad option values are logged, never reported to the host.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::decision::CheckKind;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Option key holding the authentication destination.
pub const USER_AUTH_URL_KEY: &str = "user_auth_url";
/// Option key holding the access-check destination.
pub const ACL_AUTH_URL_KEY: &str = "acl_auth_url";
/// Option key overriding the request timeout in milliseconds.
pub const HTTP_TIMEOUT_MS_KEY: &str = "http_timeout_ms";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Maximum accepted request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 60_000;
/// Scheme assumed for endpoint values that do not name one.
const DEFAULT_SCHEME: &str = "http";
/// Fixed user agent sent with every decision request.
pub const DEFAULT_USER_AGENT: &str = "mosquitto-client";
/// Maximum accepted configuration file size in bytes.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint value is not a usable URL.
    #[error("invalid {key}: {reason}")]
    InvalidEndpoint {
        /// Option key the value came from.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// Config file could not be read.
    #[error("config file read failed: {0}")]
    Io(String),
    /// Config file exceeds [`MAX_CONFIG_FILE_BYTES`].
    #[error("config file exceeds size limit")]
    TooLarge,
    /// Config file is not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// Config file is not valid TOML for [`BridgeSettings`].
    #[error("config file parse failed: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Validated destination URL for decision requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Parses and validates an endpoint URL.
    ///
    /// A value without `://` is treated as `http://<value>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] for unparsable URLs, schemes other
    /// than `http`/`https`, or URLs without a host.
    pub fn parse(key: &'static str, raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let url = if raw.contains("://") {
            Url::parse(raw)
        } else {
            Url::parse(&format!("{DEFAULT_SCHEME}://{raw}"))
        };
        let url = url.map_err(|err| ConfigError::InvalidEndpoint {
            key,
            reason: err.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                key,
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidEndpoint {
                key,
                reason: "missing host".to_string(),
            });
        }
        Ok(Self(url))
    }

    /// Returns the URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

// ============================================================================
// SECTION: Decision Client Settings
// ============================================================================

/// Settings for the outbound decision client.
///
/// # Invariants
/// - `timeout` bounds the full request lifecycle and is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for DecisionClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Raw Settings
// ============================================================================

/// One key/value pair from the host's plugin option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOption {
    /// Option key.
    pub key: String,
    /// Option value.
    pub value: String,
}

impl PluginOption {
    /// Creates an option pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Unvalidated settings as they appear in an option list or TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeSettings {
    /// Destination for authentication checks.
    pub user_auth_url: Option<String>,
    /// Destination for access checks.
    pub acl_auth_url: Option<String>,
    /// Request timeout override in milliseconds.
    pub http_timeout_ms: Option<u64>,
}

impl BridgeSettings {
    /// Collects settings from an ordered option list.
    ///
    /// Unknown keys are ignored. A repeated key replaces the earlier value. A
    /// non-integer `http_timeout_ms` is logged and ignored.
    #[must_use]
    pub fn from_options(options: &[PluginOption]) -> Self {
        let mut settings = Self::default();
        for option in options {
            match option.key.as_str() {
                USER_AUTH_URL_KEY => settings.user_auth_url = Some(option.value.clone()),
                ACL_AUTH_URL_KEY => settings.acl_auth_url = Some(option.value.clone()),
                HTTP_TIMEOUT_MS_KEY => match option.value.trim().parse::<u64>() {
                    Ok(millis) => settings.http_timeout_ms = Some(millis),
                    Err(err) => {
                        tracing::error!(
                            key = HTTP_TIMEOUT_MS_KEY,
                            error = %err,
                            "ignoring non-integer timeout"
                        );
                    }
                },
                other => tracing::debug!(key = other, "ignoring unrecognized plugin option"),
            }
        }
        settings
    }

    /// Reads settings from a TOML file without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds
    /// [`MAX_CONFIG_FILE_BYTES`], is not UTF-8, or fails to parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let mut bytes = Vec::new();
        file.take(MAX_CONFIG_FILE_BYTES.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| ConfigError::Io(err.to_string()))?;
        let len = u64::try_from(bytes.len()).map_err(|_| ConfigError::TooLarge)?;
        if len > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge);
        }
        let text = std::str::from_utf8(&bytes).map_err(|_| ConfigError::NotUtf8)?;
        Self::from_toml_str(text)
    }

    /// Parses settings from TOML text without validating them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for
    /// these settings.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

// ============================================================================
// SECTION: Bridge Configuration
// ============================================================================

/// Validated, immutable bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeConfig {
    /// Destination for authentication checks.
    pub auth_endpoint: Option<Endpoint>,
    /// Destination for access checks.
    pub acl_endpoint: Option<Endpoint>,
    /// Outbound client settings.
    pub client: DecisionClientConfig,
}

impl BridgeConfig {
    /// Builds configuration from the host's ordered option list.
    #[must_use]
    pub fn from_options(options: &[PluginOption]) -> Self {
        Self::from(BridgeSettings::from_options(options))
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::from(BridgeSettings::load(path)?))
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text fails to parse.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(Self::from(BridgeSettings::from_toml_str(text)?))
    }

    /// Returns the endpoint configured for the given check kind.
    #[must_use]
    pub const fn endpoint(&self, kind: CheckKind) -> Option<&Endpoint> {
        match kind {
            CheckKind::Auth => self.auth_endpoint.as_ref(),
            CheckKind::Acl => self.acl_endpoint.as_ref(),
        }
    }
}

impl From<BridgeSettings> for BridgeConfig {
    fn from(settings: BridgeSettings) -> Self {
        let mut client = DecisionClientConfig::default();
        match settings.http_timeout_ms {
            Some(millis) if (1..=MAX_TIMEOUT_MS).contains(&millis) => {
                client.timeout = Duration::from_millis(millis);
            }
            Some(millis) => tracing::error!(
                key = HTTP_TIMEOUT_MS_KEY,
                millis,
                max = MAX_TIMEOUT_MS,
                "timeout out of range; using default"
            ),
            None => {}
        }
        Self {
            auth_endpoint: resolve_endpoint(USER_AUTH_URL_KEY, settings.user_auth_url),
            acl_endpoint: resolve_endpoint(ACL_AUTH_URL_KEY, settings.acl_auth_url),
            client,
        }
    }
}

/// Resolves an optional endpoint value.
///
/// Blank and unusable values leave the endpoint unset so its checks deny.
fn resolve_endpoint(key: &'static str, raw: Option<String>) -> Option<Endpoint> {
    let value = raw?;
    if value.trim().is_empty() {
        tracing::warn!(key, "blank endpoint leaves checks denied");
        return None;
    }
    Endpoint::parse(key, &value)
        .inspect_err(|err| tracing::error!(error = %err, "unusable endpoint leaves checks denied"))
        .ok()
}
