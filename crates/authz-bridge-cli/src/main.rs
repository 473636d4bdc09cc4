// crates/authz-bridge-cli/src/main.rs
// ============================================================================
// Module: Authz Bridge CLI Entry Point
// Description: Operator probe for the broker authorization bridge.
// Purpose: Run one authentication or access check against configured services.
// Dependencies: clap, authz-bridge-core, authz-bridge-http, authz-bridge-plugin,
//               thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! `authz-bridge` drives a single decision through the same handlers the
//! broker plugin registers, so operators can verify endpoint wiring without a
//! broker. Output is `allow` or `deny`; the exit code is 0 on allow, 1 on deny,
//! and 2 on usage or configuration errors.
//! Security posture: arguments are untrusted and pass through the same
//! escaping and bounds as broker input. Passwords are never logged.


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use authz_bridge_core::AclCheckEvent;
use authz_bridge_core::BasicAuthEvent;
use authz_bridge_core::BridgeConfig;
use authz_bridge_core::BridgeSettings;
use authz_bridge_core::ClientSession;
use authz_bridge_core::ConfigError;
use authz_bridge_core::HostSignal;
use authz_bridge_http::ClientBuildError;
use authz_bridge_http::HttpDecisionClient;
use authz_bridge_plugin::HandlerState;
use authz_bridge_plugin::on_acl_check;
use authz_bridge_plugin::on_basic_auth;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "AUTHZ_BRIDGE_LOG";
/// Filter used when [`LOG_ENV`] is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";
/// Exit code reported for denied checks.
const EXIT_DENIED: u8 = 1;
/// Exit code reported for usage and configuration errors.
const EXIT_ERROR: u8 = 2;

// ============================================================================
// SECTION: CLI Arguments
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "authz-bridge", version, disable_help_subcommand = true)]
struct Cli {
    /// Endpoint and client settings.
    #[command(flatten)]
    endpoints: EndpointArgs,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by every check.
#[derive(Args, Debug, Default)]
struct EndpointArgs {
    /// TOML file with `user_auth_url`, `acl_auth_url`, and `http_timeout_ms`.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Authentication service URL (overrides the config file).
    #[arg(long, value_name = "URL", global = true)]
    auth_url: Option<String>,
    /// Access-check service URL (overrides the config file).
    #[arg(long, value_name = "URL", global = true)]
    acl_url: Option<String>,
    /// Request timeout in milliseconds (overrides the config file).
    #[arg(long, value_name = "MS", global = true)]
    timeout_ms: Option<u64>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the authentication service whether a login is allowed.
    CheckAuth(CheckAuthCommand),
    /// Ask the access-check service whether a topic operation is allowed.
    CheckAcl(CheckAclCommand),
}

/// Arguments for `check-auth`.
#[derive(Args, Debug)]
struct CheckAuthCommand {
    /// Username presented by the client.
    #[arg(long)]
    username: Option<String>,
    /// Password presented by the client.
    #[arg(long)]
    password: Option<String>,
    /// Client identifier.
    #[arg(long)]
    client_id: Option<String>,
}

/// Arguments for `check-acl`.
#[derive(Args, Debug)]
struct CheckAclCommand {
    /// Authenticated username of the session.
    #[arg(long)]
    username: Option<String>,
    /// Client identifier of the session.
    #[arg(long)]
    client_id: Option<String>,
    /// Topic being accessed.
    #[arg(long)]
    topic: Option<String>,
    /// Broker access code (for example 1 = read, 2 = write, 4 = subscribe).
    #[arg(long, allow_negative_numbers = true)]
    access: i32,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that stop the CLI before a decision is made.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Session
// ============================================================================

/// Client session assembled from command-line arguments.
struct ArgSession<'a> {
    /// Client identifier.
    client_id: Option<&'a str>,
    /// Session username.
    username: Option<&'a str>,
}

impl ClientSession for ArgSession<'_> {
    fn client_id(&self) -> Option<&str> {
        self.client_id
    }

    fn username(&self) -> Option<&str> {
        self.username
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Installs the stderr log subscriber.
fn init_logging() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolves configuration, runs the selected check, and reports the verdict.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = resolve_config(&cli.endpoints)?;
    let client = Arc::new(HttpDecisionClient::new(&config.client)?);
    let state = HandlerState::new(config, client);
    let signal = match &cli.command {
        Commands::CheckAuth(command) => check_auth(&state, command),
        Commands::CheckAcl(command) => check_acl(&state, command),
    };
    report(signal)
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Merges the optional config file with command-line overrides.
fn resolve_config(args: &EndpointArgs) -> CliResult<BridgeConfig> {
    let mut settings = match &args.config {
        Some(path) => {
            let settings = BridgeSettings::load(path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            settings
        }
        None => BridgeSettings::default(),
    };
    if let Some(url) = &args.auth_url {
        settings.user_auth_url = Some(url.clone());
    }
    if let Some(url) = &args.acl_url {
        settings.acl_auth_url = Some(url.clone());
    }
    if let Some(millis) = args.timeout_ms {
        settings.http_timeout_ms = Some(millis);
    }
    Ok(BridgeConfig::from(settings))
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Runs `check-auth` through the basic-auth handler.
fn check_auth(state: &HandlerState, command: &CheckAuthCommand) -> HostSignal {
    let session = ArgSession {
        client_id: command.client_id.as_deref(),
        username: command.username.as_deref(),
    };
    let event = BasicAuthEvent {
        client: Some(&session),
        username: command.username.as_deref(),
        password: command.password.as_deref().map(str::as_bytes),
    };
    on_basic_auth(Some(&event), Some(state))
}

/// Runs `check-acl` through the acl-check handler.
fn check_acl(state: &HandlerState, command: &CheckAclCommand) -> HostSignal {
    let session = ArgSession {
        client_id: command.client_id.as_deref(),
        username: command.username.as_deref(),
    };
    let event = AclCheckEvent {
        client: Some(&session),
        topic: command.topic.as_deref(),
        access: command.access,
    };
    on_acl_check(Some(&event), Some(state))
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Maps a host signal to its printed label and exit code.
const fn verdict_output(signal: HostSignal) -> (&'static str, u8) {
    match signal {
        HostSignal::Success => ("allow", 0),
        HostSignal::AuthDenied | HostSignal::AclDenied => ("deny", EXIT_DENIED),
    }
}

/// Prints the verdict and returns the matching exit code.
fn report(signal: HostSignal) -> CliResult<ExitCode> {
    let (label, code) = verdict_output(signal);
    write_stdout_line(label)?;
    Ok(ExitCode::from(code))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns the error exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_ERROR)
}
