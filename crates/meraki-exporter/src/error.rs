//! CLI error types with miette diagnostics.
//!
//! Maps `ConfigError` and `CoreError` into user-facing errors with actionable
//! help text and a process exit code.

use std::net::SocketAddr;

use miette::Diagnostic;
use thiserror::Error;

use meraki_config::ConfigError;
use meraki_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Credentials ──────────────────────────────────────────────────

    #[error("No Dashboard API key configured")]
    #[diagnostic(
        code(meraki::no_credentials),
        help(
            "Pass --api-key, set MERAKI_API_KEY, or set api_key_env / api_key \
             in the config file."
        )
    )]
    NoCredentials,

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(meraki::auth_failed),
        help("Verify the API key under My Profile > API access in the Dashboard.")
    )]
    AuthFailed { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(meraki::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(meraki::config),
        help("Check the config file syntax and MERAKI_EXPORTER_* variables.")
    )]
    Config(Box<figment::Error>),

    #[error("Could not render configuration: {message}")]
    #[diagnostic(code(meraki::config_render))]
    Render { message: String },

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(meraki::bind),
        help("Another process may already use this address; pick another --port.")
    )]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not reach the Dashboard API: {reason}")]
    #[diagnostic(
        code(meraki::connection_failed),
        help("Check network access to the base URL and the ca_cert setting.")
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(meraki::timeout),
        help("Increase --timeout or --fetch-timeout.")
    )]
    Timeout { seconds: u64 },

    #[error("{message}")]
    #[diagnostic(code(meraki::core))]
    Core { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoCredentials | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::Config(_) => exit_code::USAGE,
            Self::Bind { .. } | Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Render { .. } | Self::Core { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials => CliError::NoCredentials,
            ConfigError::Serialization(e) => CliError::Render {
                message: e.to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other => CliError::Core {
                message: other.to_string(),
            },
        }
    }
}
