//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use hassmirror_config::ConfigError;
use hassmirror_core::{CoreError, SetupErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the hub at {url}")]
    #[diagnostic(
        code(hassmirror::connection_failed),
        help(
            "Check that the hub is running and reachable.\n\
             If it serves plain http, pass --ssl false or set `ssl = false` in the profile."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Timed out fetching information from {url}")]
    #[diagnostic(
        code(hassmirror::timeout),
        help("Increase the timeout with --timeout or check the hub's responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(hassmirror::auth_failed),
        help(
            "The hub rejected the access token. Create a new long-lived token in\n\
             the hub's user profile, then run: hassmirror config set-token --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(hassmirror::no_credentials),
        help(
            "Add a profile with: hassmirror setup\n\
             Or set the HASSMIRROR_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Setup ────────────────────────────────────────────────────────
    #[error("Setup failed: {kind}")]
    #[diagnostic(code(hassmirror::setup_failed), help("{detail}"))]
    Setup { kind: SetupErrorKind, detail: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hassmirror::not_found),
        help("Run: hassmirror {list_command} to see what the hub exposes")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(hassmirror::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hassmirror::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hassmirror::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hassmirror setup"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No hub configured")]
    #[diagnostic(
        code(hassmirror::no_config),
        help(
            "Create a profile with: hassmirror setup\n\
             Or pass --url and --token. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(hassmirror::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Setup { kind, .. } => match kind {
                SetupErrorKind::InvalidAuth => exit_code::AUTH,
                SetupErrorKind::CannotConnect => exit_code::CONNECTION,
                SetupErrorKind::Unknown => exit_code::GENERAL,
            },
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            Self::ApiError { .. } | Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Attribute an authentication failure to the profile in use.
    pub fn for_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { url } => CliError::Timeout { url },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Validation {
                field: "connection".into(),
                reason: message,
            },

            err @ (CoreError::AlreadyRunning | CoreError::Cancelled) => CliError::ApiError {
                message: err.to_string(),
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
