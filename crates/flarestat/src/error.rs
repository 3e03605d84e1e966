//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable
//! help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use flarestat_config::ConfigError;
use flarestat_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CONFIG: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Cloudflare analytics API")]
    #[diagnostic(
        code(flarestat::connection_failed),
        help("Check network access to api.cloudflare.com (or the profile's endpoint).\n{reason}")
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out{}", fmt_timeout(*.seconds))]
    #[diagnostic(
        code(flarestat::timeout),
        help("Increase the timeout with --timeout or in the profile.")
    )]
    Timeout { seconds: Option<u64> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(flarestat::auth_failed),
        help(
            "The token needs the Zone > Analytics > Read permission.\n\
             Replace it with: flarestat config set-token --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(flarestat::no_credentials),
        help(
            "Store one with: flarestat config set-token --profile {profile}\n\
             Or set the FLARESTAT_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", fmt_status(*.status))]
    #[diagnostic(code(flarestat::api_error))]
    ApiError { message: String, status: Option<u16> },

    #[error("{message}")]
    #[diagnostic(
        code(flarestat::no_data),
        help("Check that the zone ID is correct and the token can read it.")
    )]
    NoData { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(flarestat::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(flarestat::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: flarestat config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No zone configured")]
    #[diagnostic(
        code(flarestat::no_config),
        help(
            "Create a profile with: flarestat config init\n\
             Or pass --zone and --api-token.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(flarestat::config))]
    Config { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn fmt_status(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

fn fmt_timeout(seconds: Option<u64>) -> String {
    seconds.map(|s| format!(" after {s}s")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            Self::NoConfig { .. } | Self::Config { .. } => exit_code::CONFIG,
            _ => exit_code::GENERAL,
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
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            e @ CoreError::NoData { .. } => CliError::NoData {
                message: e.to_string(),
            },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
