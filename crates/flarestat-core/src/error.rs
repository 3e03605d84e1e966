// ── Core error types ──
//
// Errors from a single fetch cycle. They never reach metric consumers:
// the fetcher logs them, keeps the previous snapshot, and exposes the
// latest one through `AnalyticsFetcher::last_error()`.

use flarestat_api::fmt_timeout;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach analytics endpoint: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Analytics request timed out{}", fmt_timeout(*.timeout_secs))]
    Timeout { timeout_secs: Option<u64> },

    // ── Upstream errors ──────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    /// The response carried no usable `data` member at all.
    #[error("Analytics response contained no data{}", fmt_errors(.errors))]
    NoData { errors: Vec<String> },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        String::new()
    } else {
        format!(": {}", errors.join("; "))
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<flarestat_api::Error> for CoreError {
    fn from(err: flarestat_api::Error) -> Self {
        use flarestat_api::Error as Api;

        match err {
            Api::InvalidToken { status } => CoreError::AuthenticationFailed {
                message: format!("API token rejected (HTTP {status})"),
            },
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::ClientBuild(msg) => CoreError::Config { message: msg },
            Api::RateLimited { retry_after_secs } => CoreError::Api {
                message: format!("Rate limited -- retry after {retry_after_secs}s"),
                status: Some(429),
            },
            Api::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
