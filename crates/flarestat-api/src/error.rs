use thiserror::Error;

/// Top-level error type for the `flarestat-api` crate.
///
/// Covers every way a single analytics round trip can fail before a
/// GraphQL envelope is in hand. Upstream `errors` lists are *not* errors
/// at this layer -- they travel inside [`GraphqlResponse`](crate::GraphqlResponse)
/// because a response may carry both errors and usable `data`.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The bearer token was rejected (HTTP 401/403).
    #[error("API token rejected (HTTP {status})")]
    InvalidToken { status: u16 },

    /// The token could not be encoded as a header value.
    #[error("Authentication setup failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out. `timeout_secs` is `None` when the client did not
    /// configure the timeout itself.
    #[error("Request timed out{}", fmt_timeout(*.timeout_secs))]
    Timeout { timeout_secs: Option<u64> },

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    ClientBuild(String),

    // ── Upstream ────────────────────────────────────────────────────
    /// Rate limited by the API. Includes retry-after in seconds.
    #[error("Rate limited -- retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-2xx response.
    #[error("Analytics API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// ` after Ns` suffix for timeout messages, empty when the duration is unknown.
pub fn fmt_timeout(timeout_secs: Option<u64>) -> String {
    timeout_secs.map(|secs| format!(" after {secs}s")).unwrap_or_default()
}

impl Error {
    /// Returns `true` if the token itself is the problem.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::InvalidToken { .. } | Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error the next tick may not hit.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidToken { status } | Self::Http { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
