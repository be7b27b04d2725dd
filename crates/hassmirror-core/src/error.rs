// ── Core error types ──
//
// User-facing errors from hassmirror-core. Consumers never match on
// reqwest errors or raw JSON failures; the `From<hassmirror_api::Error>`
// impl folds transport errors into the three-kind taxonomy while keeping
// enough context (URL, status) for diagnostics.

use hassmirror_api::ErrorKind;
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Communication ────────────────────────────────────────────────
    #[error("Error fetching information from {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Timeout error fetching information from {url}")]
    Timeout { url: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Coordinator is already running")]
    AlreadyRunning,

    #[error("Coordinator was stopped before the first refresh completed")]
    Cancelled,
}

impl CoreError {
    /// Classify this error into the authentication / communication / API
    /// taxonomy shared with `hassmirror-api`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } => ErrorKind::Authentication,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => ErrorKind::Communication,
            Self::Api { .. } | Self::Config { .. } | Self::AlreadyRunning | Self::Cancelled => {
                ErrorKind::Api
            }
        }
    }

    /// Returns `true` when only new credentials can fix this.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Returns `true` for unreachable-hub and timeout failures.
    pub fn is_communication(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hassmirror_api::Error> for CoreError {
    fn from(err: hassmirror_api::Error) -> Self {
        use hassmirror_api::Error as ApiError;

        let url = err
            .url()
            .map_or_else(|| "<unknown>".into(), ToString::to_string);

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::Timeout { .. } => CoreError::Timeout { url },
            ApiError::Transport { source } => CoreError::ConnectionFailed {
                url,
                reason: source.to_string(),
            },
            ApiError::Status { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            ApiError::Deserialization { message, .. } => CoreError::Api {
                message: format!("unexpected response body: {message}"),
                status: None,
            },
            ApiError::InvalidHost { host, reason } => CoreError::Config {
                message: format!("invalid host '{host}': {reason}"),
            },
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            ApiError::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            ApiError::Unexpected { source } => CoreError::Api {
                status: source.status().map(|s| s.as_u16()),
                message: source.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_to_auth_kind() {
        let err = CoreError::from(hassmirror_api::Error::Authentication {
            message: "invalid credentials (HTTP 401)".into(),
        });
        assert!(err.is_auth());
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }

    #[test]
    fn status_keeps_code() {
        let err = CoreError::from(hassmirror_api::Error::Status {
            status: 502,
            message: "bad gateway".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(matches!(err, CoreError::Api { status: Some(502), .. }));
    }

    #[test]
    fn invalid_host_is_a_config_error() {
        let err = CoreError::from(hassmirror_api::Error::InvalidHost {
            host: "https://x".into(),
            reason: "scheme".into(),
        });
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(!err.is_communication());
    }
}
