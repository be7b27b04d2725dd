use thiserror::Error;

/// The three failure categories every REST call collapses into.
///
/// Ordered by specificity: an [`Authentication`](Self::Authentication)
/// failure is the most specific, [`Api`](Self::Api) the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote hub rejected the bearer token.
    Authentication,
    /// The hub could not be reached, or did not answer in time.
    Communication,
    /// Anything else: unexpected status, malformed body, bad configuration.
    Api,
}

/// Top-level error type for the `hassmirror-api` crate.
///
/// `hassmirror-core` maps these into coordinator signals and setup
/// diagnostics via [`Error::kind`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// HTTP 401 or 403 from the remote hub.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Communication ───────────────────────────────────────────────
    /// The request exceeded the transport timeout.
    #[error("Timeout error fetching information")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },

    /// Connection-level failure (DNS resolution, refused connection,
    /// interrupted body).
    #[error("Error fetching information")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    // ── Generic API ─────────────────────────────────────────────────
    /// Non-2xx response other than 401/403.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The configured host cannot be turned into a base URL.
    #[error("Invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Any other failure surfaced by the HTTP stack.
    #[error("Unexpected error: {source}")]
    Unexpected {
        #[source]
        source: reqwest::Error,
    },
}

impl Error {
    /// Classify this error into the three-kind taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Timeout { .. } | Self::Transport { .. } => ErrorKind::Communication,
            Self::Status { .. }
            | Self::Deserialization { .. }
            | Self::InvalidHost { .. }
            | Self::InvalidUrl(_)
            | Self::Tls(_)
            | Self::Unexpected { .. } => ErrorKind::Api,
        }
    }

    /// Returns `true` if the credentials were rejected and
    /// re-credentialing is the only remedy.
    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    /// Returns `true` for network and timeout failures.
    pub fn is_communication(&self) -> bool {
        self.kind() == ErrorKind::Communication
    }

    /// Returns `true` if the hub answered 404 for the requested entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// The request URL, when the failure came from the HTTP stack.
    pub fn url(&self) -> Option<&url::Url> {
        match self {
            Self::Timeout { source } | Self::Transport { source } | Self::Unexpected { source } => {
                source.url()
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { source }
        } else if source.is_connect() || source.is_request() || source.is_body() {
            Self::Transport { source }
        } else {
            Self::Unexpected { source }
        }
    }
}
