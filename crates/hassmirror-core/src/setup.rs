// ── Connection setup ──
//
// Validates user-entered connection details before they are stored, and
// maps failures onto the three messages shown to the user.

use hassmirror_api::ErrorKind;
use tracing::{error, info, warn};

use crate::config::ConnectionConfig;
use crate::error::CoreError;

/// Why a setup attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupErrorKind {
    InvalidAuth,
    CannotConnect,
    Unknown,
}

impl SetupErrorKind {
    /// User-facing message.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid credentials",
            Self::CannotConnect => "connection error",
            Self::Unknown => "unknown error",
        }
    }
}

impl std::fmt::Display for SetupErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<&CoreError> for SetupErrorKind {
    fn from(err: &CoreError) -> Self {
        match err.kind() {
            ErrorKind::Authentication => Self::InvalidAuth,
            ErrorKind::Communication => Self::CannotConnect,
            ErrorKind::Api => Self::Unknown,
        }
    }
}

/// Check `config` against the hub with one full fetch.
///
/// Returns the number of entities visible to the token. Nothing is
/// persisted here; the caller stores the entry only on success, titled
/// with [`ConnectionConfig::name`].
pub async fn validate_credentials(config: &ConnectionConfig) -> Result<usize, CoreError> {
    let result = async {
        let client = config.build_client()?;
        Ok::<_, CoreError>(client.get_all_states().await?)
    }
    .await;

    match result {
        Ok(states) => {
            info!(url = %config.url, entities = states.len(), "credentials accepted");
            Ok(states.len())
        }
        Err(e) => {
            match SetupErrorKind::from(&e) {
                SetupErrorKind::InvalidAuth => warn!(url = %config.url, error = %e, "setup rejected"),
                SetupErrorKind::CannotConnect => error!(url = %config.url, error = %e, "setup could not connect"),
                SetupErrorKind::Unknown => error!(url = %config.url, error = ?e, "setup failed"),
            }
            Err(e)
        }
    }
}
