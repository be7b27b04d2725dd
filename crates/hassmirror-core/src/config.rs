// ── Runtime connection configuration ──
//
// These types describe *how* to reach one remote hub and how often to poll
// it. They carry the bearer token but never touch disk; the CLI resolves a
// profile into a `ConnectionConfig` and hands it in.

use std::time::Duration;

use hassmirror_api::{RestClient, TlsMode, TransportConfig};
use secrecy::SecretString;

use crate::error::CoreError;
use crate::sensor::SensorFilter;

/// Interval between scheduled refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub use hassmirror_api::DEFAULT_TIMEOUT;

/// TLS verification strategy for `https` hubs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for mirroring a single remote hub.
///
/// One value per configured connection. Several may be active in one
/// process; nothing here is global.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Stable identifier of this connection. Prefixes every sensor's
    /// unique id and keys the device record.
    pub id: String,
    /// Display title. Defaults to the host.
    pub name: String,
    /// Hub host without scheme, e.g. `homeassistant.local:8123`.
    pub url: String,
    /// Long-lived access token.
    pub token: SecretString,
    /// Use `https` when set, `http` otherwise.
    pub ssl: bool,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Which remote entities become sensors.
    pub sensor_filter: SensorFilter,
}

impl ConnectionConfig {
    /// A config with default timeout, poll interval, and sensor filter.
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        token: SecretString,
        ssl: bool,
    ) -> Self {
        let url = url.into();
        Self {
            id: id.into(),
            name: url.clone(),
            url,
            token,
            ssl,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sensor_filter: SensorFilter::default(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_sensor_filter(mut self, filter: SensorFilter) -> Self {
        self.sensor_filter = filter;
        self
    }

    /// Build the REST client this connection talks through.
    pub fn build_client(&self) -> Result<RestClient, CoreError> {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        let transport = TransportConfig::default()
            .with_timeout(self.timeout)
            .with_tls(tls);

        Ok(RestClient::new(
            &self.url,
            self.token.clone(),
            self.ssl,
            &transport,
        )?)
    }
}
