// hassmirror-core: polling coordinator and sensor adapters between
// hassmirror-api and consumers (CLI or an embedding host).

pub mod config;
pub mod coordinator;
pub mod error;
pub mod mirror;
pub mod model;
pub mod sensor;
pub mod setup;
pub mod source;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, TlsVerification};
pub use coordinator::{Coordinator, FailureKind, PollState, RefreshOutcome, UpdateFailure};
pub use error::CoreError;
pub use mirror::Mirror;
pub use model::{DeviceInfo, Snapshot};
pub use sensor::{SensorAdapter, SensorFilter, SensorReading, register_sensors};
pub use setup::{SetupErrorKind, validate_credentials};
pub use source::PollingSource;
pub use stream::SnapshotStream;

// Wire types consumers need alongside the core API.
pub use hassmirror_api::{EntityState, ErrorKind};
