// ── Domain model ──

mod device;
mod snapshot;

pub use device::{DeviceInfo, DOMAIN, MANUFACTURER};
pub use snapshot::Snapshot;
