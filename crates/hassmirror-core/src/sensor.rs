// ── Sensor adapters ──
//
// One adapter per qualifying remote entity. An adapter never fetches on
// its own: every read looks the remote id up in the coordinator's current
// snapshot, so values only move when a refresh lands.

use std::collections::BTreeSet;
use std::sync::Arc;

use hassmirror_api::EntityState;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::ConnectionConfig;
use crate::model::{DeviceInfo, Snapshot};
use crate::source::PollingSource;

/// Remote state strings meaning "no value".
pub const UNAVAILABLE_STATES: [&str; 2] = ["unknown", "unavailable"];

// ── Filter ───────────────────────────────────────────────────────────

/// Selects which remote entities become sensor adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorFilter {
    /// Entity-id prefix, `sensor.` by default.
    pub prefix: String,
    /// Device classes to skip, `timestamp` by default.
    pub excluded_device_classes: BTreeSet<String>,
}

impl Default for SensorFilter {
    fn default() -> Self {
        Self {
            prefix: "sensor.".into(),
            excluded_device_classes: BTreeSet::from(["timestamp".to_owned()]),
        }
    }
}

impl SensorFilter {
    pub fn accepts(&self, entity: &EntityState) -> bool {
        entity.entity_id.starts_with(&self.prefix)
            && entity
                .device_class()
                .is_none_or(|class| !self.excluded_device_classes.contains(&class))
    }

    /// The id with the filter prefix removed (`outdoor_temp` for
    /// `sensor.outdoor_temp`).
    pub fn object_id<'a>(&self, entity_id: &'a str) -> &'a str {
        entity_id.strip_prefix(&self.prefix).unwrap_or(entity_id)
    }
}

// ── Naming ───────────────────────────────────────────────────────────

/// Humanize an object id: underscores become spaces, then title case.
///
/// A letter is upper-cased when it follows a non-letter and lower-cased
/// otherwise, so `pm2_5_level` becomes `Pm2 5 Level` and `co2level`
/// becomes `Co2Level`.
pub fn display_name(object_id: &str) -> String {
    let mut out = String::with_capacity(object_id.len());
    let mut prev_is_letter = false;
    for ch in object_id.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(ch);
            prev_is_letter = false;
        }
    }
    out
}

/// `{connection_id}_{remote_id}`; unique across connections in one process.
pub fn unique_id(connection_id: &str, remote_id: &str) -> String {
    format!("{connection_id}_{remote_id}")
}

// ── Reading ──────────────────────────────────────────────────────────

/// What a sensor reports at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SensorReading {
    /// Raw state string; `None` for the unknown/unavailable sentinels,
    /// a missing state field, or a record absent from the snapshot.
    pub value: Option<String>,
    pub unit_of_measurement: Option<String>,
    pub device_class: Option<String>,
    pub state_class: Option<String>,
}

impl SensorReading {
    pub fn from_record(record: &EntityState) -> Self {
        Self {
            value: record
                .state
                .as_deref()
                .filter(|s| !UNAVAILABLE_STATES.contains(s))
                .map(str::to_owned),
            unit_of_measurement: record.unit_of_measurement(),
            device_class: record.device_class(),
            state_class: record.state_class(),
        }
    }
}

// ── Adapter ──────────────────────────────────────────────────────────

/// Presents one remote entity as a local sensor.
#[derive(Debug, Clone)]
pub struct SensorAdapter {
    remote_id: String,
    object_id: String,
    unique_id: String,
    name: String,
    device: Arc<DeviceInfo>,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl SensorAdapter {
    pub fn new(
        remote_id: impl Into<String>,
        config: &ConnectionConfig,
        device: Arc<DeviceInfo>,
        snapshots: watch::Receiver<Arc<Snapshot>>,
    ) -> Self {
        let remote_id = remote_id.into();
        let object_id = config.sensor_filter.object_id(&remote_id).to_owned();
        Self {
            unique_id: unique_id(&config.id, &remote_id),
            name: display_name(&object_id),
            object_id,
            remote_id,
            device,
            snapshots,
        }
    }

    /// Remote entity id this adapter mirrors.
    pub fn remote_id(&self) -> &str {
        &self.remote_id
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Human-readable name derived from the remote id.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    /// Mirrored sensors start disabled; the user opts in per sensor.
    pub fn enabled_by_default(&self) -> bool {
        false
    }

    /// Read against the coordinator's current snapshot.
    pub fn reading(&self) -> SensorReading {
        let snapshot = self.snapshots.borrow().clone();
        self.read(&snapshot)
    }

    /// Read against an explicit snapshot.
    pub fn read(&self, snapshot: &Snapshot) -> SensorReading {
        snapshot
            .get(&self.remote_id)
            .map(SensorReading::from_record)
            .unwrap_or_default()
    }

    /// Whether the remote record is present in the current snapshot.
    pub fn is_present(&self) -> bool {
        self.snapshots.borrow().get(&self.remote_id).is_some()
    }

    pub fn native_value(&self) -> Option<String> {
        self.reading().value
    }

    pub fn unit_of_measurement(&self) -> Option<String> {
        self.reading().unit_of_measurement
    }

    pub fn device_class(&self) -> Option<String> {
        self.reading().device_class
    }

    pub fn state_class(&self) -> Option<String> {
        self.reading().state_class
    }
}

/// Create one adapter per entity in `source`'s current snapshot that
/// `config.sensor_filter` accepts. Order follows the snapshot.
///
/// Runs once, after the first refresh. Entities appearing later are not
/// picked up until the connection is set up again.
pub fn register_sensors<S: PollingSource>(
    source: &S,
    config: &ConnectionConfig,
    device: &Arc<DeviceInfo>,
) -> Vec<SensorAdapter> {
    let snapshot = source.current_snapshot();
    snapshot
        .iter()
        .filter(|entity| config.sensor_filter.accepts(entity))
        .map(|entity| {
            SensorAdapter::new(
                entity.entity_id.clone(),
                config,
                Arc::clone(device),
                source.subscribe(),
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use serde_json::{Value, json};

    fn record(value: Value) -> EntityState {
        serde_json::from_value(value).unwrap()
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new("entry1", "hub", SecretString::from("t".to_owned()), false)
    }

    fn adapter(remote_id: &str, snapshot: Snapshot) -> SensorAdapter {
        let cfg = config();
        let device = Arc::new(DeviceInfo::for_connection(&cfg));
        let (_tx, rx) = watch::channel(Arc::new(snapshot));
        SensorAdapter::new(remote_id, &cfg, device, rx)
    }

    // ── Filter ──

    #[test]
    fn filter_accepts_plain_sensor() {
        let f = SensorFilter::default();
        assert!(f.accepts(&record(json!({ "entity_id": "sensor.temp", "state": "21" }))));
    }

    #[test]
    fn filter_rejects_other_domains_and_timestamps() {
        let f = SensorFilter::default();
        assert!(!f.accepts(&record(json!({ "entity_id": "light.kitchen", "state": "on" }))));
        assert!(!f.accepts(&record(json!({
            "entity_id": "sensor.last_boot",
            "state": "2025-01-01T00:00:00+00:00",
            "attributes": { "device_class": "timestamp" }
        }))));
        // Prefix match is literal, not a substring search.
        assert!(!f.accepts(&record(json!({ "entity_id": "binary_sensor.door" }))));
    }

    #[test]
    fn filter_exclusions_are_configurable() {
        let f = SensorFilter {
            prefix: "sensor.".into(),
            excluded_device_classes: BTreeSet::from(["battery".to_owned()]),
        };
        assert!(f.accepts(&record(json!({
            "entity_id": "sensor.boot",
            "attributes": { "device_class": "timestamp" }
        }))));
        assert!(!f.accepts(&record(json!({
            "entity_id": "sensor.phone_battery",
            "attributes": { "device_class": "battery" }
        }))));
    }

    // ── Naming ──

    #[test]
    fn display_name_title_cases() {
        assert_eq!(display_name("living_room_temp"), "Living Room Temp");
        assert_eq!(display_name("pm2_5_level"), "Pm2 5 Level");
        assert_eq!(display_name("co2level"), "Co2Level");
        assert_eq!(display_name("UPS_LOAD"), "Ups Load");
    }

    #[test]
    fn adapter_identity() {
        let a = adapter("sensor.living_room_temp", Snapshot::empty());
        assert_eq!(a.remote_id(), "sensor.living_room_temp");
        assert_eq!(a.object_id(), "living_room_temp");
        assert_eq!(a.unique_id(), "entry1_sensor.living_room_temp");
        assert_eq!(a.name(), "Living Room Temp");
        assert!(!a.enabled_by_default());
    }

    // ── Reading ──

    #[test]
    fn reading_reports_state_and_attributes() {
        let snap = Snapshot::new(vec![record(json!({
            "entity_id": "sensor.temp",
            "state": "21.5",
            "attributes": {
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "state_class": "measurement"
            }
        }))]);
        let a = adapter("sensor.temp", snap);

        assert_eq!(
            a.reading(),
            SensorReading {
                value: Some("21.5".into()),
                unit_of_measurement: Some("°C".into()),
                device_class: Some("temperature".into()),
                state_class: Some("measurement".into()),
            }
        );
        assert!(a.is_present());
    }

    #[test]
    fn sentinels_map_to_none_but_attributes_remain() {
        for sentinel in UNAVAILABLE_STATES {
            let snap = Snapshot::new(vec![record(json!({
                "entity_id": "sensor.temp",
                "state": sentinel,
                "attributes": { "unit_of_measurement": "°C" }
            }))]);
            let a = adapter("sensor.temp", snap);
            assert_eq!(a.native_value(), None, "{sentinel}");
            assert_eq!(a.unit_of_measurement().as_deref(), Some("°C"));
        }
    }

    #[test]
    fn sentinel_match_is_case_sensitive() {
        let snap = Snapshot::new(vec![record(json!({ "entity_id": "sensor.s", "state": "Unknown" }))]);
        assert_eq!(adapter("sensor.s", snap).native_value().as_deref(), Some("Unknown"));
    }

    #[test]
    fn missing_record_reads_all_none() {
        let a = adapter("sensor.gone", Snapshot::new(Vec::new()));
        assert_eq!(a.reading(), SensorReading::default());
        assert!(!a.is_present());
    }

    #[test]
    fn reading_follows_published_snapshot() {
        let cfg = config();
        let device = Arc::new(DeviceInfo::for_connection(&cfg));
        let (tx, rx) = watch::channel(Arc::new(Snapshot::new(vec![record(
            json!({ "entity_id": "sensor.temp", "state": "1" }),
        )])));
        let a = SensorAdapter::new("sensor.temp", &cfg, device, rx);
        assert_eq!(a.native_value().as_deref(), Some("1"));

        tx.send_replace(Arc::new(Snapshot::new(vec![record(
            json!({ "entity_id": "sensor.temp", "state": "2" }),
        )])));
        assert_eq!(a.native_value().as_deref(), Some("2"));
    }
}
