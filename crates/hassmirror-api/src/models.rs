// Wire types for the `/api/states` endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Attribute key carrying a sensor's device class.
pub const ATTR_DEVICE_CLASS: &str = "device_class";
/// Attribute key carrying a sensor's unit of measurement.
pub const ATTR_UNIT_OF_MEASUREMENT: &str = "unit_of_measurement";
/// Attribute key carrying a sensor's state class.
pub const ATTR_STATE_CLASS: &str = "state_class";
/// Attribute key carrying the remote display name.
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";

/// One entity record as returned by the remote hub.
///
/// Only the fields this crate interprets are typed. Everything else
/// (`last_changed`, `last_updated`, `context`, ...) lands in `extra` so that
/// serializing a fetched record reproduces what the hub sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Namespaced identifier, e.g. `sensor.outdoor_temperature`.
    pub entity_id: String,

    /// Raw state string. `"unknown"` and `"unavailable"` are sentinels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntityState {
    /// The domain part of the id (`sensor` in `sensor.temp`).
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(domain, _)| domain)
    }

    /// The object part of the id (`temp` in `sensor.temp`).
    pub fn object_id(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map_or(self.entity_id.as_str(), |(_, object)| object)
    }

    /// Raw attribute lookup.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.as_ref()?.get(key)
    }

    /// Attribute rendered as a string.
    ///
    /// Strings are returned as-is, numbers and booleans are formatted;
    /// `null`, arrays, and objects yield `None`.
    pub fn attribute_str(&self, key: &str) -> Option<String> {
        match self.attribute(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn device_class(&self) -> Option<String> {
        self.attribute_str(ATTR_DEVICE_CLASS)
    }

    pub fn unit_of_measurement(&self) -> Option<String> {
        self.attribute_str(ATTR_UNIT_OF_MEASUREMENT)
    }

    pub fn state_class(&self) -> Option<String> {
        self.attribute_str(ATTR_STATE_CLASS)
    }

    pub fn friendly_name(&self) -> Option<String> {
        self.attribute_str(ATTR_FRIENDLY_NAME)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EntityState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn splits_domain_and_object_id() {
        let e = record(json!({ "entity_id": "sensor.outdoor_temp", "state": "3" }));
        assert_eq!(e.domain(), "sensor");
        assert_eq!(e.object_id(), "outdoor_temp");
    }

    #[test]
    fn attribute_str_formats_scalars() {
        let e = record(json!({
            "entity_id": "sensor.x",
            "state": "1",
            "attributes": {
                "unit_of_measurement": "°C",
                "precision": 2,
                "enabled": true,
                "nothing": null,
                "list": [1, 2]
            }
        }));
        assert_eq!(e.unit_of_measurement().as_deref(), Some("°C"));
        assert_eq!(e.attribute_str("precision").as_deref(), Some("2"));
        assert_eq!(e.attribute_str("enabled").as_deref(), Some("true"));
        assert_eq!(e.attribute_str("nothing"), None);
        assert_eq!(e.attribute_str("list"), None);
        assert_eq!(e.device_class(), None);
    }

    #[test]
    fn missing_attributes_and_state_are_tolerated() {
        let e = record(json!({ "entity_id": "sensor.bare" }));
        assert_eq!(e.state, None);
        assert_eq!(e.attributes, None);
        assert_eq!(e.state_class(), None);
    }

    #[test]
    fn unknown_fields_survive_reserialization() {
        let raw = json!({
            "entity_id": "sensor.x",
            "state": "on",
            "attributes": { "friendly_name": "X" },
            "last_changed": "2025-10-02T10:00:00+00:00",
            "context": { "id": "01H", "parent_id": null, "user_id": null }
        });
        let e = record(raw.clone());
        assert_eq!(serde_json::to_value(&e).unwrap(), raw);
    }
}
