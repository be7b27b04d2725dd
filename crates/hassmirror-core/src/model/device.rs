use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ConnectionConfig;

/// Integration domain; first half of every device identifier.
pub const DOMAIN: &str = "hassmirror";
/// Manufacturer reported for the mirrored hub.
pub const MANUFACTURER: &str = "Home Assistant";

/// Device record grouping every sensor of one connection.
///
/// Built once per connection and shared by all of its adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, connection id)` pairs.
    pub identifiers: BTreeSet<(String, String)>,
    /// The connection's display name.
    pub name: String,
    /// Mirror version string.
    pub model: String,
    pub manufacturer: String,
}

impl DeviceInfo {
    pub fn for_connection(config: &ConnectionConfig) -> Self {
        Self {
            identifiers: BTreeSet::from([(DOMAIN.to_owned(), config.id.clone())]),
            name: config.name.clone(),
            model: env!("CARGO_PKG_VERSION").to_owned(),
            manufacturer: MANUFACTURER.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn keyed_by_connection_id() {
        let cfg = ConnectionConfig::new("abc123", "hub", SecretString::from("t".to_owned()), false)
            .with_name("Cabin");
        let info = DeviceInfo::for_connection(&cfg);

        assert!(info.identifiers.contains(&(DOMAIN.to_owned(), "abc123".to_owned())));
        assert_eq!(info.identifiers.len(), 1);
        assert_eq!(info.name, "Cabin");
        assert_eq!(info.manufacturer, "Home Assistant");
        assert_eq!(info.model, env!("CARGO_PKG_VERSION"));
    }
}
