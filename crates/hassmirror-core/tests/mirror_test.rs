#![allow(clippy::unwrap_used)]
// End-to-end setup: fetch, filter, adapt, and read.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hassmirror_core::{
    ConnectionConfig, CoreError, Mirror, SensorReading, SetupErrorKind, validate_credentials,
};

fn config(server: &MockServer) -> ConnectionConfig {
    ConnectionConfig::new(
        "entry42",
        server.address().to_string(),
        SecretString::from("tok".to_owned()),
        false,
    )
    .with_poll_interval(Duration::from_secs(3600))
}

fn hub_states() -> Value {
    json!([
        {
            "entity_id": "sensor.temp",
            "state": "21.5",
            "attributes": {
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "state_class": "measurement"
            }
        },
        {
            "entity_id": "sensor.boot",
            "state": "2025-01-01T00:00:00+00:00",
            "attributes": { "device_class": "timestamp" }
        },
        { "entity_id": "light.kitchen", "state": "on" },
        { "entity_id": "sensor.power", "state": "unavailable", "attributes": { "unit_of_measurement": "W" } }
    ])
}

#[tokio::test]
async fn test_setup_adapts_only_qualifying_sensors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hub_states()))
        .mount(&server)
        .await;

    let mirror = Mirror::setup(config(&server)).await.unwrap();

    let ids: Vec<&str> = mirror.sensors().iter().map(|s| s.remote_id()).collect();
    assert_eq!(ids, vec!["sensor.temp", "sensor.power"]);

    let temp = mirror.sensor("sensor.temp").unwrap();
    assert_eq!(temp.unique_id(), "entry42_sensor.temp");
    assert_eq!(temp.name(), "Temp");
    assert_eq!(
        temp.reading(),
        SensorReading {
            value: Some("21.5".into()),
            unit_of_measurement: Some("°C".into()),
            device_class: Some("temperature".into()),
            state_class: Some("measurement".into()),
        }
    );

    let power = mirror.sensor("sensor.power").unwrap();
    assert_eq!(power.native_value(), None);
    assert_eq!(power.unit_of_measurement().as_deref(), Some("W"));

    let device = mirror.device_info();
    assert!(
        device
            .identifiers
            .contains(&("hassmirror".to_owned(), "entry42".to_owned()))
    );
    assert_eq!(temp.device_info(), device);

    mirror.unload().await;
}

#[tokio::test]
async fn test_entity_missing_after_refresh_reads_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hub_states()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "entity_id": "sensor.power", "state": "120" }
        ])))
        .mount(&server)
        .await;

    let mirror = Mirror::setup(config(&server)).await.unwrap();
    mirror.coordinator().refresh().await.unwrap();

    let temp = mirror.sensor("sensor.temp").unwrap();
    assert_eq!(temp.reading(), SensorReading::default());
    assert!(!temp.is_present());
    assert_eq!(
        mirror.sensor("sensor.power").unwrap().native_value().as_deref(),
        Some("120")
    );
    // Adapter set is fixed at setup time.
    assert_eq!(mirror.sensors().len(), 2);

    mirror.unload().await;
}

#[tokio::test]
async fn test_setup_fails_when_first_refresh_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = Mirror::setup(config(&server)).await.unwrap_err();
    assert!(matches!(err, CoreError::Api { .. }), "got {err:?}");
}

// ── Credential validation ───────────────────────────────────────────

#[tokio::test]
async fn test_validate_credentials_counts_entities() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hub_states()))
        .mount(&server)
        .await;

    assert_eq!(validate_credentials(&config(&server)).await.unwrap(), 4);
}

#[tokio::test]
async fn test_validate_credentials_maps_setup_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let err = validate_credentials(&config(&server)).await.unwrap_err();
    assert_eq!(SetupErrorKind::from(&err), SetupErrorKind::InvalidAuth);

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let cfg = ConnectionConfig::new("x", addr.to_string(), SecretString::from("t".to_owned()), false);
    let err = validate_credentials(&cfg).await.unwrap_err();
    assert_eq!(SetupErrorKind::from(&err), SetupErrorKind::CannotConnect);

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let err = validate_credentials(&config(&server)).await.unwrap_err();
    assert_eq!(SetupErrorKind::from(&err), SetupErrorKind::Unknown);
}
