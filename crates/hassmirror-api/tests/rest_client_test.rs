#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hassmirror_api::{Error, ErrorKind, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const TOKEN: &str = "test-token";

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = client_for(&server, TransportConfig::default());
    (server, client)
}

/// Build a client the way production code does: scheme-less host + TLS flag.
fn client_for(server: &MockServer, transport: TransportConfig) -> RestClient {
    let host = server.address().to_string();
    RestClient::new(&host, SecretString::from(TOKEN.to_owned()), false, &transport).unwrap()
}

fn states_body() -> Value {
    json!([
        {
            "entity_id": "sensor.outdoor_temp",
            "state": "23.5",
            "attributes": {
                "unit_of_measurement": "°C",
                "device_class": "temperature",
                "state_class": "measurement",
                "friendly_name": "Outdoor temp"
            },
            "last_changed": "2025-10-02T10:00:00+00:00",
            "last_updated": "2025-10-02T10:00:00+00:00",
            "context": { "id": "01HABC", "parent_id": null, "user_id": null }
        },
        {
            "entity_id": "light.kitchen",
            "state": "off",
            "attributes": { "friendly_name": "Kitchen" },
            "last_changed": "2025-10-02T09:00:00+00:00",
            "last_updated": "2025-10-02T09:00:00+00:00"
        }
    ])
}

// ── Fetch all ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_all_states_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(states_body()))
        .expect(1)
        .mount(&server)
        .await;

    let states = client.get_all_states().await.unwrap();

    assert_eq!(states.len(), 2);
    assert_eq!(states[0].entity_id, "sensor.outdoor_temp");
    assert_eq!(states[0].state.as_deref(), Some("23.5"));
    assert_eq!(states[0].unit_of_measurement().as_deref(), Some("°C"));
    assert_eq!(states[1].domain(), "light");
}

#[tokio::test]
async fn test_get_all_states_returns_body_unchanged() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(states_body()))
        .mount(&server)
        .await;

    let states = client.get_all_states().await.unwrap();
    assert_eq!(serde_json::to_value(&states).unwrap(), states_body());
}

#[tokio::test]
async fn test_get_all_states_is_idempotent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(states_body()))
        .expect(2)
        .mount(&server)
        .await;

    let first = serde_json::to_vec(&client.get_all_states().await.unwrap()).unwrap();
    let second = serde_json::to_vec(&client.get_all_states().await.unwrap()).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_all_states_empty_list() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.get_all_states().await.unwrap().is_empty());
}

// ── Fetch one ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_state_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/sensor.outdoor_temp"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&states_body()[0]))
        .expect(1)
        .mount(&server)
        .await;

    let state = client.get_state("sensor.outdoor_temp").await.unwrap();
    assert_eq!(state.entity_id, "sensor.outdoor_temp");
    assert_eq!(state.device_class().as_deref(), Some("temperature"));
    assert_eq!(state.state_class().as_deref(), Some("measurement"));
}

#[tokio::test]
async fn test_get_state_not_found_is_generic_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states/sensor.nonexistent"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Entity not found." })),
        )
        .mount(&server)
        .await;

    let err = client.get_state("sensor.nonexistent").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Api);
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_is_authentication_error_for_both_operations() {
    for status in [401_u16, 403_u16] {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("401: Unauthorized"))
            .mount(&server)
            .await;

        let all = client.get_all_states().await;
        assert!(
            matches!(all, Err(Error::Authentication { .. })),
            "HTTP {status}: expected Authentication error, got: {all:?}"
        );

        let one = client.get_state("sensor.outdoor_temp").await;
        assert!(
            matches!(one, Err(Error::Authentication { .. })),
            "HTTP {status}: expected Authentication error, got: {one:?}"
        );
    }
}

// ── Communication ───────────────────────────────────────────────────

#[tokio::test]
async fn test_timeout_is_communication_error() {
    let server = MockServer::start().await;
    let client = client_for(
        &server,
        TransportConfig::default().with_timeout(Duration::from_millis(200)),
    );

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let all = client.get_all_states().await.unwrap_err();
    assert!(matches!(all, Error::Timeout { .. }), "got {all:?}");
    assert_eq!(all.kind(), ErrorKind::Communication);

    let one = client.get_state("sensor.outdoor_temp").await.unwrap_err();
    assert!(matches!(one, Error::Timeout { .. }), "got {one:?}");
    assert_eq!(one.kind(), ErrorKind::Communication);
}

#[tokio::test]
async fn test_connection_refused_is_communication_error() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::new(
        &addr.to_string(),
        SecretString::from(TOKEN.to_owned()),
        false,
        &TransportConfig::default(),
    )
    .unwrap();

    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
    assert!(err.is_communication());

    let err = client.get_state("sensor.outdoor_temp").await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_timeout_message_differs_from_connection_message() {
    let server = MockServer::start().await;
    let slow = client_for(
        &server,
        TransportConfig::default().with_timeout(Duration::from_millis(200)),
    );
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let refused = RestClient::new(
        &addr.to_string(),
        SecretString::from(TOKEN.to_owned()),
        false,
        &TransportConfig::default(),
    )
    .unwrap();

    let timeout_msg = slow.get_all_states().await.unwrap_err().to_string();
    let refused_msg = refused.get_all_states().await.unwrap_err().to_string();

    assert!(timeout_msg.to_lowercase().contains("timeout"), "{timeout_msg}");
    assert!(!refused_msg.to_lowercase().contains("timeout"), "{refused_msg}");
    assert_ne!(timeout_msg, refused_msg);
}

// ── Generic API errors ──────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_is_generic_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.get_all_states().await.unwrap_err();
    match err {
        Error::Status { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        ref other => panic!("expected Status error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[tokio::test]
async fn test_malformed_body_is_generic_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let err = client.get_all_states().await.unwrap_err();
    match &err {
        Error::Deserialization { body, .. } => assert_eq!(body, "<html>proxy login</html>"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Api);
}

#[tokio::test]
async fn test_object_where_list_expected_is_generic_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "API running." })))
        .mount(&server)
        .await;

    let err = client.get_all_states().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api, "got {err:?}");
}
