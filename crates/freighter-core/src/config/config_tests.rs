#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

#[test]
fn ClientConfig___default___has_expected_values() {
    let config = ClientConfig::default();

    assert_eq!(config.host, "localhost");
    assert_eq!(config.port, 9090);
    assert!(!config.secure);
    assert_eq!(config.content_type, "application/msgpack");
    assert_eq!(config.log_level, "info");
    assert!(config.receive_buffer.is_none());
    assert!(config.receive_timeout_ms.is_none());
}

#[test]
fn ClientConfig___from_empty_bytes___returns_defaults() {
    let config = ClientConfig::from_json(&[]).unwrap();

    assert_eq!(config, ClientConfig::default());
}

#[test]
fn ClientConfig___from_json___fills_missing_fields_with_defaults() {
    let json = r#"{"host": "db.internal", "receive_buffer": 64}"#;

    let config = ClientConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.host, "db.internal");
    assert_eq!(config.port, 9090);
    assert_eq!(config.receive_buffer, Some(64));
}

#[test]
fn ClientConfig___from_json___invalid_json_returns_error() {
    let result = ClientConfig::from_json(b"{not json");

    assert!(result.is_err());
}

#[test_case(false, "", "http://localhost:9090" ; "plain without prefix")]
#[test_case(false, "api", "http://localhost:9090/api" ; "plain with prefix")]
#[test_case(true, "/api/v1/", "https://localhost:9090/api/v1" ; "secure with slashed prefix")]
fn ClientConfig___http_endpoint___builds_base_address(secure: bool, prefix: &str, expected: &str) {
    let mut config = ClientConfig::new().with_path_prefix(prefix);
    config.secure = secure;

    assert_eq!(config.http_endpoint(), expected);
}

#[test_case(false, "ws://example.com:8080/stream" ; "plain")]
#[test_case(true, "wss://example.com:8080/stream" ; "secure")]
fn ClientConfig___ws_endpoint___uses_websocket_scheme(secure: bool, expected: &str) {
    let mut config = ClientConfig::new()
        .with_address("example.com", 8080)
        .with_path_prefix("stream");
    config.secure = secure;

    assert_eq!(config.ws_endpoint(), expected);
}

#[test]
fn ClientConfig___receive_timeout___converts_milliseconds() {
    let json = r#"{"receive_timeout_ms": 250}"#;

    let config = ClientConfig::from_json(json.as_bytes()).unwrap();

    assert_eq!(config.receive_timeout(), Some(Duration::from_millis(250)));
    assert_eq!(config.request_timeout(), None);
}

#[test_case("trace", LogLevel::Trace)]
#[test_case("debug", LogLevel::Debug)]
#[test_case("error", LogLevel::Error)]
#[test_case("nonsense", LogLevel::Info)]
fn ClientConfig___log_level___parses_configured_level(value: &str, expected: LogLevel) {
    let mut config = ClientConfig::new();
    config.log_level = value.to_string();

    assert_eq!(config.log_level(), expected);
}
