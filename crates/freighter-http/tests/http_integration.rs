//! Unary client against a real HTTP server
//!
//! Each test starts an in-process axum server on an ephemeral port.

use axum::Router;
use axum::body::Bytes;
use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use freighter_core::{ErrorRegistry, FreighterError, FreighterResult, HeaderMiddleware};
use freighter_http::{HttpClientFactory, ReqwestTransport};
use freighter_transport::{Codec, CodecExt, JsonCodec, MsgpackCodec};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sum {
    left: i64,
    right: i64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Total {
    total: i64,
}

async fn start(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn codec_from(headers: &HeaderMap) -> Arc<dyn Codec> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json");
    freighter_transport::codec_for(content_type).unwrap()
}

async fn add(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let codec = codec_from(&headers);
    let sum: Sum = codec.decode(&body).unwrap();
    let reply = codec.encode(&Total { total: sum.left + sum.right }).unwrap();
    (StatusCode::OK, [(header::CONTENT_TYPE, codec.content_type())], reply)
}

async fn echo_query(RawQuery(query): RawQuery) -> impl IntoResponse {
    let body = serde_json::to_vec(&json!({ "raw": query })).unwrap();
    (StatusCode::OK, body)
}

async fn echo_auth(headers: HeaderMap) -> impl IntoResponse {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (StatusCode::OK, serde_json::to_vec(&json!({ "raw": auth })).unwrap())
}

async fn fail() -> impl IntoResponse {
    let body = serde_json::to_vec(&json!({"type": "freighter", "data": "StreamClosed"})).unwrap();
    (StatusCode::CONFLICT, body)
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(500)).await;
    (StatusCode::OK, b"{}".to_vec())
}

fn app() -> Router {
    Router::new()
        .route("/api/add", post(add))
        .route("/api/query", get(echo_query))
        .route("/api/auth", get(echo_auth))
        .route("/api/fail", post(fail))
        .route("/api/slow", get(slow))
}

#[derive(Debug, Deserialize)]
struct Raw {
    raw: Option<String>,
}

#[tokio::test]
async fn post_roundtrip_with_json() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let total: Total = factory
        .post_client()
        .send("add", Some(&Sum { left: 2, right: 40 }))
        .await
        .unwrap();

    assert_eq!(total, Total { total: 42 });
}

#[tokio::test]
async fn post_roundtrip_with_msgpack() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(MsgpackCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let total: Total = factory
        .post_client()
        .send("add", Some(&Sum { left: i64::MIN + 1, right: -1 }))
        .await
        .unwrap();

    assert_eq!(total, Total { total: i64::MIN });
}

#[tokio::test]
async fn get_sends_repeated_pairs_percent_encoded() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let raw: Raw = factory
        .get_client()
        .send("query", Some(&json!({"a": 1, "b": null, "c": [], "d": [2, 3], "q": "x y"})))
        .await
        .unwrap();

    assert_eq!(raw.raw.as_deref(), Some("a=1&d=2&d=3&q=x+y"));
}

#[tokio::test]
async fn get_without_request_sends_no_query() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let raw: Raw = factory.get_client().send::<Value, _>("query", None).await.unwrap();

    assert_eq!(raw.raw, None);
}

#[tokio::test]
async fn middleware_headers_reach_the_server() {
    let endpoint = start(app()).await;
    let mut factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );
    factory.use_middleware(HeaderMiddleware::new().with_header("Authorization", "Bearer abc"));

    let raw: Raw = factory.get_client().send::<Value, _>("auth", None).await.unwrap();

    assert_eq!(raw.raw.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn error_status_decodes_through_registry() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let result: FreighterResult<Total> = factory
        .post_client()
        .send("fail", Some(&Sum { left: 0, right: 0 }))
        .await;

    assert_eq!(result, Err(FreighterError::StreamClosed));
}

#[tokio::test]
async fn unknown_route_without_payload_is_serialization_error() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let result: FreighterResult<Total> = factory.post_client().send::<Value, _>("missing", None).await;

    assert!(matches!(result, Err(FreighterError::Serialization(_))));
}

#[tokio::test]
async fn request_timeout_is_reported() {
    let endpoint = start(app()).await;
    let factory = HttpClientFactory::new(
        endpoint,
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    )
    .with_transport(Arc::new(
        ReqwestTransport::new().with_timeout(Duration::from_millis(50)),
    ));

    let result: FreighterResult<Value> = factory.get_client().send::<Value, _>("slow", None).await;

    assert_eq!(result, Err(FreighterError::Timeout));
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let factory = HttpClientFactory::new(
        format!("http://{}", addr),
        Arc::new(JsonCodec::new()),
        Arc::new(ErrorRegistry::with_builtins()),
    );

    let result: FreighterResult<Value> = factory.post_client().send::<Value, _>("x", None).await;

    assert_eq!(result, Err(FreighterError::Unreachable));
}
