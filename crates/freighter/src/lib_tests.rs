#![allow(non_snake_case)]

use crate::prelude::*;

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("seat {0} is taken")]
struct SeatTaken(u32);

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Move {
    row: u8,
    col: u8,
}

#[test]
fn prelude___builds_both_clients_from_one_config() {
    let config = ClientConfig::new()
        .with_address("game.local", 7000)
        .with_path_prefix("api");
    let registry = Arc::new(ErrorRegistry::with_builtins());

    let factory = HttpClientFactory::from_config(&config, registry.clone()).unwrap();
    let client = WebSocketClient::from_config(&config, registry).unwrap();

    assert_eq!(factory.endpoint(), "http://game.local:7000/api");
    assert_eq!(
        client.stream_url("game/play"),
        "ws://game.local:7000/api/game/play?contentType=application/msgpack"
    );
}

#[test]
fn prelude___unsupported_content_type___is_config_error() {
    let config = ClientConfig::new().with_content_type("text/xml");
    let registry = Arc::new(ErrorRegistry::with_builtins());

    let result = HttpClientFactory::from_config(&config, registry);

    assert!(matches!(result, Err(FreighterError::Config(_))));
}

#[test]
fn ErrorRegistry___typed_error___survives_encode_decode() {
    let registry = ErrorRegistry::with_builtins();
    registry
        .register_typed::<SeatTaken, _, _>(
            "seat_taken",
            |e| e.0.to_string(),
            |data| data.parse().ok().map(SeatTaken),
        )
        .unwrap();

    let payload = registry.encode(Some(&FreighterError::typed("seat_taken", SeatTaken(12))));
    let decoded = registry.decode(&payload).unwrap().unwrap();

    assert_eq!(payload, crate::ErrorPayload::new("seat_taken", "12"));
    assert_eq!(decoded.downcast_ref::<SeatTaken>(), Some(&SeatTaken(12)));
}

#[test]
fn codecs___agree_on_envelope_shape() {
    let json = JsonCodec::new();
    let msgpack = MsgpackCodec::new();
    let message = crate::Message::data(Move { row: 1, col: 2 });

    let via_json: crate::Message<Move> = json.decode(&json.encode(&message).unwrap()).unwrap();
    let via_msgpack: crate::Message<Move> =
        msgpack.decode(&msgpack.encode(&message).unwrap()).unwrap();

    assert_eq!(via_json, message);
    assert_eq!(via_msgpack, message);
}

#[test]
fn codec_for___resolves_both_content_types() {
    assert_eq!(
        crate::codec_for(crate::CONTENT_TYPE_JSON).unwrap().content_type(),
        crate::CONTENT_TYPE_JSON
    );
    assert_eq!(
        crate::codec_for(crate::CONTENT_TYPE_MSGPACK).unwrap().content_type(),
        crate::CONTENT_TYPE_MSGPACK
    );
}
