//! # freighter
//!
//! Typed request/response and bidirectional streaming clients over HTTP and
//! WebSocket, with pluggable payload encodings.
//!
//! freighter provides:
//! - JSON and MessagePack codecs behind one [`Codec`] interface
//! - An [`ErrorRegistry`] that carries typed application errors across the wire
//! - A [`Middleware`] chain run around every call and stream open
//! - Unary GET/POST clients ([`HttpClientFactory`])
//! - Ordered message streams ([`WebSocketClient`], [`ClientStream`])
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! freighter = "0.1"
//! ```
//!
//! ## Making Calls
//!
//! ```ignore
//! use freighter::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Move {
//!     pub row: u8,
//!     pub col: u8,
//! }
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct Board {
//!     pub cells: Vec<String>,
//! }
//!
//! let config = ClientConfig::new().with_address("localhost", 9090);
//! let registry = Arc::new(ErrorRegistry::with_builtins());
//!
//! // Unary
//! let factory = HttpClientFactory::from_config(&config, registry.clone())?;
//! let board: Board = factory.post_client().send("game/board", Some(&())).await?;
//!
//! // Streaming
//! let client = WebSocketClient::from_config(&config, registry)?;
//! let stream = client.stream::<Move, Board>("game/play").await?;
//! stream.send(&Move { row: 1, col: 2 }).await?;
//! let board = stream.receive().await?;
//! stream.close_send().await;
//! ```
//!
//! ## Crate Structure
//!
//! This is a facade crate that re-exports from:
//! - [`freighter_core`] - Errors, error registry, middleware, and configuration
//! - [`freighter_transport`] - Codecs and the streaming envelope
//! - [`freighter_http`] - Unary client
//! - [`freighter_ws`] - Streaming client
//! - [`freighter_logging`] - Subscriber setup and runtime level changes

// Re-export core types
pub use freighter_core::{
    ClientConfig, Context, ErrorPayload, ErrorRegistry, FREIGHTER_KIND, Finalizer,
    FreighterError, FreighterResult, HeaderMiddleware, LogLevel, LoggingMiddleware, Middleware,
    MiddlewareCollector, Next, RegistryError,
};

// Re-export codecs
pub use freighter_transport::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_MSGPACK, Codec, CodecError, CodecExt, JsonCodec, KeyCase,
    Message, MsgpackCodec, codec_for,
};

// Re-export clients
pub use freighter_http::{
    HttpClient, HttpClientFactory, HttpMethod, HttpRequest, HttpResponse, HttpTransport,
    ReqwestTransport,
};
pub use freighter_ws::{ClientStream, StreamOptions, StreamState, WebSocketClient};

// Re-export logging setup
pub use freighter_logging::{LoggingError, ReloadHandle, init_from_config, init_logging};

// Re-export common dependencies that client code needs
pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// Lower-level pieces for custom transports and socket handling.
///
/// Most applications never need these; they exist for tests and for
/// plugging a non-default HTTP or socket primitive underneath the clients.
pub mod transport {
    pub use freighter_http::build_query;
    pub use freighter_transport::validate;
    pub use freighter_ws::{
        CLOSE_ABNORMAL, CLOSE_GOING_AWAY, CLOSE_NO_STATUS, CLOSE_NORMAL, FrameSink, SocketEvent,
        SocketEvents, close_code_error, split_socket,
    };
}

/// Prelude module for convenient imports.
///
/// Use `use freighter::prelude::*;` to import commonly used types.
///
/// This includes:
/// - Clients: `HttpClientFactory`, `HttpClient`, `WebSocketClient`, `ClientStream`
/// - Errors: `FreighterError`, `FreighterResult`, `ErrorRegistry`
/// - Codecs: `Codec`, `JsonCodec`, `MsgpackCodec`
/// - Middleware: `Middleware`, `Context`, `Next`
/// - Common deps: `async_trait`, `Serialize`, `Deserialize`, `Arc`
pub mod prelude {
    // Clients
    pub use crate::{ClientStream, HttpClient, HttpClientFactory, StreamState, WebSocketClient};

    // Errors and configuration
    pub use crate::{ClientConfig, ErrorRegistry, FreighterError, FreighterResult, LogLevel};

    // Codecs
    pub use crate::{Codec, CodecExt, JsonCodec, KeyCase, MsgpackCodec};

    // Middleware
    pub use crate::{Context, HeaderMiddleware, Middleware, Next, async_trait};

    // Serde derives (commonly needed for message types)
    pub use serde::{Deserialize, Serialize};

    pub use std::sync::Arc;
}

#[cfg(test)]
mod lib_tests;
