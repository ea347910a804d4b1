//! freighter-ws - Bidirectional message streams over WebSocket
//!
//! This crate provides:
//! - [`WebSocketClient`] to open streams through the middleware chain
//! - [`ClientStream`] with `send`, `close_send` and `receive`
//! - [`StreamState`] for the stream state machine
//! - [`FrameSink`] and [`SocketEvent`], the seam to the socket primitive

mod client;
mod socket;
mod state;
mod stream;

pub use client::{PROTOCOL_WEBSOCKET, WebSocketClient};
pub use socket::{
    CLOSE_ABNORMAL, CLOSE_GOING_AWAY, CLOSE_NO_STATUS, CLOSE_NORMAL, FrameSink, SocketEvent,
    SocketEvents, close_code_error, split_socket,
};
pub use state::StreamState;
pub use stream::{ClientStream, StreamOptions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ClientStream, StreamOptions, StreamState, WebSocketClient};
}
