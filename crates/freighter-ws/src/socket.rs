//! Socket primitive used by streams
//!
//! A stream only needs two things from its connection: a way to write whole
//! frames ([`FrameSink`]) and an ordered sequence of [`SocketEvent`]s. The
//! `tokio-tungstenite` adapters here provide both for a WebSocket; tests can
//! substitute in-memory channels.

use async_trait::async_trait;
use freighter_core::{FreighterError, FreighterResult};
use futures_util::stream::{BoxStream, SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};

/// Normal closure
pub const CLOSE_NORMAL: u16 = 1000;

/// Endpoint is going away
pub const CLOSE_GOING_AWAY: u16 = 1001;

/// Close frame without a status code
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Connection dropped without a close frame
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Something that happened on the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// One complete frame arrived
    Frame(Vec<u8>),
    /// The connection closed with this code; no events follow
    Closed(u16),
}

/// Ordered sequence of events from one connection
pub type SocketEvents = BoxStream<'static, SocketEvent>;

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send {
    /// Write one frame
    async fn send_frame(&mut self, frame: Vec<u8>) -> FreighterResult<()>;

    /// Close the connection
    async fn close(&mut self) -> FreighterResult<()>;
}

/// Terminal error for a connection-level close
///
/// Normal and going-away closes end the stream cleanly; any other code means
/// the stream was cut off.
pub fn close_code_error(code: u16) -> FreighterError {
    match code {
        CLOSE_NORMAL | CLOSE_GOING_AWAY => FreighterError::Eof,
        _ => FreighterError::StreamClosed,
    }
}

/// Split a WebSocket into a frame sink and an event stream
pub fn split_socket<S>(socket: WebSocketStream<S>) -> (Box<dyn FrameSink>, SocketEvents)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (write, read) = socket.split();
    (Box::new(WsFrameSink { inner: write }), socket_events(read))
}

struct WsFrameSink<S> {
    inner: SplitSink<WebSocketStream<S>, WsMessage>,
}

#[async_trait]
impl<S> FrameSink for WsFrameSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send_frame(&mut self, frame: Vec<u8>) -> FreighterResult<()> {
        self.inner
            .send(WsMessage::Binary(frame.into()))
            .await
            .map_err(socket_error)
    }

    async fn close(&mut self) -> FreighterResult<()> {
        self.inner.close().await.map_err(socket_error)
    }
}

fn socket_events<S>(read: SplitStream<WebSocketStream<S>>) -> SocketEvents
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    futures_util::stream::unfold(Some(read), |read| async move {
        let Some(mut read) = read else {
            return None;
        };
        loop {
            let event = match read.next().await {
                Some(Ok(WsMessage::Binary(bytes))) => SocketEvent::Frame(bytes.to_vec()),
                Some(Ok(WsMessage::Text(text))) => {
                    SocketEvent::Frame(text.as_str().as_bytes().to_vec())
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code)).unwrap_or(CLOSE_NO_STATUS);
                    return Some((SocketEvent::Closed(code), None));
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    tracing::debug!(error = %err, "socket read failed");
                    return Some((SocketEvent::Closed(CLOSE_ABNORMAL), None));
                }
                None => return Some((SocketEvent::Closed(CLOSE_ABNORMAL), None)),
            };
            return Some((event, Some(read)));
        }
    })
    .boxed()
}

fn socket_error(err: WsError) -> FreighterError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => FreighterError::StreamClosed,
        other => FreighterError::Transport(other.to_string()),
    }
}
