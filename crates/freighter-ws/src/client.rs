//! Streaming client
//!
//! ```ignore
//! let client = WebSocketClient::new("ws://localhost:9090/api", codec, registry);
//! let stream = client.stream::<Move, Board>("game/play").await?;
//! stream.send(&Move::new(3, 4)).await?;
//! let board = stream.receive().await?;
//! ```

use crate::socket::split_socket;
use crate::stream::{ClientStream, StreamOptions};
use async_trait::async_trait;
use freighter_core::{
    ClientConfig, Context, ErrorRegistry, Finalizer, FreighterError, FreighterResult, Middleware,
    MiddlewareCollector,
};
use freighter_transport::{Codec, codec_for};
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Protocol name seen by middleware when a stream opens
pub const PROTOCOL_WEBSOCKET: &str = "websocket";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens streams against one endpoint
#[derive(Clone)]
pub struct WebSocketClient {
    endpoint: String,
    codec: Arc<dyn Codec>,
    registry: Arc<ErrorRegistry>,
    middleware: MiddlewareCollector,
    options: StreamOptions,
}

impl WebSocketClient {
    /// Create a client for `endpoint`, e.g. `ws://localhost:9090/api`
    pub fn new(
        endpoint: impl Into<String>,
        codec: Arc<dyn Codec>,
        registry: Arc<ErrorRegistry>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            codec,
            registry,
            middleware: MiddlewareCollector::new(),
            options: StreamOptions::default(),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &ClientConfig, registry: Arc<ErrorRegistry>) -> FreighterResult<Self> {
        let codec = codec_for(&config.content_type).ok_or_else(|| {
            FreighterError::Config(format!("unsupported content type: {}", config.content_type))
        })?;
        Ok(Self::new(config.ws_endpoint(), codec, registry)
            .with_options(StreamOptions::from_config(config)))
    }

    /// Set the options of streams opened after this call
    pub fn with_options(mut self, options: StreamOptions) -> Self {
        self.options = options;
        self
    }

    /// Add middleware, run once per stream open
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.use_middleware(middleware);
    }

    /// Address a stream to `target` connects to
    pub fn stream_url(&self, target: &str) -> String {
        format!(
            "{}/{}?contentType={}",
            self.endpoint,
            target.trim_start_matches('/'),
            self.codec.content_type()
        )
    }

    /// Open a stream to `target`
    ///
    /// Middleware runs first and may abort the open before any connection
    /// is attempted. Its params are sent as handshake headers. A failed
    /// handshake is [`FreighterError::Unreachable`].
    pub async fn stream<RQ, RS>(&self, target: &str) -> FreighterResult<ClientStream<RQ, RS>>
    where
        RQ: Serialize,
        RS: DeserializeOwned + Send + 'static,
    {
        let connect = Connect::new();
        let mut ctx = Context::new(self.stream_url(target), PROTOCOL_WEBSOCKET);
        self.middleware.execute(&mut ctx, &connect).await?;

        let socket = connect.socket.lock().take().ok_or_else(|| {
            FreighterError::Protocol("middleware completed without opening the stream".into())
        })?;
        let (sink, events) = split_socket(socket);

        Ok(ClientStream::new(
            sink,
            events,
            self.codec.clone(),
            self.registry.clone(),
            self.options,
        ))
    }
}

impl std::fmt::Debug for WebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketClient")
            .field("endpoint", &self.endpoint)
            .field("content_type", &self.codec.content_type())
            .field("middleware", &self.middleware)
            .field("options", &self.options)
            .finish()
    }
}

/// Terminal operation of a stream open
struct Connect {
    attempted: AtomicBool,
    socket: Mutex<Option<Socket>>,
}

impl Connect {
    fn new() -> Self {
        Self {
            attempted: AtomicBool::new(false),
            socket: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Finalizer for Connect {
    async fn finalize(&self, ctx: &mut Context) -> FreighterResult<()> {
        if self.attempted.swap(true, Ordering::AcqRel) {
            return Err(FreighterError::Protocol("stream already opened".into()));
        }

        let mut request = ctx
            .target
            .as_str()
            .into_client_request()
            .map_err(|e| FreighterError::Transport(format!("invalid stream address: {}", e)))?;

        for (name, value) in &ctx.params {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FreighterError::Transport(format!("invalid header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FreighterError::Transport(format!("invalid header value: {}", e)))?;
            request.headers_mut().insert(name, value);
        }

        let (socket, response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| {
                tracing::debug!(url = %ctx.target, error = %e, "stream handshake failed");
                FreighterError::Unreachable
            })?;
        tracing::debug!(url = %ctx.target, status = %response.status(), "stream handshake complete");

        *self.socket.lock() = Some(socket);
        Ok(())
    }
}
