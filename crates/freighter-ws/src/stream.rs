//! Client side of a bidirectional message stream
//!
//! A [`ClientStream`] owns one connection. A single reader task consumes the
//! socket's events, decodes each frame and pushes the result onto the
//! inbound queue; [`ClientStream::receive`] pops from that queue. Callers
//! waiting in `receive` line up on a fair lock, so a message that arrives
//! while someone is waiting goes to the caller that has waited longest, and a
//! message that arrives while nobody is waiting stays queued. Either way the
//! arrival order is the receive order.
//!
//! Terminal conditions are recorded twice. The reader records the error as
//! soon as it sees it, which closes the stream for [`ClientStream::send`] and
//! [`ClientStream::state`]. `receive` records it again when it reaches it in
//! the queue, so messages that arrived before the close are still delivered,
//! and from then on every `receive` returns that same error.

use crate::socket::{CLOSE_ABNORMAL, FrameSink, SocketEvent, SocketEvents, close_code_error};
use crate::state::StreamState;
use freighter_core::{ClientConfig, ErrorRegistry, FreighterError, FreighterResult};
use freighter_transport::{Codec, CodecExt, Message, validate};
use futures_util::StreamExt;
use once_cell::sync::OnceCell;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

/// Per-stream tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Inbound queue capacity; `None` is unbounded
    ///
    /// When the queue is full the reader stops reading the socket until a
    /// receiver catches up.
    pub receive_buffer: Option<usize>,

    /// Deadline for each `receive`
    pub receive_timeout: Option<Duration>,
}

impl StreamOptions {
    /// Options taken from client configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            receive_buffer: config.receive_buffer,
            receive_timeout: config.receive_timeout(),
        }
    }
}

/// One entry of the inbound queue
enum Inbound<RS> {
    Data(RS),
    /// A frame that could not be decoded; the stream stays open
    Invalid(FreighterError),
    /// The stream ended; nothing follows
    Terminal(FreighterError),
}

enum InboundTx<RS> {
    Bounded(mpsc::Sender<Inbound<RS>>),
    Unbounded(mpsc::UnboundedSender<Inbound<RS>>),
}

impl<RS> InboundTx<RS> {
    /// Returns false once the stream has been dropped
    async fn push(&self, item: Inbound<RS>) -> bool {
        match self {
            InboundTx::Bounded(tx) => tx.send(item).await.is_ok(),
            InboundTx::Unbounded(tx) => tx.send(item).is_ok(),
        }
    }
}

enum InboundRx<RS> {
    Bounded(mpsc::Receiver<Inbound<RS>>),
    Unbounded(mpsc::UnboundedReceiver<Inbound<RS>>),
}

impl<RS> InboundRx<RS> {
    async fn recv(&mut self) -> Option<Inbound<RS>> {
        match self {
            InboundRx::Bounded(rx) => rx.recv().await,
            InboundRx::Unbounded(rx) => rx.recv().await,
        }
    }
}

fn inbound_queue<RS>(capacity: Option<usize>) -> (InboundTx<RS>, InboundRx<RS>) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (InboundTx::Bounded(tx), InboundRx::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (InboundTx::Unbounded(tx), InboundRx::Unbounded(rx))
        }
    }
}

/// An open stream sending `RQ` and receiving `RS`
pub struct ClientStream<RQ, RS> {
    stream_id: Uuid,
    codec: Arc<dyn Codec>,
    sink: Mutex<Box<dyn FrameSink>>,
    send_closed: AtomicBool,
    /// Set by the reader when the stream ends
    closed: Arc<OnceCell<FreighterError>>,
    /// Set by `receive` once the terminal error has been delivered
    terminal: OnceCell<FreighterError>,
    inbound: Mutex<InboundRx<RS>>,
    reader: JoinHandle<()>,
    receive_timeout: Option<Duration>,
    _request: PhantomData<fn(&RQ)>,
}

impl<RQ, RS> ClientStream<RQ, RS>
where
    RQ: Serialize,
    RS: DeserializeOwned + Send + 'static,
{
    /// Start a stream over an already open connection
    ///
    /// Spawns the reader task, so this must be called within a tokio runtime.
    pub fn new(
        sink: Box<dyn FrameSink>,
        events: SocketEvents,
        codec: Arc<dyn Codec>,
        registry: Arc<ErrorRegistry>,
        options: StreamOptions,
    ) -> Self {
        let stream_id = Uuid::new_v4();
        let closed = Arc::new(OnceCell::new());
        let (tx, rx) = inbound_queue(options.receive_buffer);

        let reader = Reader {
            codec: codec.clone(),
            registry,
            closed: closed.clone(),
            tx,
        };
        let span = tracing::debug_span!("stream_reader", %stream_id);
        let reader = tokio::spawn(reader.run(events).instrument(span));
        tracing::debug!(%stream_id, "stream opened");

        Self {
            stream_id,
            codec,
            sink: Mutex::new(sink),
            send_closed: AtomicBool::new(false),
            closed,
            terminal: OnceCell::new(),
            inbound: Mutex::new(rx),
            reader,
            receive_timeout: options.receive_timeout,
            _request: PhantomData,
        }
    }

    /// Identifier of this stream in log output
    pub fn stream_id(&self) -> Uuid {
        self.stream_id
    }

    /// Current state
    pub fn state(&self) -> StreamState {
        if self.terminal_error().is_some() {
            StreamState::Closed
        } else if self.send_closed.load(Ordering::Acquire) {
            StreamState::SendClosed
        } else {
            StreamState::Open
        }
    }

    /// Send one message
    ///
    /// Fails with the terminal error once the peer has closed, and with
    /// [`FreighterError::StreamClosed`] after [`close_send`](Self::close_send).
    /// Returns once the frame is written; there is no acknowledgment.
    pub async fn send(&self, value: &RQ) -> FreighterResult<()> {
        if !self.state().can_send() {
            return Err(self
                .terminal_error()
                .cloned()
                .unwrap_or(FreighterError::StreamClosed));
        }

        let frame = self.codec.encode(&Message::data(value))?;
        self.sink.lock().await.send_frame(frame).await
    }

    /// Stop sending
    ///
    /// Writes a close message on the first call. Later calls, and calls after
    /// the peer has closed, do nothing. The stream counts as send-closed even
    /// if the close message could not be written.
    pub async fn close_send(&self) {
        if !self.state().can_transition_to(StreamState::SendClosed) {
            return;
        }
        // Two callers can both pass the state check; only one writes.
        if self.send_closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let stream_id = self.stream_id;
        let frame = match self.codec.encode(&Message::<Value>::close_send()) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(%stream_id, error = %err, "could not encode close message");
                return;
            }
        };
        match self.sink.lock().await.send_frame(frame).await {
            Ok(()) => tracing::debug!(%stream_id, "send side closed"),
            Err(err) => tracing::warn!(%stream_id, error = %err, "could not write close message"),
        }
    }

    /// Receive the next message
    ///
    /// Waits until a message arrives, the stream ends, or the configured
    /// receive timeout elapses. Frames that fail to decode are returned as
    /// [`FreighterError::Serialization`] or [`FreighterError::Validation`]
    /// and leave the stream open. Once the stream has ended, every call
    /// returns the same terminal error.
    pub async fn receive(&self) -> FreighterResult<RS> {
        if let Some(err) = self.terminal.get() {
            return Err(err.clone());
        }

        let mut inbound = self.inbound.lock().await;
        // Another receiver may have reached the end while this one waited.
        if let Some(err) = self.terminal.get() {
            return Err(err.clone());
        }

        let next = match self.receive_timeout {
            Some(timeout) => tokio::time::timeout(timeout, inbound.recv())
                .await
                .map_err(|_| FreighterError::Timeout)?,
            None => inbound.recv().await,
        };

        match next {
            Some(Inbound::Data(value)) => Ok(value),
            Some(Inbound::Invalid(err)) => Err(err),
            Some(Inbound::Terminal(err)) => Err(self.terminal.get_or_init(|| err).clone()),
            None => {
                // Reader stopped without a terminal entry (aborted or panicked).
                let err = self
                    .closed
                    .get()
                    .cloned()
                    .unwrap_or(FreighterError::StreamClosed);
                Err(self.terminal.get_or_init(|| err).clone())
            }
        }
    }

    /// Close the connection without waiting for the peer
    ///
    /// Messages already queued can still be received; after them `receive`
    /// returns [`FreighterError::StreamClosed`].
    pub async fn close(&self) {
        self.close_send().await;
        let _ = self.closed.set(FreighterError::StreamClosed);
        self.reader.abort();
        if let Err(err) = self.sink.lock().await.close().await {
            tracing::debug!(stream_id = %self.stream_id, error = %err, "socket close failed");
        }
    }

    fn terminal_error(&self) -> Option<&FreighterError> {
        self.terminal.get().or_else(|| self.closed.get())
    }
}

impl<RQ, RS> Drop for ClientStream<RQ, RS> {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl<RQ, RS> std::fmt::Debug for ClientStream<RQ, RS>
where
    RQ: Serialize,
    RS: DeserializeOwned + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientStream")
            .field("stream_id", &self.stream_id)
            .field("content_type", &self.codec.content_type())
            .field("state", &self.state())
            .field("closed", &self.closed.get())
            .finish()
    }
}

/// The task that turns socket events into inbound queue entries
struct Reader<RS> {
    codec: Arc<dyn Codec>,
    registry: Arc<ErrorRegistry>,
    closed: Arc<OnceCell<FreighterError>>,
    tx: InboundTx<RS>,
}

impl<RS: DeserializeOwned> Reader<RS> {
    async fn run(self, mut events: SocketEvents) {
        loop {
            let event = events
                .next()
                .await
                .unwrap_or(SocketEvent::Closed(CLOSE_ABNORMAL));

            let item = match event {
                SocketEvent::Frame(frame) => self.decode(&frame),
                SocketEvent::Closed(code) => {
                    tracing::debug!(code, "connection closed");
                    Inbound::Terminal(close_code_error(code))
                }
            };

            let done = match &item {
                Inbound::Terminal(err) => {
                    let _ = self.closed.set(err.clone());
                    true
                }
                _ => false,
            };

            if !self.tx.push(item).await || done {
                break;
            }
        }
    }

    fn decode(&self, frame: &[u8]) -> Inbound<RS> {
        let message = match self.codec.decode::<Message<Value>>(frame) {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(error = %err, "undecodable frame");
                return Inbound::Invalid(err.into());
            }
        };

        match message {
            Message::Data { payload } => match validate::<RS>(payload) {
                Ok(value) => Inbound::Data(value),
                Err(err) => Inbound::Invalid(err.into()),
            },
            Message::Close { error: None } => Inbound::Terminal(FreighterError::Protocol(
                "close message without an error".to_string(),
            )),
            Message::Close { error: Some(payload) } => {
                tracing::debug!(kind = %payload.kind, "peer closed stream");
                let err = match self.registry.decode(&payload) {
                    Ok(Some(err)) => err,
                    Ok(None) => FreighterError::Protocol(
                        "close message carried an empty error".to_string(),
                    ),
                    Err(err) => err.into(),
                };
                Inbound::Terminal(err)
            }
        }
    }
}
