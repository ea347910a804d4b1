//! Error types for freighter clients

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for freighter operations
pub type FreighterResult<T> = Result<T, FreighterError>;

/// Shared, type-erased application error carried by [`FreighterError::Typed`]
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for every client operation
///
/// Errors are cheap to clone so that a terminal stream error can be handed
/// back on every subsequent receive.
#[derive(Error, Debug, Clone)]
pub enum FreighterError {
    /// The peer finished the stream cleanly
    #[error("EOF")]
    Eof,

    /// The stream was closed, either locally or abnormally by the peer
    #[error("StreamClosed")]
    StreamClosed,

    /// The peer could not be reached
    #[error("Unreachable")]
    Unreachable,

    /// Application error decoded by a registered provider
    #[error("{inner}")]
    Typed { kind: String, inner: SharedError },

    /// Error whose kind this process has no decoder for; holds the raw data
    #[error("unknown error: {0}")]
    Unknown(String),

    /// Payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Payload decoded but did not match the expected schema
    #[error("validation error: {0}")]
    Validation(String),

    /// Peer violated the message protocol
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Transport-level failure other than an unreachable peer
    #[error("transport error: {0}")]
    Transport(String),

    /// A configured deadline elapsed
    #[error("operation timed out")]
    Timeout,

    /// Client configuration cannot be used
    #[error("configuration error: {0}")]
    Config(String),

    /// Error registry misuse or an undecodable registered payload
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Wire discriminator of the library's own errors
pub const FREIGHTER_KIND: &str = "freighter";

impl FreighterError {
    /// Wrap an application error under a wire discriminator
    pub fn typed<E>(kind: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FreighterError::Typed {
            kind: kind.into(),
            inner: Arc::new(error),
        }
    }

    /// The wire discriminator this error encodes under, if it has one
    pub fn kind(&self) -> Option<&str> {
        match self {
            FreighterError::Eof | FreighterError::StreamClosed | FreighterError::Unreachable => {
                Some(FREIGHTER_KIND)
            }
            FreighterError::Typed { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Borrow the concrete application error behind a [`FreighterError::Typed`]
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            FreighterError::Typed { inner, .. } => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Whether this error ends a stream for good
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            FreighterError::Serialization(_)
                | FreighterError::Validation(_)
                | FreighterError::Timeout
        )
    }
}

impl PartialEq for FreighterError {
    fn eq(&self, other: &Self) -> bool {
        use FreighterError::*;
        match (self, other) {
            (Eof, Eof) | (StreamClosed, StreamClosed) | (Unreachable, Unreachable) => true,
            (Timeout, Timeout) => true,
            (Typed { kind: a, inner: x }, Typed { kind: b, inner: y }) => {
                a == b && x.to_string() == y.to_string()
            }
            (Unknown(a), Unknown(b))
            | (Serialization(a), Serialization(b))
            | (Validation(a), Validation(b))
            | (Protocol(a), Protocol(b))
            | (Transport(a), Transport(b))
            | (Config(a), Config(b)) => a == b,
            (Registry(a), Registry(b)) => a == b,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for FreighterError {
    fn from(err: serde_json::Error) -> Self {
        FreighterError::Serialization(err.to_string())
    }
}

/// Error registry failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A provider for this kind already exists
    #[error("error type already registered: {0}")]
    AlreadyRegistered(String),

    /// The kind is reserved by the wire protocol
    #[error("error type is reserved: {0}")]
    Reserved(String),

    /// The registered provider rejected the payload
    #[error("cannot decode {kind} error from data: {data}")]
    Undecodable { kind: String, data: String },
}
