//! Typed error registry
//!
//! Errors cross the wire as an [`ErrorPayload`]: a string discriminator plus
//! a string of data. The registry maps each discriminator to a provider that
//! knows how to encode and decode that kind of error, so a typed error sent by
//! a peer comes back out as the same typed error here.
//!
//! Three discriminators are reserved:
//!
//! | Kind | Meaning |
//! |------|---------|
//! | `nil` | no error |
//! | `unknown` | an error no provider was registered for; data holds a JSON dump |
//! | `freighter` | the library's own errors (`EOF`, `StreamClosed`, `Unreachable`) |

use crate::error::{FREIGHTER_KIND, FreighterError, RegistryError};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Discriminator for "no error"
pub const TYPE_NONE: &str = "nil";

/// Discriminator for errors without a registered provider
pub const TYPE_UNKNOWN: &str = "unknown";

type EncodeFn = Arc<dyn Fn(&FreighterError) -> Option<String> + Send + Sync>;
type DecodeFn = Arc<dyn Fn(&str) -> Option<FreighterError> + Send + Sync>;

/// Wire form of an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error discriminator
    #[serde(rename = "type")]
    pub kind: String,

    /// Provider-specific encoding of the error
    #[serde(default)]
    pub data: String,
}

impl ErrorPayload {
    /// Create a payload from a discriminator and data
    pub fn new(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }

    /// The payload meaning "no error"
    pub fn none() -> Self {
        Self::new(TYPE_NONE, "")
    }

    /// Check whether this payload carries no error
    pub fn is_none(&self) -> bool {
        self.kind == TYPE_NONE
    }
}

#[derive(Clone)]
struct Provider {
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Registry of error providers keyed by discriminator
///
/// Build one at startup, register every application error kind, then share
/// it behind an `Arc` with every client.
pub struct ErrorRegistry {
    providers: RwLock<HashMap<String, Provider>>,
}

impl ErrorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the library's own errors registered
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        // The map is empty, so the only possible failure cannot happen.
        let _ = registry.register(FREIGHTER_KIND, encode_builtin, decode_builtin);
        registry
    }

    /// Register a provider for an error kind
    ///
    /// `encode` returns `None` for errors the provider does not recognize,
    /// and `decode` returns `None` for data it cannot parse.
    ///
    /// Registering a kind twice is a programming error: the call fails and
    /// the first provider stays in place.
    pub fn register<E, D>(
        &self,
        kind: impl Into<String>,
        encode: E,
        decode: D,
    ) -> Result<(), RegistryError>
    where
        E: Fn(&FreighterError) -> Option<String> + Send + Sync + 'static,
        D: Fn(&str) -> Option<FreighterError> + Send + Sync + 'static,
    {
        let kind = kind.into();
        if kind == TYPE_NONE || kind == TYPE_UNKNOWN {
            tracing::error!(kind = %kind, "refusing to register reserved error type");
            return Err(RegistryError::Reserved(kind));
        }

        let mut providers = self.providers.write();
        if providers.contains_key(&kind) {
            tracing::error!(kind = %kind, "error type registered twice");
            return Err(RegistryError::AlreadyRegistered(kind));
        }

        tracing::debug!(kind = %kind, "registered error type");
        providers.insert(
            kind,
            Provider {
                encode: Arc::new(encode),
                decode: Arc::new(decode),
            },
        );
        Ok(())
    }

    /// Register a provider for a concrete application error type
    ///
    /// Encoded errors are wrapped as [`FreighterError::Typed`] under `kind`;
    /// callers get the concrete type back with [`FreighterError::downcast_ref`].
    pub fn register_typed<T, E, D>(
        &self,
        kind: impl Into<String>,
        encode: E,
        decode: D,
    ) -> Result<(), RegistryError>
    where
        T: std::error::Error + Send + Sync + 'static,
        E: Fn(&T) -> String + Send + Sync + 'static,
        D: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let decode_kind = kind.clone();
        self.register(
            kind,
            move |err: &FreighterError| err.downcast_ref::<T>().map(&encode),
            move |data: &str| decode(data).map(|e| FreighterError::typed(decode_kind.clone(), e)),
        )
    }

    /// Check whether a provider exists for `kind`
    pub fn contains(&self, kind: &str) -> bool {
        self.providers.read().contains_key(kind)
    }

    /// Encode an error (or its absence) into its wire form
    pub fn encode(&self, error: Option<&FreighterError>) -> ErrorPayload {
        let Some(error) = error else {
            return ErrorPayload::none();
        };

        if let FreighterError::Unknown(data) = error {
            return ErrorPayload::new(TYPE_UNKNOWN, data.clone());
        }

        if let Some(kind) = error.kind() {
            let provider = self.providers.read().get(kind).cloned();
            if let Some(data) = provider.and_then(|p| (p.encode)(error)) {
                return ErrorPayload::new(kind, data);
            }
        }

        ErrorPayload::new(TYPE_UNKNOWN, dump(error))
    }

    /// Decode a wire payload back into an error
    ///
    /// Returns `Ok(None)` for the "no error" payload. Kinds without a
    /// provider decode as [`FreighterError::Unknown`] carrying the data
    /// verbatim, the same as an explicit `unknown` payload.
    pub fn decode(&self, payload: &ErrorPayload) -> Result<Option<FreighterError>, RegistryError> {
        match payload.kind.as_str() {
            TYPE_NONE => return Ok(None),
            TYPE_UNKNOWN => return Ok(Some(FreighterError::Unknown(payload.data.clone()))),
            _ => {}
        }

        let provider = self.providers.read().get(&payload.kind).cloned();
        let Some(provider) = provider else {
            tracing::debug!(kind = %payload.kind, "no provider for error type, treating as unknown");
            return Ok(Some(FreighterError::Unknown(payload.data.clone())));
        };

        match (provider.decode)(&payload.data) {
            Some(error) => Ok(Some(error)),
            None => Err(RegistryError::Undecodable {
                kind: payload.kind.clone(),
                data: payload.data.clone(),
            }),
        }
    }
}

impl Default for ErrorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self.providers.read();
        let mut kinds: Vec<&String> = providers.keys().collect();
        kinds.sort();
        f.debug_struct("ErrorRegistry").field("kinds", &kinds).finish()
    }
}

fn dump(error: &FreighterError) -> String {
    let message = error.to_string();
    serde_json::to_string(&message).unwrap_or(message)
}

fn encode_builtin(error: &FreighterError) -> Option<String> {
    match error {
        FreighterError::Eof => Some("EOF".to_string()),
        FreighterError::StreamClosed => Some("StreamClosed".to_string()),
        FreighterError::Unreachable => Some("Unreachable".to_string()),
        _ => None,
    }
}

fn decode_builtin(data: &str) -> Option<FreighterError> {
    match data {
        "EOF" => Some(FreighterError::Eof),
        "StreamClosed" => Some(FreighterError::StreamClosed),
        "Unreachable" => Some(FreighterError::Unreachable),
        _ => None,
    }
}
