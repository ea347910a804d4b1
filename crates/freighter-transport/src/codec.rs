//! Codec trait with JSON and MessagePack implementations
//!
//! Every codec works in two steps. Application values are first lowered to a
//! [`serde_json::Value`], which is where key case-folding happens, and the
//! value is then written in the codec's own byte format. Decoding runs the same
//! steps backwards and finishes by deserializing into the caller's type, which
//! is the schema check: bytes that parse but do not fit the type are a
//! [`CodecError::Validation`], not a format error.

use crate::case::KeyCase;
use freighter_core::FreighterError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Content type of [`JsonCodec`]
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type of [`MsgpackCodec`]
pub const CONTENT_TYPE_MSGPACK: &str = "application/msgpack";

/// Failure to turn a payload into bytes or back
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Payload is well-formed but does not match the expected type
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CodecError::Deserialization(err.to_string())
        } else {
            CodecError::Serialization(err.to_string())
        }
    }
}

impl From<rmp_serde::encode::Error> for CodecError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for CodecError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        CodecError::Deserialization(err.to_string())
    }
}

impl From<CodecError> for FreighterError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Validation(msg) => FreighterError::Validation(msg),
            other => FreighterError::Serialization(other.to_string()),
        }
    }
}

/// A wire format for payloads
///
/// The trait is object safe so one codec can be shared as `Arc<dyn Codec>`;
/// the typed entry points live on [`CodecExt`].
pub trait Codec: Send + Sync {
    /// MIME type announced for this format
    fn content_type(&self) -> &'static str;

    /// Key transform applied between application and wire form
    fn key_case(&self) -> KeyCase {
        KeyCase::Identity
    }

    /// Write a wire-form value as bytes
    fn encode_value(&self, value: &Value) -> Result<Vec<u8>, CodecError>;

    /// Read bytes into a wire-form value
    fn decode_value(&self, data: &[u8]) -> Result<Value, CodecError>;
}

/// Typed encoding and decoding for every [`Codec`]
pub trait CodecExt: Codec {
    /// Encode a value to bytes, folding keys to the wire convention
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let value = serde_json::to_value(value)
            .map_err(|e| CodecError::Serialization(e.to_string()))?;
        self.encode_value(&self.key_case().to_wire(value)?)
    }

    /// Decode bytes to a value of type `T`
    ///
    /// Format errors are [`CodecError::Deserialization`]; a payload that does
    /// not fit `T` is [`CodecError::Validation`].
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        let value = self.key_case().from_wire(self.decode_value(data)?);
        validate(value)
    }
}

impl<C: Codec + ?Sized> CodecExt for C {}

/// Deserialize an application-form value into `T`
///
/// Used directly when a payload is extracted from an already decoded envelope.
pub fn validate<T: DeserializeOwned>(value: Value) -> Result<T, CodecError> {
    serde_json::from_value(value).map_err(|e| CodecError::Validation(e.to_string()))
}

/// JSON wire format
#[derive(Debug, Clone, Default)]
pub struct JsonCodec {
    /// Indent output for humans
    pretty: bool,
    key_case: KeyCase,
}

impl JsonCodec {
    /// Create a new JSON codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON codec that pretty-prints output
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Set the key transform
    pub fn with_key_case(mut self, key_case: KeyCase) -> Self {
        self.key_case = key_case;
        self
    }

    /// Encode a value directly to a JSON string
    pub fn encode_string<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let bytes = self.encode(value)?;
        String::from_utf8(bytes).map_err(|e| CodecError::InvalidFormat(e.to_string()))
    }

    /// Decode a JSON string to a value
    pub fn decode_str<T: DeserializeOwned>(&self, data: &str) -> Result<T, CodecError> {
        self.decode(data.as_bytes())
    }
}

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE_JSON
    }

    fn key_case(&self) -> KeyCase {
        self.key_case
    }

    fn encode_value(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        if self.pretty {
            serde_json::to_vec_pretty(value).map_err(Into::into)
        } else {
            serde_json::to_vec(value).map_err(Into::into)
        }
    }

    fn decode_value(&self, data: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(data).map_err(Into::into)
    }
}

/// MessagePack codec implementation using rmp-serde
#[derive(Debug, Clone, Default)]
pub struct MsgpackCodec {
    key_case: KeyCase,
}

impl MsgpackCodec {
    /// Create a new MessagePack codec
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key transform
    pub fn with_key_case(mut self, key_case: KeyCase) -> Self {
        self.key_case = key_case;
        self
    }
}

impl Codec for MsgpackCodec {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE_MSGPACK
    }

    fn key_case(&self) -> KeyCase {
        self.key_case
    }

    fn encode_value(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        rmp_serde::to_vec(value).map_err(Into::into)
    }

    fn decode_value(&self, data: &[u8]) -> Result<Value, CodecError> {
        if data.is_empty() {
            return Err(CodecError::InvalidFormat("empty payload".to_string()));
        }
        rmp_serde::from_slice(data).map_err(Into::into)
    }
}

/// Look up a built-in codec by content type
///
/// Media type parameters (`; charset=utf-8`) and case are ignored.
pub fn codec_for(content_type: &str) -> Option<Arc<dyn Codec>> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        CONTENT_TYPE_JSON => Some(Arc::new(JsonCodec::new())),
        CONTENT_TYPE_MSGPACK | "application/x-msgpack" => Some(Arc::new(MsgpackCodec::new())),
        _ => None,
    }
}
