//! freighter-transport - Wire codecs and stream message framing
//!
//! This crate provides:
//! - [`Codec`] trait for encoding/decoding messages, with [`CodecExt`] for typed values
//! - [`JsonCodec`] and [`MsgpackCodec`] implementations
//! - [`KeyCase`] for folding keys between application and wire naming
//! - [`Message`] for stream message framing

pub mod case;
mod codec;
mod envelope;

pub use case::KeyCase;
pub use codec::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_MSGPACK, Codec, CodecError, CodecExt, JsonCodec, MsgpackCodec,
    codec_for, validate,
};
pub use envelope::Message;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Codec, CodecError, CodecExt, JsonCodec, KeyCase, Message, MsgpackCodec, codec_for,
    };
}
