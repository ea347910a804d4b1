//! Stream message framing
//!
//! Every frame on a stream carries exactly one [`Message`], tagged by `type`:
//!
//! ```json
//! { "type": "data",  "payload": <T> }
//! { "type": "close", "error": { "type": "<kind>", "data": "<string>" } }
//! ```

use freighter_core::ErrorPayload;
use serde::{Deserialize, Serialize};

/// Streaming wire envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message<T> {
    /// One application message
    Data { payload: T },

    /// End of one direction of the stream
    ///
    /// A client half-close carries no error. A server close always carries
    /// one, even if it is only the end-of-stream sentinel.
    Close {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorPayload>,
    },
}

impl<T> Message<T> {
    /// Create a data message
    pub fn data(payload: T) -> Self {
        Message::Data { payload }
    }

    /// Create a close message carrying an error
    pub fn close(error: ErrorPayload) -> Self {
        Message::Close { error: Some(error) }
    }

    /// Create the close message a client sends when it stops sending
    pub fn close_send() -> Self {
        Message::Close { error: None }
    }

    /// Check if this is a close message
    pub fn is_close(&self) -> bool {
        matches!(self, Message::Close { .. })
    }
}
