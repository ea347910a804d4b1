//! Stream state machine

use serde::{Deserialize, Serialize};

/// Lifecycle of a client stream
///
/// State transitions:
/// ```text
/// Open → SendClosed → Closed
///   │                   ↑
///   └───────────────────┘ (peer closes first)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    /// Both directions are open
    #[default]
    Open,
    /// This side stopped sending; the peer may still send
    SendClosed,
    /// The peer closed the stream or the connection dropped
    Closed,
}

impl StreamState {
    /// Check if this state can transition to the target state
    pub fn can_transition_to(&self, target: StreamState) -> bool {
        use StreamState::*;
        matches!(
            (self, target),
            (Open, SendClosed) | (SendClosed, Closed) | (Open, Closed)
        )
    }

    /// Check if data messages may be sent in this state
    pub fn can_send(&self) -> bool {
        matches!(self, StreamState::Open)
    }

    /// Check if the stream has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Closed)
    }
}

impl std::fmt::Display for StreamState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamState::Open => write!(f, "Open"),
            StreamState::SendClosed => write!(f, "SendClosed"),
            StreamState::Closed => write!(f, "Closed"),
        }
    }
}
