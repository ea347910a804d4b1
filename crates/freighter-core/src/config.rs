//! Client configuration types

use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the unary and streaming clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host name or address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use TLS (`https`/`wss`)
    #[serde(default)]
    pub secure: bool,

    /// Path segment placed before every call target
    #[serde(default)]
    pub path_prefix: String,

    /// Content type of the wire codec
    #[serde(default = "default_content_type")]
    pub content_type: String,

    /// Initial log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of each stream's inbound message queue
    ///
    /// `None` leaves the queue unbounded. With a bound, a consumer that falls
    /// behind stops the socket from being read until it catches up.
    #[serde(default)]
    pub receive_buffer: Option<usize>,

    /// Deadline for a single stream receive, in milliseconds
    #[serde(default)]
    pub receive_timeout_ms: Option<u64>,

    /// Deadline for a single unary request, in milliseconds
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9090
}

fn default_content_type() -> String {
    "application/msgpack".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            secure: false,
            path_prefix: String::new(),
            content_type: default_content_type(),
            log_level: default_log_level(),
            receive_buffer: None,
            receive_timeout_ms: None,
            request_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }

    /// Set the server host and port
    pub fn with_address(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the path prefix
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Set the codec content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Bound each stream's inbound queue
    pub fn with_receive_buffer(mut self, capacity: usize) -> Self {
        self.receive_buffer = Some(capacity);
        self
    }

    /// Base address for unary calls, e.g. `http://localhost:9090/api`
    pub fn http_endpoint(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        self.endpoint(scheme)
    }

    /// Base address for streams, e.g. `ws://localhost:9090/api`
    pub fn ws_endpoint(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        self.endpoint(scheme)
    }

    /// Receive deadline, if configured
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.receive_timeout_ms.map(Duration::from_millis)
    }

    /// Request deadline, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Parsed log level; unrecognized values fall back to `Info`
    pub fn log_level(&self) -> LogLevel {
        self.log_level.parse().unwrap_or(LogLevel::Info)
    }

    fn endpoint(&self, scheme: &str) -> String {
        let prefix = self.path_prefix.trim_matches('/');
        if prefix.is_empty() {
            format!("{}://{}:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}/{}", scheme, self.host, self.port, prefix)
        }
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
