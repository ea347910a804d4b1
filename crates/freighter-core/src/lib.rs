//! freighter-core - Error registry, middleware chain, and shared types
//!
//! This crate provides the foundational types shared by freighter clients:
//! - [`FreighterError`] for error handling
//! - [`ErrorRegistry`] for carrying typed errors across the wire
//! - [`Middleware`] and [`MiddlewareCollector`] for cross-cutting call concerns
//! - [`ClientConfig`] for client configuration

mod config;
mod error;
mod middleware;
mod registry;

pub use config::ClientConfig;
pub use error::{FREIGHTER_KIND, FreighterError, FreighterResult, RegistryError, SharedError};
pub use middleware::{
    Context, Finalizer, HeaderMiddleware, LoggingMiddleware, Middleware, MiddlewareCollector, Next,
};
pub use registry::{ErrorPayload, ErrorRegistry, TYPE_NONE, TYPE_UNKNOWN};

/// Log verbosity, most verbose first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ClientConfig, Context, ErrorPayload, ErrorRegistry, Finalizer, FreighterError,
        FreighterResult, LogLevel, Middleware, MiddlewareCollector, Next,
    };
}
