//! freighter-logging - Tracing subscriber setup for freighter applications
//!
//! This crate provides:
//! - [`init_logging`] to install a `fmt` subscriber behind a reloadable level
//! - [`ReloadHandle`] to change the active level at runtime
//!
//! The client crates only emit `tracing` events; installing a subscriber is
//! left to the application, which may use this crate or its own setup.

mod reload;
mod subscriber;

pub use freighter_core::LogLevel;
pub use reload::{LoggingError, ReloadHandle};
pub use subscriber::{init_from_config, init_logging};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, ReloadHandle, init_from_config, init_logging};
}
