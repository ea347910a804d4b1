//! Dynamic log level reloading support

use freighter_core::LogLevel;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::reload;

type FilterHandle = reload::Handle<LevelFilter, tracing_subscriber::Registry>;

/// Errors from logging setup and level changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// `init_logging` has not installed a subscriber yet
    #[error("logging has not been initialized")]
    NotInitialized,

    /// Another global subscriber was installed first
    #[error("a global tracing subscriber is already installed: {0}")]
    SubscriberInstalled(String),

    /// The subscriber rejected the new filter
    #[error("failed to reload filter: {0}")]
    Reload(String),
}

struct State {
    handle: FilterHandle,
    level: LogLevel,
}

/// Handle for dynamically reloading the log level filter
pub struct ReloadHandle {
    state: Mutex<Option<State>>,
}

impl ReloadHandle {
    /// Create a new reload handle
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Get the global reload handle
    pub fn global() -> &'static ReloadHandle {
        static INSTANCE: OnceCell<ReloadHandle> = OnceCell::new();
        INSTANCE.get_or_init(ReloadHandle::new)
    }

    /// Check whether a subscriber has been attached to this handle
    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_some()
    }

    /// Level currently in effect, if initialized
    pub fn current_level(&self) -> Option<LogLevel> {
        self.state.lock().as_ref().map(|s| s.level)
    }

    /// Run `install` unless a handle is already attached
    ///
    /// Returns `Ok(false)` when a subscriber was already attached.
    pub(crate) fn install_once<F>(&self, install: F) -> Result<bool, LoggingError>
    where
        F: FnOnce() -> Result<(FilterHandle, LogLevel), LoggingError>,
    {
        let mut state = self.state.lock();
        if state.is_some() {
            return Ok(false);
        }
        let (handle, level) = install()?;
        *state = Some(State { handle, level });
        Ok(true)
    }

    /// Reload the filter to use a new log level
    pub fn reload_level(&self, level: LogLevel) -> Result<(), LoggingError> {
        let mut guard = self.state.lock();
        let state = guard.as_mut().ok_or(LoggingError::NotInitialized)?;
        state
            .handle
            .reload(level_filter(level))
            .map_err(|e| LoggingError::Reload(e.to_string()))?;
        state.level = level;
        Ok(())
    }
}

impl Default for ReloadHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert LogLevel to tracing LevelFilter
pub(crate) fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Off => LevelFilter::OFF,
    }
}

#[cfg(test)]
#[path = "reload/reload_tests.rs"]
mod reload_tests;
