//! Global subscriber installation

use crate::reload::{LoggingError, ReloadHandle, level_filter};
use freighter_core::{ClientConfig, LogLevel};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload};

/// Initialize logging at `level`
///
/// Installs a global `tracing` subscriber that writes formatted events to
/// stderr. The level can be changed later through [`ReloadHandle::global`].
/// `RUST_LOG` directives, when set, further narrow which targets are shown.
///
/// Calling this again after a successful install only changes the level.
pub fn init_logging(level: LogLevel) -> Result<(), LoggingError> {
    let installed = ReloadHandle::global().install_once(|| {
        let (filter, handle) = reload::Layer::new(level_filter(level));
        let targets =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"));

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_filter(targets))
            .try_init()
            .map_err(|e| LoggingError::SubscriberInstalled(e.to_string()))?;

        Ok((handle, level))
    })?;

    if !installed {
        ReloadHandle::global().reload_level(level)?;
    }
    tracing::debug!(%level, "logging initialized");
    Ok(())
}

/// Initialize logging at the level named in `config`
pub fn init_from_config(config: &ClientConfig) -> Result<(), LoggingError> {
    init_logging(config.log_level())
}
