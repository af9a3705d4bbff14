//! Logging setup shared by schemadoc binaries.
//!
//! The core library only emits `tracing` events; installing a subscriber is
//! left to the host, which can use [`init_logging`] for the default format.

use crate::Result;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity-derived filter.
pub const LOG_FILTER_ENV: &str = "SCHEMADOC_LOG";

/// Maps CLI verbosity flags to a maximum log level.
///
/// `quiet` wins over any verbosity: only errors are shown.
pub const fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Initializes structured logging based on verbosity level.
///
/// When [`LOG_FILTER_ENV`] is set it takes precedence, so individual
/// modules can be traced (`SCHEMADOC_LOG=schemadoc_core::adapters=trace`).
///
/// # Example
/// ```rust,no_run
/// use schemadoc_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = level_for(verbose, quiet);
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| {
            crate::error::SchemaDocError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
