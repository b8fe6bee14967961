//! ## tracestat-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Installs a formatted subscriber. `RUST_LOG` overrides the configured
//! default level, so a single run can be made verbose without touching the
//! configuration file.

use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Logger already installed: {0}")]
    AlreadyInstalled(String),
}

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Builds the filter used by [`EventLogger::init`].
    pub fn filter(default_level: &str) -> Result<EnvFilter, TelemetryError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Self::default_filter(default_level),
        }
    }

    fn default_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_new(directives)
            .map_err(|_| TelemetryError::InvalidFilter(directives.to_string()))
    }

    /// Installs the global subscriber, logging to stderr so that stdout stays
    /// free for piping reports.
    pub fn init(default_level: &str) -> Result<(), TelemetryError> {
        fmt()
            .with_env_filter(Self::filter(default_level)?)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))
    }

    /// One-line summary of a finished run.
    pub fn log_run_summary(command: &str, packets: u64, elapsed_ms: u128) {
        info!(
            command = command,
            packets = packets,
            elapsed_ms = elapsed_ms as u64,
            "run finished"
        );
    }
}
