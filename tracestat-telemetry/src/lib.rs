//! # tracestat Telemetry
//!
//! Log subscriber setup and Prometheus metrics for analysis and replay runs.

pub mod logging;
pub mod metrics;

pub use logging::{EventLogger, TelemetryError};
pub use metrics::MetricsRecorder;
