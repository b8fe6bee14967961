use thiserror::Error;
use tokio::task::JoinError;

use tracestat_analysis::AnalysisError;
use tracestat_capture::CaptureError;
use tracestat_config::ConfigError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Trace error: {0}")]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Report hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Worker task failed: {0}")]
    Task(String),
}

impl From<JoinError> for EngineError {
    fn from(err: JoinError) -> Self {
        EngineError::Task(err.to_string())
    }
}
