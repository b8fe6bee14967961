use thiserror::Error;
use tracestat_core::FlowTableError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    FlowTable(#[from] FlowTableError),

    #[error("Invalid epoch duration {0} ns (must be greater than zero)")]
    InvalidEpochDuration(i64),

    #[error("Invalid flow TTL {0} ns (must be greater than zero)")]
    InvalidTtl(i64),

    #[error("Invalid progress interval (must be greater than zero)")]
    InvalidProgressInterval,
}
