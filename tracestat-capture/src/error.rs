use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Trace file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unknown trace format (signature {0:02x?})")]
    UnknownFormat(Vec<u8>),

    #[error("{0} traces are not supported")]
    UnsupportedFormat(&'static str),

    #[error("Unsupported link-layer header type {0}")]
    UnsupportedLinkType(i32),

    #[error("Invalid replay rate (must be greater than zero)")]
    InvalidRate,

    #[error("Device '{0}' not found")]
    DeviceNotFound(String),

    #[error("Decompression failed: {0}")]
    Decompression(#[source] std::io::Error),

    #[error("libpcap error: {0}")]
    Pcap(#[from] pcap::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
