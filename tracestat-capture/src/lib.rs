//! tracestat‑capture
//!
//! Offline trace decoding and trace replay for tracestat.
//!
//! - `reader`: pcap and zstd-compressed pcap files through libpcap
//! - `replay`: re-injects a trace at a fixed synthetic bit rate
//! - `packet`: per-packet records handed to the analysis

pub mod error;
pub mod format;
pub mod packet;
pub mod reader;
pub mod replay;

#[cfg(any(test, feature = "test-util"))]
pub mod fixture;

pub use error::CaptureError;
pub use format::TraceFormat;
pub use packet::{CapturedPacket, RawFrame};
pub use reader::TraceReader;
pub use replay::{InterfaceSink, PacketSink, RatePacer, ReplayStats, Replayer};
