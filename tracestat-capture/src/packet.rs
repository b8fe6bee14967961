//! Per-packet records produced by [`TraceReader`](crate::reader::TraceReader).

use bytes::Bytes;
use tracestat_core::TimeNs;
use tracestat_protocols::FlowKey;

pub const CRC_LEN: u32 = 4;
pub const PREAMBLE_LEN: u32 = 8;
pub const INTER_PACKET_GAP_LEN: u32 = 12;
pub const ETHERNET_HEADER_LEN: u32 = 14;

/// Metadata of one packet of a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedPacket {
    /// Capture timestamp in nanoseconds.
    pub timestamp_ns: TimeNs,
    /// Frame length on the wire, Ethernet header and CRC included.
    pub wire_len: u32,
    /// Bytes of recognised headers.
    pub header_len: usize,
    pub flow: Option<FlowKey>,
}

/// A raw frame, as needed to put it back on a wire.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub timestamp_ns: TimeNs,
    pub wire_len: u32,
    pub data: Bytes,
}

impl RawFrame {
    pub fn new(timestamp_ns: TimeNs, wire_len: u32, data: Vec<u8>) -> Self {
        RawFrame {
            timestamp_ns,
            wire_len,
            data: Bytes::from(data),
        }
    }

    /// Bytes the frame occupies on an Ethernet link, counting preamble and
    /// inter-packet gap.
    pub fn link_occupancy(&self) -> u64 {
        u64::from(self.wire_len) + u64::from(PREAMBLE_LEN) + u64::from(INTER_PACKET_GAP_LEN)
    }
}
