//! ## tracestat-capture::replay
//! **Rate-shaped trace replay**
//!
//! Frames are read back from a trace and handed to a [`PacketSink`] at a
//! synthetic line rate. Original capture timestamps are ignored: each frame
//! is followed by the time it would occupy an Ethernet link of the configured
//! speed, preamble and inter-packet gap included.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use pcap::{Active, Capture, Device};
use tracing::{debug, info};

use crate::error::CaptureError;
use crate::packet::RawFrame;
use crate::reader::TraceReader;

/// Destination of replayed frames.
pub trait PacketSink {
    fn send(&mut self, frame: &[u8]) -> Result<(), CaptureError>;
}

impl<S: PacketSink + ?Sized> PacketSink for &mut S {
    fn send(&mut self, frame: &[u8]) -> Result<(), CaptureError> {
        (**self).send(frame)
    }
}

/// Injects frames on a network interface through libpcap.
pub struct InterfaceSink {
    interface: String,
    capture: Capture<Active>,
}

impl InterfaceSink {
    pub fn open(interface: &str) -> Result<Self, CaptureError> {
        let device = Device::list()?
            .into_iter()
            .find(|d| d.name == interface)
            .ok_or_else(|| CaptureError::DeviceNotFound(interface.to_string()))?;

        let capture = Capture::from_device(device)?.open()?;
        debug!(interface = interface, "injection handle opened");
        Ok(Self {
            interface: interface.to_string(),
            capture,
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl PacketSink for InterfaceSink {
    fn send(&mut self, frame: &[u8]) -> Result<(), CaptureError> {
        self.capture.sendpacket(frame)?;
        Ok(())
    }
}

/// Computes inter-frame gaps for a fixed line rate.
#[derive(Debug, Clone, Copy)]
pub struct RatePacer {
    rate_bps: u64,
}

impl RatePacer {
    pub fn new(rate_mbps: u64) -> Result<Self, CaptureError> {
        if rate_mbps == 0 {
            return Err(CaptureError::InvalidRate);
        }
        Ok(Self {
            rate_bps: rate_mbps.saturating_mul(1_000_000),
        })
    }

    pub fn rate_bps(&self) -> u64 {
        self.rate_bps
    }

    /// Time `frame` occupies the link.
    pub fn gap(&self, frame: &RawFrame) -> Duration {
        let bits = u128::from(frame.link_occupancy()) * 8;
        let nanos = bits * 1_000_000_000 / u128::from(self.rate_bps);
        Duration::from_nanos(nanos as u64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub packets: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

pub struct Replayer<S> {
    sink: S,
    pacer: RatePacer,
    loops: u32,
}

impl<S: PacketSink> Replayer<S> {
    pub fn new(sink: S, pacer: RatePacer, loops: u32) -> Self {
        Self {
            sink,
            pacer,
            loops: loops.max(1),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn replay(&mut self, path: &Path) -> Result<ReplayStats, CaptureError> {
        self.replay_with(path, |_| {})
    }

    /// Replays the trace `loops` times, calling `on_sent` after each frame.
    pub fn replay_with<F>(&mut self, path: &Path, mut on_sent: F) -> Result<ReplayStats, CaptureError>
    where
        F: FnMut(&RawFrame),
    {
        let started = Instant::now();
        let mut deadline = started;
        let mut stats = ReplayStats::default();

        for round in 0..self.loops {
            let mut reader = TraceReader::open(path)?;
            while let Some(frame) = reader.next_frame()? {
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                } else {
                    // Never bank idle time from a slow sink.
                    deadline = now;
                }

                self.sink.send(&frame.data)?;
                stats.packets += 1;
                stats.bytes += u64::from(frame.wire_len);
                deadline += self.pacer.gap(&frame);
                on_sent(&frame);
            }
            debug!(round = round + 1, loops = self.loops, "replay round finished");
        }

        stats.elapsed = started.elapsed();
        info!(
            packets = stats.packets,
            bytes = stats.bytes,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "replay finished"
        );
        Ok(stats)
    }
}
