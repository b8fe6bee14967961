//! ## tracestat-capture::reader
//! **Offline trace reader**
//!
//! Opens a pcap trace (optionally zstd-compressed) through libpcap and yields
//! packets in file order. Compressed traces are first streamed into an
//! anonymous temporary file that lives as long as the reader.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use pcap::{Capture, Linktype, Offline};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use tracestat_core::time::{NANOS_PER_MICRO, NANOS_PER_SEC};
use tracestat_core::TimeNs;
use tracestat_protocols::ethernet::ETHERTYPE_IPV4;
use tracestat_protocols::{FrameParser, LinkType};

use crate::error::CaptureError;
use crate::format::TraceFormat;
use crate::packet::{CapturedPacket, RawFrame, CRC_LEN, ETHERNET_HEADER_LEN};

const DLT_EN10MB: i32 = 1;
// DLT_RAW has several numeric aliases depending on the platform that wrote
// the file.
const DLT_RAW_ALIASES: [i32; 4] = [12, 14, 101, 228];

pub struct TraceReader {
    path: PathBuf,
    capture: Capture<Offline>,
    parser: FrameParser,
    // Keeps the decompressed copy on disk while libpcap reads it.
    _decompressed: Option<NamedTempFile>,
}

impl std::fmt::Debug for TraceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceReader")
            .field("path", &self.path)
            .field("link_type", &self.parser.link_type())
            .finish()
    }
}

impl TraceReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CaptureError::FileNotFound(path.to_path_buf()));
        }

        let format = TraceFormat::detect(path)?;
        debug!(path = %path.display(), format = ?format, "opening trace");

        let (capture, decompressed) = match format {
            TraceFormat::Pcap => (Capture::from_file(path)?, None),
            TraceFormat::PcapZstd => {
                let temp = decompress(path)?;
                (Capture::from_file(temp.path())?, Some(temp))
            }
            TraceFormat::PcapNg => return Err(CaptureError::UnsupportedFormat("pcapng")),
        };

        let link = link_type_of(capture.get_datalink())?;
        if link == LinkType::RawIpv4 {
            warn!(path = %path.display(), "raw IP link type, assuming every packet is IPv4");
        }

        Ok(Self {
            path: path.to_path_buf(),
            capture,
            parser: FrameParser::new(link),
            _decompressed: decompressed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn link_type(&self) -> LinkType {
        self.parser.link_type()
    }

    /// Reads and parses the next packet. `Ok(None)` marks the end of the trace.
    pub fn next_packet(&mut self) -> Result<Option<CapturedPacket>, CaptureError> {
        let link = self.parser.link_type();
        let packet = match self.capture.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::NoMorePackets) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let parsed = self.parser.parse(packet.data);
        Ok(Some(CapturedPacket {
            timestamp_ns: header_timestamp(packet.header),
            wire_len: wire_len(link, packet.header.len),
            header_len: parsed.header_len,
            flow: parsed.flow,
        }))
    }

    /// Reads the next frame as raw bytes for re-injection. Raw IP frames get
    /// a zeroed Ethernet header so they can be sent on an Ethernet link.
    pub fn next_frame(&mut self) -> Result<Option<RawFrame>, CaptureError> {
        let link = self.parser.link_type();
        let packet = match self.capture.next_packet() {
            Ok(packet) => packet,
            Err(pcap::Error::NoMorePackets) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let data = match link {
            LinkType::Ethernet => packet.data.to_vec(),
            LinkType::RawIpv4 => {
                let mut data = Vec::with_capacity(ETHERNET_HEADER_LEN as usize + packet.data.len());
                data.extend_from_slice(&[0u8; 12]);
                data.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
                data.extend_from_slice(packet.data);
                data
            }
        };

        Ok(Some(RawFrame::new(
            header_timestamp(packet.header),
            wire_len(link, packet.header.len),
            data,
        )))
    }
}

fn decompress(path: &Path) -> Result<NamedTempFile, CaptureError> {
    let source = BufReader::new(File::open(path)?);
    let mut temp = NamedTempFile::new()?;
    zstd::stream::copy_decode(source, temp.as_file_mut()).map_err(CaptureError::Decompression)?;
    debug!(
        path = %path.display(),
        temp = %temp.path().display(),
        "trace decompressed"
    );
    Ok(temp)
}

fn link_type_of(link: Linktype) -> Result<LinkType, CaptureError> {
    match link.0 {
        DLT_EN10MB => Ok(LinkType::Ethernet),
        n if DLT_RAW_ALIASES.contains(&n) => Ok(LinkType::RawIpv4),
        n => Err(CaptureError::UnsupportedLinkType(n)),
    }
}

fn header_timestamp(header: &pcap::PacketHeader) -> TimeNs {
    let sec = header.ts.tv_sec as i64;
    let usec = header.ts.tv_usec as i64;
    sec * NANOS_PER_SEC + usec * NANOS_PER_MICRO
}

/// On-wire size of a frame: captured original length plus CRC, plus an
/// Ethernet header when the capture stripped it.
fn wire_len(link: LinkType, orig_len: u32) -> u32 {
    let len = orig_len.saturating_add(CRC_LEN);
    match link {
        LinkType::Ethernet => len,
        LinkType::RawIpv4 => len.saturating_add(ETHERNET_HEADER_LEN),
    }
}
