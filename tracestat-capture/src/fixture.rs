//! Small pcap trace builder for tests.
//!
//! Writes classic little-endian pcap files with microsecond timestamps,
//! enough to drive the reader and everything above it without shipping
//! binary captures.

use std::io::{self, Write};
use std::net::Ipv4Addr;

use tempfile::NamedTempFile;
use tracestat_protocols::ethernet::{ETHERTYPE_ARP, ETHERTYPE_IPV4};
use tracestat_protocols::ipv4::{IPPROTO_TCP, IPPROTO_UDP};
use tracestat_protocols::LinkType;

const PCAP_MAGIC_LE: u32 = 0xa1b2_c3d4;
const SNAPLEN: u32 = 65_535;

/// One packet of a fixture trace, stored as a full Ethernet frame.
#[derive(Debug, Clone)]
pub struct FixturePacket {
    pub ts: (u32, u32),
    pub frame: Vec<u8>,
}

impl FixturePacket {
    pub fn tcp(
        ts: (u32, u32),
        src: (Ipv4Addr, u16),
        dst: (Ipv4Addr, u16),
        payload_len: usize,
    ) -> Self {
        let mut transport = Vec::with_capacity(20 + payload_len);
        transport.extend_from_slice(&src.1.to_be_bytes());
        transport.extend_from_slice(&dst.1.to_be_bytes());
        transport.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]);
        // data offset 5 words, ACK
        transport.extend_from_slice(&[0x50, 0x10, 0xff, 0xff, 0, 0, 0, 0]);
        transport.resize(20 + payload_len, 0xab);
        Self::ipv4(ts, src.0, dst.0, IPPROTO_TCP, transport)
    }

    pub fn udp(
        ts: (u32, u32),
        src: (Ipv4Addr, u16),
        dst: (Ipv4Addr, u16),
        payload_len: usize,
    ) -> Self {
        let len = (8 + payload_len) as u16;
        let mut transport = Vec::with_capacity(len as usize);
        transport.extend_from_slice(&src.1.to_be_bytes());
        transport.extend_from_slice(&dst.1.to_be_bytes());
        transport.extend_from_slice(&len.to_be_bytes());
        transport.extend_from_slice(&[0, 0]);
        transport.resize(len as usize, 0xcd);
        Self::ipv4(ts, src.0, dst.0, IPPROTO_UDP, transport)
    }

    /// A 42-byte ARP request, which carries no flow.
    pub fn arp(ts: (u32, u32)) -> Self {
        let mut frame = ethernet_header(ETHERTYPE_ARP);
        frame.extend_from_slice(&[0, 1, 8, 0, 6, 4, 0, 1]);
        frame.resize(42, 0);
        Self { ts, frame }
    }

    fn ipv4(ts: (u32, u32), src: Ipv4Addr, dst: Ipv4Addr, protocol: u8, transport: Vec<u8>) -> Self {
        let total_len = (20 + transport.len()) as u16;
        let mut frame = ethernet_header(ETHERTYPE_IPV4);
        frame.extend_from_slice(&[0x45, 0x00]);
        frame.extend_from_slice(&total_len.to_be_bytes());
        // id, flags DF, ttl 64
        frame.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 64, protocol, 0, 0]);
        frame.extend_from_slice(&src.octets());
        frame.extend_from_slice(&dst.octets());
        frame.extend_from_slice(&transport);
        Self { ts, frame }
    }
}

fn ethernet_header(ether_type: u16) -> Vec<u8> {
    let mut header = Vec::with_capacity(64);
    header.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x02]);
    header.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01]);
    header.extend_from_slice(&ether_type.to_be_bytes());
    header
}

/// Writes `packets` to a temporary pcap file with the given link type.
pub fn write_trace(link: LinkType, packets: &[FixturePacket]) -> io::Result<NamedTempFile> {
    let linktype = match link {
        LinkType::Ethernet => 1,
        LinkType::RawIpv4 => 101,
    };
    let mut file = NamedTempFile::new()?;
    write_pcap(file.as_file_mut(), linktype, link, packets)?;
    Ok(file)
}

/// Writes a trace declaring an arbitrary link type. Packets are written as
/// Ethernet frames.
pub fn write_trace_with_linktype(
    linktype: u32,
    packets: &[FixturePacket],
) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write_pcap(file.as_file_mut(), linktype, LinkType::Ethernet, packets)?;
    Ok(file)
}

fn write_pcap<W: Write>(
    out: &mut W,
    linktype: u32,
    link: LinkType,
    packets: &[FixturePacket],
) -> io::Result<()> {
    out.write_all(&PCAP_MAGIC_LE.to_le_bytes())?;
    out.write_all(&2u16.to_le_bytes())?;
    out.write_all(&4u16.to_le_bytes())?;
    out.write_all(&0i32.to_le_bytes())?;
    out.write_all(&0u32.to_le_bytes())?;
    out.write_all(&SNAPLEN.to_le_bytes())?;
    out.write_all(&linktype.to_le_bytes())?;

    for packet in packets {
        let data = match link {
            LinkType::Ethernet => &packet.frame[..],
            LinkType::RawIpv4 => &packet.frame[14..],
        };
        let len = data.len() as u32;
        out.write_all(&packet.ts.0.to_le_bytes())?;
        out.write_all(&packet.ts.1.to_le_bytes())?;
        out.write_all(&len.to_le_bytes())?;
        out.write_all(&len.to_le_bytes())?;
        out.write_all(data)?;
    }
    out.flush()
}
