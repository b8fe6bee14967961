//! ## tracestat-protocols::ipv4
//! IPv4 header parser. Honours the IHL field, so options are skipped.

use std::net::Ipv4Addr;

use crate::error::{ensure_len, read_u16, ParseError};

pub const IPV4_MIN_HEADER_LEN: usize = 20;

pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;

/// An IPv4 packet as zero‑copy slices into the captured data.
#[derive(Debug, Copy, Clone)]
pub struct Ipv4Packet<'a> {
    pub header_len: usize,
    pub total_len: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    /// Fragment offset in 8-byte units.
    pub fragment_offset: u16,
    pub payload: &'a [u8],
}

impl Ipv4Packet<'_> {
    /// Only the first fragment carries the transport header.
    pub fn is_initial_fragment(&self) -> bool {
        self.fragment_offset == 0
    }
}

#[derive(Default, Debug, Copy, Clone)]
pub struct Ipv4Parser;

impl Ipv4Parser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse<'a>(&self, data: &'a [u8]) -> Result<Ipv4Packet<'a>, ParseError> {
        ensure_len("IPv4", data, IPV4_MIN_HEADER_LEN)?;

        let version = data[0] >> 4;
        if version != 4 {
            return Err(ParseError::UnsupportedIpVersion(version));
        }

        let ihl = data[0] & 0x0f;
        if (ihl as usize) * 4 < IPV4_MIN_HEADER_LEN {
            return Err(ParseError::InvalidHeaderLength(ihl));
        }
        let header_len = ihl as usize * 4;
        ensure_len("IPv4", data, header_len)?;

        Ok(Ipv4Packet {
            header_len,
            total_len: read_u16(data, 2),
            ttl: data[8],
            protocol: data[9],
            source: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            destination: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            fragment_offset: read_u16(data, 6) & 0x1fff,
            payload: &data[header_len..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(ihl: u8, protocol: u8) -> Vec<u8> {
        let mut data = vec![0u8; ihl as usize * 4];
        data[0] = 0x40 | ihl;
        data[2..4].copy_from_slice(&((ihl as u16) * 4).to_be_bytes());
        data[8] = 64;
        data[9] = protocol;
        data[12..16].copy_from_slice(&[10, 0, 0, 1]);
        data[16..20].copy_from_slice(&[192, 168, 1, 20]);
        data
    }

    #[test]
    fn test_minimal_header() {
        let mut data = header(5, IPPROTO_UDP);
        data.extend_from_slice(b"udp");
        let packet = Ipv4Parser::new().parse(&data).unwrap();
        assert_eq!(packet.header_len, 20);
        assert_eq!(packet.protocol, IPPROTO_UDP);
        assert_eq!(packet.source, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(packet.destination, Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(packet.payload, b"udp");
        assert!(packet.is_initial_fragment());
    }

    #[test]
    fn test_options_are_skipped() {
        let mut data = header(7, IPPROTO_TCP);
        data.extend_from_slice(b"tcp");
        let packet = Ipv4Parser::new().parse(&data).unwrap();
        assert_eq!(packet.header_len, 28);
        assert_eq!(packet.payload, b"tcp");
    }

    #[test]
    fn test_rejects_ipv6() {
        let mut data = header(5, IPPROTO_TCP);
        data[0] = 0x60;
        assert_eq!(
            Ipv4Parser::new().parse(&data).unwrap_err(),
            ParseError::UnsupportedIpVersion(6)
        );
    }

    #[test]
    fn test_rejects_short_ihl() {
        let mut data = header(5, IPPROTO_TCP);
        data[0] = 0x44;
        assert_eq!(
            Ipv4Parser::new().parse(&data).unwrap_err(),
            ParseError::InvalidHeaderLength(4)
        );
    }

    #[test]
    fn test_rejects_ihl_past_end_of_data() {
        let mut data = header(5, IPPROTO_TCP);
        data[0] = 0x4f;
        assert!(matches!(
            Ipv4Parser::new().parse(&data),
            Err(ParseError::Truncated { needed: 60, .. })
        ));
    }

    #[test]
    fn test_fragment_offset() {
        let mut data = header(5, IPPROTO_UDP);
        // More-fragments flag plus offset 185.
        data[6..8].copy_from_slice(&(0x2000u16 | 185).to_be_bytes());
        let packet = Ipv4Parser::new().parse(&data).unwrap();
        assert_eq!(packet.fragment_offset, 185);
        assert!(!packet.is_initial_fragment());
    }
}
