//! ## tracestat-protocols::transport
//! TCP and UDP header parsing, limited to what a flow identity needs.

use crate::error::{ensure_len, read_u16, ParseError};
use crate::flow::TransportProtocol;

pub const TCP_MIN_HEADER_LEN: usize = 20;
pub const UDP_HEADER_LEN: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransportHeader {
    pub protocol: TransportProtocol,
    pub src_port: u16,
    pub dst_port: u16,
    pub header_len: usize,
}

#[derive(Default, Debug, Copy, Clone)]
pub struct TransportParser;

impl TransportParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses the header of IP protocol `ip_protocol` at the start of `data`.
    pub fn parse(&self, ip_protocol: u8, data: &[u8]) -> Result<TransportHeader, ParseError> {
        let protocol = TransportProtocol::from_ip_protocol(ip_protocol)
            .ok_or(ParseError::UnsupportedTransport(ip_protocol))?;

        let header_len = match protocol {
            TransportProtocol::Tcp => {
                ensure_len("TCP", data, TCP_MIN_HEADER_LEN)?;
                let data_offset = (data[12] >> 4) as usize * 4;
                data_offset.max(TCP_MIN_HEADER_LEN)
            }
            TransportProtocol::Udp => {
                ensure_len("UDP", data, UDP_HEADER_LEN)?;
                UDP_HEADER_LEN
            }
        };

        Ok(TransportHeader {
            protocol,
            src_port: read_u16(data, 0),
            dst_port: read_u16(data, 2),
            header_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipv4::{IPPROTO_TCP, IPPROTO_UDP};

    #[test]
    fn test_tcp_ports() {
        let mut data = vec![0u8; 20];
        data[0..2].copy_from_slice(&443u16.to_be_bytes());
        data[2..4].copy_from_slice(&51000u16.to_be_bytes());
        data[12] = 0x80; // 32-byte header with options
        let header = TransportParser::new().parse(IPPROTO_TCP, &data).unwrap();
        assert_eq!(header.protocol, TransportProtocol::Tcp);
        assert_eq!(header.src_port, 443);
        assert_eq!(header.dst_port, 51000);
        assert_eq!(header.header_len, 32);
    }

    #[test]
    fn test_udp_ports() {
        let data = [0x00, 0x35, 0xc0, 0x00, 0x00, 0x08, 0x00, 0x00];
        let header = TransportParser::new().parse(IPPROTO_UDP, &data).unwrap();
        assert_eq!(header.protocol, TransportProtocol::Udp);
        assert_eq!(header.src_port, 53);
        assert_eq!(header.dst_port, 49152);
        assert_eq!(header.header_len, 8);
    }

    #[test]
    fn test_truncated_tcp() {
        assert!(matches!(
            TransportParser::new().parse(IPPROTO_TCP, &[0u8; 8]),
            Err(ParseError::Truncated { layer: "TCP", .. })
        ));
    }

    #[test]
    fn test_icmp_is_unsupported() {
        assert_eq!(
            TransportParser::new().parse(1, &[0u8; 8]).unwrap_err(),
            ParseError::UnsupportedTransport(1)
        );
    }
}
