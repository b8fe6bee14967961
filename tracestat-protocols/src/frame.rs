//! ## tracestat-protocols::frame
//! Link-layer dispatch: from a captured frame to an optional flow identity.

use crate::error::ParseError;
use crate::ethernet::{EthernetParser, ETHERTYPE_IPV4};
use crate::flow::FlowKey;
use crate::ipv4::Ipv4Parser;
use crate::transport::TransportParser;

/// Link-layer framing of a capture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkType {
    /// Ethernet II (`DLT_EN10MB`).
    Ethernet,
    /// Bare IPv4 packets without a link header (`DLT_RAW`).
    RawIpv4,
}

/// What the parser learnt about a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// Bytes of headers recognised in front of the transport payload.
    pub header_len: usize,
    pub flow: Option<FlowKey>,
}

#[derive(Debug, Copy, Clone)]
pub struct FrameParser {
    link: LinkType,
    ethernet: EthernetParser,
    ipv4: Ipv4Parser,
    transport: TransportParser,
}

impl FrameParser {
    pub fn new(link: LinkType) -> Self {
        Self {
            link,
            ethernet: EthernetParser::new(),
            ipv4: Ipv4Parser::new(),
            transport: TransportParser::new(),
        }
    }

    pub fn link_type(&self) -> LinkType {
        self.link
    }

    /// Extracts the flow identity, or the reason there is none.
    pub fn flow_key(&self, data: &[u8]) -> Result<(FlowKey, usize), ParseError> {
        let (ip_data, link_header_len) = match self.link {
            LinkType::Ethernet => {
                let frame = self.ethernet.parse(data)?;
                if frame.ether_type != ETHERTYPE_IPV4 {
                    return Err(ParseError::UnsupportedEtherType(frame.ether_type));
                }
                (frame.payload, frame.header_len)
            }
            LinkType::RawIpv4 => (data, 0),
        };

        let ip = self.ipv4.parse(ip_data)?;
        if !ip.is_initial_fragment() {
            return Err(ParseError::Fragment);
        }
        let transport = self.transport.parse(ip.protocol, ip.payload)?;

        let key = FlowKey::new(
            transport.protocol,
            (ip.source, transport.src_port),
            (ip.destination, transport.dst_port),
        );
        Ok((
            key,
            link_header_len + ip.header_len + transport.header_len,
        ))
    }

    /// Parses a frame. Frames without a recognised TCP/UDP-over-IPv4 stack
    /// yield `flow: None`; this is never an error.
    pub fn parse(&self, data: &[u8]) -> ParsedFrame {
        match self.flow_key(data) {
            Ok((flow, header_len)) => ParsedFrame {
                header_len,
                flow: Some(flow),
            },
            Err(_) => ParsedFrame {
                header_len: 0,
                flow: None,
            },
        }
    }
}
