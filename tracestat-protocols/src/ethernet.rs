//! ## tracestat-protocols::ethernet
//! Ethernet II parser with support for a single 802.1Q tag.

use crate::error::{ensure_len, read_u16, ParseError};

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const VLAN_TAG_LEN: usize = 4;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_VLAN: u16 = 0x8100;
pub const ETHERTYPE_IPV6: u16 = 0x86dd;

/// An Ethernet frame as zero‑copy slices into the captured data.
#[derive(Debug, Copy, Clone)]
pub struct EthernetFrame<'a> {
    pub destination: &'a [u8],
    pub source: &'a [u8],
    /// EtherType of the payload (the inner one for tagged frames).
    pub ether_type: u16,
    /// VLAN identifier of the 802.1Q tag, if the frame carries one.
    pub vlan_id: Option<u16>,
    /// Bytes consumed by the Ethernet and VLAN headers.
    pub header_len: usize,
    pub payload: &'a [u8],
}

#[derive(Default, Debug, Copy, Clone)]
pub struct EthernetParser;

impl EthernetParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse<'a>(&self, data: &'a [u8]) -> Result<EthernetFrame<'a>, ParseError> {
        ensure_len("Ethernet", data, ETHERNET_HEADER_LEN)?;

        let mut ether_type = read_u16(data, 12);
        let mut header_len = ETHERNET_HEADER_LEN;
        let mut vlan_id = None;

        // The tag sits where the EtherType would be: TPID, TCI, inner type.
        if ether_type == ETHERTYPE_VLAN {
            ensure_len("802.1Q", data, ETHERNET_HEADER_LEN + VLAN_TAG_LEN)?;
            vlan_id = Some(read_u16(data, 14) & 0x0fff);
            ether_type = read_u16(data, 16);
            header_len += VLAN_TAG_LEN;
        }

        Ok(EthernetFrame {
            destination: &data[0..6],
            source: &data[6..12],
            ether_type,
            vlan_id,
            header_len,
            payload: &data[header_len..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ether_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut data = vec![0xaa; 6];
        data.extend_from_slice(&[0xbb; 6]);
        data.extend_from_slice(&ether_type.to_be_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_untagged_frame() {
        let data = frame(ETHERTYPE_IPV4, b"ip");
        let parsed = EthernetParser::new().parse(&data).unwrap();
        assert_eq!(parsed.ether_type, ETHERTYPE_IPV4);
        assert_eq!(parsed.vlan_id, None);
        assert_eq!(parsed.header_len, ETHERNET_HEADER_LEN);
        assert_eq!(parsed.destination, &[0xaau8; 6][..]);
        assert_eq!(parsed.source, &[0xbbu8; 6][..]);
        assert_eq!(parsed.payload, b"ip");
    }

    #[test]
    fn test_vlan_tagged_frame() {
        // TCI with priority bits set and VLAN 42.
        let mut tagged = 0xe02au16.to_be_bytes().to_vec();
        tagged.extend_from_slice(&ETHERTYPE_IPV4.to_be_bytes());
        tagged.extend_from_slice(b"ip");
        let data = frame(ETHERTYPE_VLAN, &tagged);

        let parsed = EthernetParser::new().parse(&data).unwrap();
        assert_eq!(parsed.ether_type, ETHERTYPE_IPV4);
        assert_eq!(parsed.vlan_id, Some(42));
        assert_eq!(parsed.header_len, 18);
        assert_eq!(parsed.payload, b"ip");
    }

    #[test]
    fn test_truncated_frame() {
        let result = EthernetParser::new().parse(&[0u8; 10]);
        assert!(matches!(
            result,
            Err(ParseError::Truncated {
                needed: 14,
                available: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_vlan_tag() {
        let data = frame(ETHERTYPE_VLAN, &[0x00, 0x01]);
        assert!(EthernetParser::new().parse(&data).is_err());
    }
}
