//! ## tracestat-protocols::flow
//! Directional and symmetric flow identities.

use std::fmt;
use std::net::Ipv4Addr;

use crate::ipv4::{IPPROTO_TCP, IPPROTO_UDP};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl TransportProtocol {
    pub fn from_ip_protocol(value: u8) -> Option<Self> {
        match value {
            IPPROTO_TCP => Some(Self::Tcp),
            IPPROTO_UDP => Some(Self::Udp),
            _ => None,
        }
    }

    pub fn ip_protocol(self) -> u8 {
        match self {
            Self::Tcp => IPPROTO_TCP,
            Self::Udp => IPPROTO_UDP,
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
        }
    }
}

/// Directional 5-tuple: the two directions of a connection are different keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub protocol: TransportProtocol,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

impl FlowKey {
    pub fn new(
        protocol: TransportProtocol,
        src: (Ipv4Addr, u16),
        dst: (Ipv4Addr, u16),
    ) -> Self {
        Self {
            protocol,
            src_addr: src.0,
            dst_addr: dst.0,
            src_port: src.1,
            dst_port: dst.1,
        }
    }

    /// The key of the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            protocol: self.protocol,
            src_addr: self.dst_addr,
            dst_addr: self.src_addr,
            src_port: self.dst_port,
            dst_port: self.src_port,
        }
    }

    pub fn symmetric(&self) -> SymmetricFlowKey {
        SymmetricFlowKey::from(*self)
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {}:{} -> {}:{}}}",
            self.protocol, self.src_addr, self.src_port, self.dst_addr, self.dst_port
        )
    }
}

/// Direction-agnostic 5-tuple: both directions of a connection map to the
/// same key. Endpoints are stored in ascending (address, port) order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymmetricFlowKey {
    pub protocol: TransportProtocol,
    pub low: (Ipv4Addr, u16),
    pub high: (Ipv4Addr, u16),
}

impl From<FlowKey> for SymmetricFlowKey {
    fn from(key: FlowKey) -> Self {
        let src = (key.src_addr, key.src_port);
        let dst = (key.dst_addr, key.dst_port);
        let (low, high) = if src <= dst { (src, dst) } else { (dst, src) };
        Self {
            protocol: key.protocol,
            low,
            high,
        }
    }
}
