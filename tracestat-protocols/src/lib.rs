//! # tracestat Protocol Parsers
//!
//! Zero-copy header parsers that turn a captured frame into a directional
//! flow identity. Only Ethernet II (optionally with one 802.1Q tag) carrying
//! IPv4 with TCP or UDP yields a flow; every other frame is reported as
//! "no flow" without error.

pub mod error;
pub mod ethernet;
pub mod flow;
pub mod frame;
pub mod ipv4;
pub mod transport;

pub use error::ParseError;
pub use ethernet::{EthernetFrame, EthernetParser};
pub use flow::{FlowKey, SymmetricFlowKey, TransportProtocol};
pub use frame::{FrameParser, LinkType, ParsedFrame};
pub use ipv4::{Ipv4Packet, Ipv4Parser};
pub use transport::{TransportHeader, TransportParser};
