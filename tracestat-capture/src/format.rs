//! Trace container detection from the leading magic bytes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CaptureError;

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];
const PCAP_BE_MAGIC: [u8; 4] = [0xa1, 0xb2, 0xc3, 0xd4];
const PCAP_LE_MAGIC: [u8; 4] = [0xd4, 0xc3, 0xb2, 0xa1];
const PCAP_NS_BE_MAGIC: [u8; 4] = [0xa1, 0xb2, 0x3c, 0x4d];
const PCAP_NS_LE_MAGIC: [u8; 4] = [0x4d, 0x3c, 0xb2, 0xa1];
const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Classic pcap, either byte order, micro- or nanosecond timestamps.
    Pcap,
    /// Classic pcap wrapped in a zstd stream.
    PcapZstd,
    PcapNg,
}

impl TraceFormat {
    pub fn from_signature(signature: &[u8]) -> Result<Self, CaptureError> {
        let magic: [u8; 4] = signature
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CaptureError::UnknownFormat(signature.to_vec()))?;

        match magic {
            ZSTD_MAGIC => Ok(Self::PcapZstd),
            PCAP_BE_MAGIC | PCAP_LE_MAGIC | PCAP_NS_BE_MAGIC | PCAP_NS_LE_MAGIC => Ok(Self::Pcap),
            PCAPNG_MAGIC => Ok(Self::PcapNg),
            _ => Err(CaptureError::UnknownFormat(magic.to_vec())),
        }
    }

    /// Reads the signature of the file at `path`.
    pub fn detect(path: &Path) -> Result<Self, CaptureError> {
        let mut signature = Vec::with_capacity(4);
        File::open(path)?.take(4).read_to_end(&mut signature)?;
        Self::from_signature(&signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signatures() {
        assert_eq!(
            TraceFormat::from_signature(&PCAP_LE_MAGIC).unwrap(),
            TraceFormat::Pcap
        );
        assert_eq!(
            TraceFormat::from_signature(&PCAP_BE_MAGIC).unwrap(),
            TraceFormat::Pcap
        );
        assert_eq!(
            TraceFormat::from_signature(&PCAP_NS_LE_MAGIC).unwrap(),
            TraceFormat::Pcap
        );
        assert_eq!(
            TraceFormat::from_signature(&[0x28, 0xb5, 0x2f, 0xfd, 0x00]).unwrap(),
            TraceFormat::PcapZstd
        );
        assert_eq!(
            TraceFormat::from_signature(&PCAPNG_MAGIC).unwrap(),
            TraceFormat::PcapNg
        );
    }

    #[test]
    fn test_unknown_and_short_signatures() {
        assert!(matches!(
            TraceFormat::from_signature(b"GIF8"),
            Err(CaptureError::UnknownFormat(_))
        ));
        assert!(matches!(
            TraceFormat::from_signature(&[0xd4, 0xc3]),
            Err(CaptureError::UnknownFormat(_))
        ));
    }
}
