use thiserror::Error;

/// Reasons a frame does not yield a flow identity.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Truncated {layer} header: need {needed} bytes, have {available}")]
    Truncated {
        layer: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("Unsupported EtherType 0x{0:04x}")]
    UnsupportedEtherType(u16),
    #[error("Unsupported IP version {0}")]
    UnsupportedIpVersion(u8),
    #[error("Invalid IPv4 header length {0}")]
    InvalidHeaderLength(u8),
    #[error("Non-initial IPv4 fragment")]
    Fragment,
    #[error("Unsupported transport protocol {0}")]
    UnsupportedTransport(u8),
}

/// Fails with [`ParseError::Truncated`] unless `data` holds `needed` bytes.
#[inline]
pub(crate) fn ensure_len(layer: &'static str, data: &[u8], needed: usize) -> Result<(), ParseError> {
    if data.len() < needed {
        return Err(ParseError::Truncated {
            layer,
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}
