use thiserror::Error;

/// Structural faults in an encoded response packet. Any of these means the
/// datagram is discarded whole.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    #[error("packet too short: need at least {min} bytes, got {actual}")]
    TooShort { min: usize, actual: usize },
    #[error("entry region of {0} bytes is not a multiple of the 8-byte entry size")]
    RaggedEntries(usize),
    #[error("{0} entries would overflow the 512-byte packet limit")]
    Oversized(usize),
}

/// Reasons a single advertised entry is skipped while the rest of the packet
/// is still applied. These should be treated as warnings.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRejection {
    #[error("destination id {0} outside [1, 64000]")]
    DestinationOutOfRange(u32),
    #[error("metric {0} outside [1, 16]")]
    MetricOutOfRange(u32),
}
