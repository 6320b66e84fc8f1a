//! Response-packet wire format.
//!
//! A response is a fixed header followed by back-to-back 8-byte entries,
//! all in network (big-endian) byte order:
//!
//! ```text
//! offset  size  field
//!   0      1    command (= 2, response)
//!   1      1    version (= 2)
//!   2      2    sender router id
//!   4      4    entry[0] destination id
//!   8      4    entry[0] metric
//!   ...         one 8-byte entry per route
//! ```

use crate::feedback::WireError;
use crate::RouterId;

pub const RESPONSE_COMMAND: u8 = 2;
pub const RIP_VERSION: u8 = 2;

pub const HEADER_BYTES: usize = 4;
pub const ENTRY_BYTES: usize = 8;

/// Hard upper bound on an encoded response datagram.
pub const MAX_RESPONSE_PACKET_SIZE: usize = 512;

/// Largest entry count that still fits [`MAX_RESPONSE_PACKET_SIZE`].
pub const MAX_ENTRIES: usize = (MAX_RESPONSE_PACKET_SIZE - HEADER_BYTES) / ENTRY_BYTES;

/// A structurally valid response packet.
///
/// Only the byte-level shape has been checked; command, version, sender and
/// the entry values still carry whatever the peer put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub command: u8,
    pub version: u8,
    pub sender_id: RouterId,
    pub entries: Vec<RawEntry>,
}

/// One advertised `(destination, metric)` pair, unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry {
    pub dest_id: u32,
    pub metric: u32,
}

/// Encodes a response packet for the wire.
///
/// Refuses to emit anything that would exceed [`MAX_RESPONSE_PACKET_SIZE`].
pub fn encode_response(
    sender_id: RouterId,
    entries: &[(RouterId, u16)],
) -> Result<Vec<u8>, WireError> {
    if entries.len() > MAX_ENTRIES {
        return Err(WireError::Oversized(entries.len()));
    }

    let mut out = Vec::with_capacity(HEADER_BYTES + entries.len() * ENTRY_BYTES);
    out.push(RESPONSE_COMMAND);
    out.push(RIP_VERSION);
    out.extend_from_slice(&sender_id.to_be_bytes());
    for &(dest_id, metric) in entries {
        out.extend_from_slice(&(dest_id as u32).to_be_bytes());
        out.extend_from_slice(&(metric as u32).to_be_bytes());
    }
    Ok(out)
}

/// Parses a received datagram into a [`RawResponse`].
pub fn decode_response(raw: &[u8]) -> Result<RawResponse, WireError> {
    if raw.len() < HEADER_BYTES {
        return Err(WireError::TooShort {
            min: HEADER_BYTES,
            actual: raw.len(),
        });
    }

    let body = &raw[HEADER_BYTES..];
    if body.len() % ENTRY_BYTES != 0 {
        return Err(WireError::RaggedEntries(body.len()));
    }

    let mut entries = Vec::with_capacity(body.len() / ENTRY_BYTES);
    for chunk in body.chunks_exact(ENTRY_BYTES) {
        entries.push(RawEntry {
            dest_id: u32::from_be_bytes(chunk[0..4].try_into().expect("chunk is 8 bytes")),
            metric: u32::from_be_bytes(chunk[4..8].try_into().expect("chunk is 8 bytes")),
        });
    }

    Ok(RawResponse {
        command: raw[0],
        version: raw[1],
        sender_id: u16::from_be_bytes([raw[2], raw[3]]),
        entries,
    })
}
