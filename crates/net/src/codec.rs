//! Message encoding and decoding with framing.
//!
//! Frame format: `[length: u32][type: u8][crc32: u32][payload]`, little endian.
//! `length` counts everything after itself.

use crate::protocol::{MessageEnvelope, PROTOCOL_VERSION};
use anyhow::{bail, Context, Result};
use crc32fast::Hasher;

/// Bytes preceding the payload.
pub const FRAME_HEADER_LEN: usize = 4 + 1 + 4;

fn checksum(payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(payload);
    hasher.finalize()
}

/// Encode an envelope into a framed byte buffer.
pub fn encode_message(envelope: &MessageEnvelope) -> Result<Vec<u8>> {
    let payload = postcard::to_allocvec(envelope).context("Failed to serialize sync message")?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    let length = (1 + 4 + payload.len()) as u32;
    frame.extend_from_slice(&length.to_le_bytes());
    frame.push(envelope.payload.type_tag());
    frame.extend_from_slice(&checksum(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);

    Ok(frame)
}

/// Decode a framed buffer produced by [`encode_message`].
pub fn decode_message(data: &[u8]) -> Result<MessageEnvelope> {
    if data.len() < FRAME_HEADER_LEN {
        bail!(
            "Frame too short: {} bytes (minimum {})",
            data.len(),
            FRAME_HEADER_LEN
        );
    }

    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length < 5 || data.len() < 4 + length {
        bail!(
            "Incomplete frame: expected {} bytes, got {}",
            4 + length,
            data.len()
        );
    }

    let tag = data[4];
    let expected_crc = u32::from_le_bytes([data[5], data[6], data[7], data[8]]);
    let payload = &data[FRAME_HEADER_LEN..4 + length];

    let actual_crc = checksum(payload);
    if actual_crc != expected_crc {
        bail!(
            "CRC32 mismatch: expected {:08X}, got {:08X}",
            expected_crc,
            actual_crc
        );
    }

    let envelope: MessageEnvelope =
        postcard::from_bytes(payload).context("Failed to deserialize sync message")?;

    if envelope.version != PROTOCOL_VERSION {
        bail!(
            "Protocol version mismatch: expected {}, got {}",
            PROTOCOL_VERSION,
            envelope.version
        );
    }
    if envelope.payload.type_tag() != tag {
        bail!("Frame tag {} does not match payload", tag);
    }

    Ok(envelope)
}
