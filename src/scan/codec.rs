//! Binary framing for checkpoint files.
//!
//! A checkpoint file holds exactly one frame:
//!
//! ```text
//! [magic: 4 bytes][version: 1 byte][length: 4 bytes LE][payload: N bytes JSON][crc32: 4 bytes LE]
//! ```
//!
//! The CRC covers the payload. Decoding verifies magic, version, length
//! bound, and checksum; any mismatch classifies the file as corrupt, which
//! resume treats as "try the next older checkpoint".

use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

use crc32fast::Hasher;
use serde::{de::DeserializeOwned, Serialize};

/// Current frame format version.
const FRAME_VERSION: u8 = 1;

/// Magic bytes identifying eminence checkpoint files.
pub const MAGIC: [u8; 4] = *b"EMIN";

/// Largest accepted payload (100 MB).
const MAX_PAYLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Serializes a value as a single checkpoint frame.
///
/// # Errors
///
/// Returns an error if serialization or the underlying write fails.
pub fn encode_frame<T: Serialize>(writer: &mut impl Write, value: &T) -> IoResult<()> {
    let payload = serde_json::to_vec(value)
        .map_err(|e| IoError::new(ErrorKind::InvalidData, format!("serialization failed: {e}")))?;

    let mut hasher = Hasher::new();
    hasher.update(&payload);
    let crc = hasher.finalize();

    let len = u32::try_from(payload.len())
        .map_err(|_| IoError::new(ErrorKind::InvalidData, "payload exceeds u32 length"))?;

    writer.write_all(&MAGIC)?;
    writer.write_all(&[FRAME_VERSION])?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&payload)?;
    writer.write_all(&crc.to_le_bytes())?;
    Ok(())
}

/// Deserializes a value from a single checkpoint frame, verifying the
/// checksum.
///
/// # Errors
///
/// - `ErrorKind::InvalidData` on bad magic, unsupported version,
///   oversized length, checksum mismatch, or undecodable payload
/// - `ErrorKind::UnexpectedEof` on truncation
pub fn decode_frame<T: DeserializeOwned>(reader: &mut impl Read) -> IoResult<T> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("invalid magic bytes: expected {MAGIC:?}, got {magic:?}"),
        ));
    }

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != FRAME_VERSION {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!(
                "unsupported frame version: {} (expected {FRAME_VERSION})",
                version[0]
            ),
        ));
    }

    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    if len > MAX_PAYLOAD_SIZE {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("payload size {len} exceeds maximum {MAX_PAYLOAD_SIZE}"),
        ));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;

    let mut crc_bytes = [0u8; 4];
    reader.read_exact(&mut crc_bytes)?;
    let stored_crc = u32::from_le_bytes(crc_bytes);

    let mut hasher = Hasher::new();
    hasher.update(&payload);
    let computed_crc = hasher.finalize();

    if stored_crc != computed_crc {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            format!("CRC mismatch: stored={stored_crc:08x}, computed={computed_crc:08x}"),
        ));
    }

    serde_json::from_slice(&payload)
        .map_err(|e| IoError::new(ErrorKind::InvalidData, format!("deserialization failed: {e}")))
}
