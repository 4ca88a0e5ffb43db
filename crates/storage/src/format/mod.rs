//! On-disk byte format for container files.
//!
//! A container file is a fixed header followed by the bincode-encoded root
//! group:
//!
//! ```text
//! +----------+---------+----------+-------------+-----------------+
//! | magic(8) | ver(u32)| crc(u32) | length(u64) | payload(length) |
//! +----------+---------+----------+-------------+-----------------+
//! ```
//!
//! All integers are little-endian. The CRC32 covers the payload only.

use crate::error::{StorageError, StorageResult};
use crate::node::Group;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Magic bytes at the start of every container file
pub const CONTAINER_MAGIC: [u8; 8] = *b"TRCSTOR1";

/// Current container format version
pub const CONTAINER_FORMAT_VERSION: u32 = 1;

/// Size of the fixed header in bytes
pub const CONTAINER_HEADER_SIZE: usize = 24;

/// True if `bytes` starts with the container magic
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.len() >= CONTAINER_MAGIC.len() && bytes[..CONTAINER_MAGIC.len()] == CONTAINER_MAGIC
}

/// Serialize a root group into a complete container image
pub fn encode_container(root: &Group) -> StorageResult<Vec<u8>> {
    let payload = bincode::serialize(root)?;
    let mut out = Vec::with_capacity(CONTAINER_HEADER_SIZE + payload.len());
    out.extend_from_slice(&CONTAINER_MAGIC);
    out.write_u32::<LittleEndian>(CONTAINER_FORMAT_VERSION)?;
    out.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    out.write_u64::<LittleEndian>(payload.len() as u64)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse a container image back into its root group
pub fn decode_container(bytes: &[u8]) -> StorageResult<Group> {
    if !has_magic(bytes) {
        return Err(StorageError::BadMagic);
    }
    if bytes.len() < CONTAINER_HEADER_SIZE {
        return Err(StorageError::Truncated {
            needed: CONTAINER_HEADER_SIZE,
            have: bytes.len(),
        });
    }

    let version = LittleEndian::read_u32(&bytes[8..12]);
    if version != CONTAINER_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion { version });
    }
    let expected = LittleEndian::read_u32(&bytes[12..16]);
    let length = LittleEndian::read_u64(&bytes[16..24]) as usize;

    let needed = CONTAINER_HEADER_SIZE.saturating_add(length);
    if bytes.len() < needed {
        return Err(StorageError::Truncated {
            needed,
            have: bytes.len(),
        });
    }
    let payload = &bytes[CONTAINER_HEADER_SIZE..needed];
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(StorageError::ChecksumMismatch { expected, actual });
    }

    Ok(bincode::deserialize(payload)?)
}
