//! Location tokens and their byte encoding.

use crate::errors::JournalError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded size of a [`Location`]: 16 bytes.
pub const LOCATION_SIZE: usize = 16;

/// Handle to one record stored in a journal.
///
/// `offset` points at the record's frame header inside segment `segment`;
/// `len` is the payload length and lets a read reject a token that does not
/// match the frame it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Segment id.
    pub segment: u32,
    /// Byte offset of the frame header within the segment.
    pub offset: u64,
    /// Payload length in bytes.
    pub len: u32,
}

impl Location {
    /// Encodes the location as `segment | offset | len`, little-endian.
    pub fn to_bytes(&self) -> [u8; LOCATION_SIZE] {
        let mut bytes = [0u8; LOCATION_SIZE];
        bytes[0..4].copy_from_slice(&self.segment.to_le_bytes());
        bytes[4..12].copy_from_slice(&self.offset.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.len.to_le_bytes());
        bytes
    }

    /// Decodes a location produced by [`Location::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JournalError> {
        if bytes.len() != LOCATION_SIZE {
            return Err(JournalError::InvalidLocation(format!(
                "expected {} bytes, got {}",
                LOCATION_SIZE,
                bytes.len()
            )));
        }

        let mut segment = [0u8; 4];
        segment.copy_from_slice(&bytes[0..4]);
        let mut offset = [0u8; 8];
        offset.copy_from_slice(&bytes[4..12]);
        let mut len = [0u8; 4];
        len.copy_from_slice(&bytes[12..16]);

        Ok(Self {
            segment: u32::from_le_bytes(segment),
            offset: u64::from_le_bytes(offset),
            len: u32::from_le_bytes(len),
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}+{}", self.segment, self.offset, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_is_fixed_width_little_endian() {
        let location = Location {
            segment: 2,
            offset: 0x0102,
            len: 7,
        };
        let bytes = location.to_bytes();
        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        assert_eq!(&bytes[4..6], &[0x02, 0x01]);
        assert_eq!(&bytes[12..16], &[7, 0, 0, 0]);
        assert_eq!(Location::from_bytes(&bytes).unwrap(), location);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Location::from_bytes(&[0u8; 15]),
            Err(JournalError::InvalidLocation(_))
        ));
        assert!(Location::from_bytes(&[0u8; 17]).is_err());
    }

    #[test]
    fn displays_compactly() {
        let location = Location {
            segment: 1,
            offset: 16,
            len: 3,
        };
        assert_eq!(location.to_string(), "1:16+3");
    }
}
