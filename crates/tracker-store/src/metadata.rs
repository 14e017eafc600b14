//! Per-event metadata and its fixed-size record encoding.

use crate::error::StoreError;
use serde::Serialize;
use tracker_journal::{Location, LOCATION_SIZE};

/// Encoded size of a metadata record: 29 bytes.
pub const METADATA_RECORD_SIZE: usize = 1 + 8 + 4 + LOCATION_SIZE;

/// Record kind: metadata of a stored event.
const RECORD_KIND_EVENT: u8 = 0x01;

/// Record kind: identifier consumed by an append whose payload write failed.
const RECORD_KIND_ABANDONED: u8 = 0x02;

/// Metadata kept in memory for every stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetaData {
    /// Caller-supplied user id.
    pub user_id: i64,
    /// Caller-supplied event type id.
    pub event_type_id: i32,
    /// Where the payload lives in the payload log.
    pub location: Location,
}

impl MetaData {
    /// Creates metadata for a payload stored at `location`.
    pub fn new(user_id: i64, event_type_id: i32, location: Location) -> Self {
        Self {
            user_id,
            event_type_id,
            location,
        }
    }
}

/// One metadata-log entry, and the content of one index slot.
///
/// The metadata log holds exactly one entry per assigned identifier, so an
/// append that loses its payload still writes an `Abandoned` entry to keep
/// positions and identifiers aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// A stored event.
    Event(MetaData),
    /// An identifier whose append failed.
    Abandoned,
}

impl Entry {
    /// Serializes the entry.
    ///
    /// Layout: kind (1) | user id i64 LE (8) | event type id i32 LE (4) |
    /// location (16). Abandoned entries are zero past the kind byte.
    pub fn to_bytes(&self) -> [u8; METADATA_RECORD_SIZE] {
        let mut bytes = [0u8; METADATA_RECORD_SIZE];
        match self {
            Entry::Event(meta) => {
                bytes[0] = RECORD_KIND_EVENT;
                bytes[1..9].copy_from_slice(&meta.user_id.to_le_bytes());
                bytes[9..13].copy_from_slice(&meta.event_type_id.to_le_bytes());
                bytes[13..].copy_from_slice(&meta.location.to_bytes());
            }
            Entry::Abandoned => bytes[0] = RECORD_KIND_ABANDONED,
        }
        bytes
    }

    /// Deserializes an entry read back from the metadata log.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != METADATA_RECORD_SIZE {
            return Err(StoreError::InvalidMetaData(format!(
                "expected {} bytes, got {}",
                METADATA_RECORD_SIZE,
                bytes.len()
            )));
        }

        match bytes[0] {
            RECORD_KIND_EVENT => {
                let mut user_id = [0u8; 8];
                user_id.copy_from_slice(&bytes[1..9]);
                let mut event_type_id = [0u8; 4];
                event_type_id.copy_from_slice(&bytes[9..13]);
                let location = Location::from_bytes(&bytes[13..])
                    .map_err(|e| StoreError::InvalidMetaData(e.to_string()))?;
                Ok(Entry::Event(MetaData {
                    user_id: i64::from_le_bytes(user_id),
                    event_type_id: i32::from_le_bytes(event_type_id),
                    location,
                }))
            }
            RECORD_KIND_ABANDONED => Ok(Entry::Abandoned),
            kind => Err(StoreError::InvalidMetaData(format!(
                "unknown record kind 0x{:02x}",
                kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetaData {
        MetaData::new(
            -7,
            20,
            Location {
                segment: 1,
                offset: 28,
                len: 5,
            },
        )
    }

    #[test]
    fn event_record_layout() {
        let bytes = Entry::Event(sample()).to_bytes();
        assert_eq!(bytes.len(), 29);
        assert_eq!(bytes[0], RECORD_KIND_EVENT);
        assert_eq!(&bytes[1..9], &(-7i64).to_le_bytes());
        assert_eq!(&bytes[9..13], &20i32.to_le_bytes());
        assert_eq!(Entry::from_bytes(&bytes).unwrap(), Entry::Event(sample()));
    }

    #[test]
    fn abandoned_record_is_kind_only() {
        let bytes = Entry::Abandoned.to_bytes();
        assert_eq!(bytes[0], RECORD_KIND_ABANDONED);
        assert!(bytes[1..].iter().all(|&b| b == 0));
        assert_eq!(Entry::from_bytes(&bytes).unwrap(), Entry::Abandoned);
    }

    #[test]
    fn rejects_wrong_length() {
        let bytes = Entry::Event(sample()).to_bytes();
        assert!(matches!(
            Entry::from_bytes(&bytes[..28]),
            Err(StoreError::InvalidMetaData(_))
        ));
    }

    #[test]
    fn rejects_unknown_kind() {
        let mut bytes = Entry::Event(sample()).to_bytes();
        bytes[0] = 0x7f;
        let err = Entry::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("0x7f"));
    }
}
