use crate::errors::JournalError;
use std::path::Path;

/// Segment file magic bytes: `b"TRJ1"`.
pub const MAGIC: &[u8; 4] = b"TRJ1";

/// Current segment format version: `0x0001`.
pub const VERSION: u16 = 0x0001;

/// Segment header size in bytes: 16 bytes.
pub const HEADER_SIZE: usize = 16;

/// Frame header size in bytes: 12 bytes.
pub const FRAME_HEADER_SIZE: usize = 12;

/// Maximum payload size: 16 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Record frame kind: opaque record payload.
pub const FRAME_KIND_RECORD: u8 = 0x01;

/// Segment file header (16 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Magic bytes: `"TRJ1"`.
    pub magic: [u8; 4],
    /// Format version: `0x0001`.
    pub version: u16,
    /// Reserved flags (must be 0).
    pub flags: u16,
    /// Reserved bytes (must be all zeros).
    pub reserved: [u8; 8],
}

impl SegmentHeader {
    /// Creates a new header with default values.
    pub fn new() -> Self {
        Self {
            magic: *MAGIC,
            version: VERSION,
            flags: 0,
            reserved: [0; 8],
        }
    }

    /// Serializes the header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.reserved);
        bytes
    }

    /// Deserializes a header read from the segment at `path`.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self, JournalError> {
        let invalid = |reason: String| JournalError::InvalidHeader {
            path: path.to_path_buf(),
            reason,
        };

        if bytes.len() < HEADER_SIZE {
            return Err(invalid(format!("header too short: {} bytes", bytes.len())));
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != *MAGIC {
            return Err(invalid(format!(
                "invalid magic: {:?}, expected {:?}",
                magic, MAGIC
            )));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(invalid(format!(
                "unsupported version: 0x{:04x}, expected 0x{:04x}",
                version, VERSION
            )));
        }

        let flags = u16::from_le_bytes([bytes[6], bytes[7]]);
        if flags != 0 {
            return Err(invalid(format!("non-zero flags: 0x{:04x}", flags)));
        }

        let mut reserved = [0u8; 8];
        reserved.copy_from_slice(&bytes[8..16]);
        if reserved != [0u8; 8] {
            return Err(invalid("non-zero reserved bytes".to_string()));
        }

        Ok(Self {
            magic,
            version,
            flags,
            reserved,
        })
    }
}

impl Default for SegmentHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Record frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Opaque record appended through the journal.
    Record,
    /// Unknown/unsupported frame kind.
    Unknown(u8),
}

impl FrameKind {
    /// Creates a FrameKind from a byte value.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            FRAME_KIND_RECORD => FrameKind::Record,
            _ => FrameKind::Unknown(byte),
        }
    }

    /// Returns the byte value for this kind.
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::Record => FRAME_KIND_RECORD,
            FrameKind::Unknown(b) => b,
        }
    }
}

/// Record frame header (12 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFrame {
    /// Frame kind.
    pub kind: FrameKind,
    /// Reserved bytes (must be all zeros).
    pub reserved: [u8; 3],
    /// Payload length in bytes (little-endian).
    pub len: u32,
    /// CRC32 of the payload (little-endian).
    pub crc: u32,
}

impl RecordFrame {
    /// Creates the frame header for `payload`.
    pub fn for_payload(kind: FrameKind, payload: &[u8]) -> Result<Self, JournalError> {
        if payload.len() as u64 > MAX_PAYLOAD_SIZE as u64 {
            return Err(JournalError::PayloadTooLarge {
                size: payload.len() as u64,
                max: MAX_PAYLOAD_SIZE,
            });
        }
        Ok(Self {
            kind,
            reserved: [0; 3],
            len: payload.len() as u32,
            crc: crc32fast::hash(payload),
        })
    }

    /// Total on-disk size of this frame, header included.
    pub fn frame_size(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + self.len as u64
    }

    /// Returns true if `payload` matches the stored checksum.
    pub fn matches(&self, payload: &[u8]) -> bool {
        payload.len() == self.len as usize && crc32fast::hash(payload) == self.crc
    }

    /// Serializes the frame header to bytes.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[0] = self.kind.to_byte();
        bytes[1..4].copy_from_slice(&self.reserved);
        bytes[4..8].copy_from_slice(&self.len.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.crc.to_le_bytes());
        bytes
    }

    /// Deserializes a frame header found at `offset`.
    pub fn from_bytes(bytes: &[u8], offset: u64) -> Result<Self, JournalError> {
        if bytes.len() < FRAME_HEADER_SIZE {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: format!("frame header too short: {} bytes", bytes.len()),
            });
        }

        let kind = FrameKind::from_byte(bytes[0]);
        let reserved = [bytes[1], bytes[2], bytes[3]];
        if reserved != [0u8; 3] {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: "non-zero reserved bytes".to_string(),
            });
        }
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if len > MAX_PAYLOAD_SIZE {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: format!("payload size {} exceeds maximum {}", len, MAX_PAYLOAD_SIZE),
            });
        }
        let crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        Ok(Self {
            kind,
            reserved,
            len,
            crc,
        })
    }
}
