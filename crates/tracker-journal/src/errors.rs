use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during journal operations.
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid segment header (magic, version, or flags).
    #[error("invalid segment header in {path}: {reason}")]
    InvalidHeader {
        /// Segment file carrying the header.
        path: PathBuf,
        /// Reason for invalidity.
        reason: String,
    },
    /// Invalid frame structure (kind, reserved bytes, or length).
    #[error("invalid frame at offset {offset}: {reason}")]
    InvalidFrame {
        /// Byte offset where the frame starts.
        offset: u64,
        /// Reason for invalidity.
        reason: String,
    },
    /// Payload exceeds maximum size limit.
    #[error("payload size {size} exceeds maximum {max}")]
    PayloadTooLarge {
        /// Actual payload size.
        size: u64,
        /// Maximum allowed size.
        max: u32,
    },
    /// Truncated frame detected in strict mode.
    #[error("truncated frame in segment {segment} at offset {offset}")]
    TruncatedFrame {
        /// Segment holding the frame.
        segment: u32,
        /// Byte offset where truncation occurred.
        offset: u64,
    },
    /// Stored payload does not match its checksum.
    #[error("checksum mismatch in segment {segment} at offset {offset}")]
    ChecksumMismatch {
        /// Segment holding the frame.
        segment: u32,
        /// Byte offset of the frame header.
        offset: u64,
    },
    /// A location does not resolve to any stored frame.
    #[error("no record at segment {segment} offset {offset}")]
    NotFound {
        /// Requested segment.
        segment: u32,
        /// Requested offset.
        offset: u64,
    },
    /// A location resolved to a frame that does not match it.
    #[error("record at segment {segment} offset {offset} is corrupt: {reason}")]
    Corrupt {
        /// Requested segment.
        segment: u32,
        /// Requested offset.
        offset: u64,
        /// What did not match.
        reason: String,
    },
    /// A segment between the first and last one is missing from the directory.
    #[error("segment {segment} is missing from {dir}")]
    MissingSegment {
        /// Journal directory.
        dir: PathBuf,
        /// Id of the absent segment.
        segment: u32,
    },
    /// Encoded location bytes have the wrong shape.
    #[error("invalid location encoding: {0}")]
    InvalidLocation(String),
    /// The journal has been closed.
    #[error("journal is closed")]
    Closed,
}

impl JournalError {
    /// Returns true when the error means the requested record is missing
    /// rather than damaged.
    pub fn is_not_found(&self) -> bool {
        matches!(self, JournalError::NotFound { .. })
    }
}
