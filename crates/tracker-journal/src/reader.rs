//! Segment reader implementation.

use crate::errors::JournalError;
use crate::frame::{FrameKind, RecordFrame, SegmentHeader, FRAME_HEADER_SIZE, HEADER_SIZE};
use crate::location::Location;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Strict mode: truncated or damaged frames are errors.
    Strict,
    /// Permissive mode: a torn final frame is treated as end-of-segment.
    Permissive,
}

/// Reader over a single segment file.
///
/// Supports sequential scanning with [`SegmentReader::read_frame`] and
/// positional lookups with [`SegmentReader::read_at`].
#[derive(Debug)]
pub struct SegmentReader {
    file: File,
    segment: u32,
    mode: ReadMode,
    position: u64,
    size: u64,
}

impl SegmentReader {
    /// Opens segment `segment` at `path` and validates its header.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`](crate::JournalError) if:
    /// - File cannot be opened
    /// - Segment header is invalid
    pub fn open<P: AsRef<Path>>(path: P, segment: u32, mode: ReadMode) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut header_bytes = [0u8; HEADER_SIZE];
        file.seek(io::SeekFrom::Start(0))?;
        file.read_exact(&mut header_bytes).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => JournalError::InvalidHeader {
                path: path.to_path_buf(),
                reason: format!("segment too short: {} bytes", size),
            },
            _ => e.into(),
        })?;
        SegmentHeader::from_bytes(&header_bytes, path)?;

        Ok(Self {
            file,
            segment,
            mode,
            position: HEADER_SIZE as u64,
            size,
        })
    }

    /// Returns the offset just past the last frame read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next frame from the segment.
    ///
    /// Returns `Ok(None)` at end-of-segment (or at a torn final frame in
    /// permissive mode). The returned location points at the frame just read.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Location, Vec<u8>)>, JournalError> {
        if self.position >= self.size {
            return Ok(None);
        }
        let offset = self.position;

        if offset + FRAME_HEADER_SIZE as u64 > self.size {
            return self.torn(offset);
        }
        self.file.seek(io::SeekFrom::Start(offset))?;
        let mut header_bytes = [0u8; FRAME_HEADER_SIZE];
        self.file.read_exact(&mut header_bytes)?;
        let frame = RecordFrame::from_bytes(&header_bytes, offset)?;

        let end = offset + frame.frame_size();
        if end > self.size {
            return self.torn(offset);
        }

        let mut payload = vec![0u8; frame.len as usize];
        self.file.read_exact(&mut payload)?;

        if !frame.matches(&payload) {
            // A zero-filled or half-written last frame is what an interrupted
            // append leaves behind.
            if self.mode == ReadMode::Permissive && end == self.size {
                return Ok(None);
            }
            return Err(JournalError::ChecksumMismatch {
                segment: self.segment,
                offset,
            });
        }

        self.position = end;
        let location = Location {
            segment: self.segment,
            offset,
            len: frame.len,
        };
        Ok(Some((frame.kind, location, payload)))
    }

    fn torn(&self, offset: u64) -> Result<Option<(FrameKind, Location, Vec<u8>)>, JournalError> {
        match self.mode {
            ReadMode::Permissive => Ok(None),
            ReadMode::Strict => Err(JournalError::TruncatedFrame {
                segment: self.segment,
                offset,
            }),
        }
    }

    /// Reads the next record payload, skipping unknown frame kinds.
    pub fn read_record(&mut self) -> Result<Option<(Location, Vec<u8>)>, JournalError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some((FrameKind::Record, location, payload)) => {
                    return Ok(Some((location, payload)));
                }
                Some((FrameKind::Unknown(_), _, _)) => continue,
            }
        }
    }

    /// Reads the record a location points at.
    ///
    /// A location past the end of the segment is `NotFound`; a location that
    /// lands on a frame of the wrong kind, length, or checksum is `Corrupt`.
    pub fn read_at(&mut self, location: &Location) -> Result<Vec<u8>, JournalError> {
        let not_found = || JournalError::NotFound {
            segment: location.segment,
            offset: location.offset,
        };
        let corrupt = |reason: String| JournalError::Corrupt {
            segment: location.segment,
            offset: location.offset,
            reason,
        };

        let header_end = location
            .offset
            .checked_add(FRAME_HEADER_SIZE as u64)
            .ok_or_else(not_found)?;
        if location.offset < HEADER_SIZE as u64 || header_end > self.size {
            return Err(not_found());
        }

        self.file.seek(io::SeekFrom::Start(location.offset))?;
        let mut header_bytes = [0u8; FRAME_HEADER_SIZE];
        self.file.read_exact(&mut header_bytes)?;
        let frame = RecordFrame::from_bytes(&header_bytes, location.offset)
            .map_err(|e| corrupt(e.to_string()))?;

        if frame.kind != FrameKind::Record {
            return Err(corrupt(format!("unexpected frame kind {:?}", frame.kind)));
        }
        if frame.len != location.len {
            return Err(corrupt(format!(
                "frame length {} does not match location length {}",
                frame.len, location.len
            )));
        }
        match location.offset.checked_add(frame.frame_size()) {
            Some(end) if end <= self.size => {}
            _ => return Err(corrupt("frame extends past end of segment".to_string())),
        }

        let mut payload = vec![0u8; frame.len as usize];
        self.file.read_exact(&mut payload)?;
        if !frame.matches(&payload) {
            return Err(corrupt("checksum mismatch".to_string()));
        }
        Ok(payload)
    }
}
