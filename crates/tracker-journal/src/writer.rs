//! Segment writer implementation.

use crate::errors::JournalError;
use crate::frame::{FrameKind, RecordFrame, SegmentHeader, FRAME_HEADER_SIZE, HEADER_SIZE};
use crate::location::Location;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Append handle for a single segment file.
///
/// The writer keeps track of the segment length itself so that every append
/// knows the offset its frame lands at, and so a failed append can be cut
/// back off the file.
#[derive(Debug)]
pub struct SegmentWriter {
    file: File,
    path: PathBuf,
    segment: u32,
    len: u64,
    sync: bool,
}

impl SegmentWriter {
    /// Opens or creates segment `segment` at `path` for appending.
    ///
    /// An empty or missing file gets a fresh header. An existing file must
    /// start with a valid header; appends continue at its current end.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`](crate::JournalError) if:
    /// - File cannot be opened/created
    /// - Existing file is not a valid segment
    pub fn open<P: AsRef<Path>>(path: P, segment: u32, sync: bool) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;

        let mut writer = Self {
            file,
            path,
            segment,
            len: 0,
            sync,
        };

        let existing = writer.file.metadata()?.len();
        if existing == 0 {
            writer.write_header()?;
        } else if existing < HEADER_SIZE as u64 {
            return Err(JournalError::InvalidHeader {
                path: writer.path.clone(),
                reason: format!("segment too short: {} bytes", existing),
            });
        } else {
            let mut header_bytes = [0u8; HEADER_SIZE];
            writer.file.seek(io::SeekFrom::Start(0))?;
            writer.file.read_exact(&mut header_bytes)?;
            SegmentHeader::from_bytes(&header_bytes, &writer.path)?;
            writer.len = writer.file.seek(io::SeekFrom::End(0))?;
        }

        Ok(writer)
    }

    fn write_header(&mut self) -> Result<(), JournalError> {
        let bytes = SegmentHeader::new().to_bytes();
        self.file.seek(io::SeekFrom::Start(0))?;
        self.file.write_all(&bytes)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        self.len = HEADER_SIZE as u64;
        Ok(())
    }

    /// Segment id this writer appends to.
    pub fn segment(&self) -> u32 {
        self.segment
    }

    /// Current length of the segment in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns true if the segment holds no frames yet.
    pub fn is_empty(&self) -> bool {
        self.len <= HEADER_SIZE as u64
    }

    /// Appends one frame and returns where it landed.
    ///
    /// The frame is durable on return when the writer was opened with
    /// `sync`. If any write fails, the segment is truncated back to its
    /// previous length before the error is returned.
    pub fn append(&mut self, kind: FrameKind, payload: &[u8]) -> Result<Location, JournalError> {
        let frame = RecordFrame::for_payload(kind, payload)?;
        let offset = self.len;

        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        buf.extend_from_slice(&frame.to_bytes());
        buf.extend_from_slice(payload);

        if let Err(e) = self.write_frame(offset, &buf) {
            if let Err(cleanup) = self.file.set_len(offset) {
                warn!(
                    segment = self.segment,
                    offset,
                    error = %cleanup,
                    "failed to cut back partial frame"
                );
            }
            return Err(e);
        }

        self.len = offset + buf.len() as u64;
        Ok(Location {
            segment: self.segment,
            offset,
            len: frame.len,
        })
    }

    fn write_frame(&mut self, offset: u64, buf: &[u8]) -> Result<(), JournalError> {
        self.file.seek(io::SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Flushes buffered data and syncs the segment to disk.
    pub fn sync(&mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for SegmentWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}
