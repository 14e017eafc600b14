//! Segmented journal: the durable log behind the event store.

use crate::errors::JournalError;
use crate::frame::{FrameKind, FRAME_HEADER_SIZE, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::location::Location;
use crate::reader::{ReadMode, SegmentReader};
use crate::writer::SegmentWriter;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, info, warn};

const SEGMENT_PREFIX: &str = "segment-";
const SEGMENT_SUFFIX: &str = ".trj";

/// Options for opening a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalOptions {
    /// Whether to sync each append to disk before returning (default: true).
    pub sync: bool,
    /// Segment size after which appends roll over to a new segment
    /// (default: 64 MiB).
    pub max_segment_size: u64,
    /// Whether to scan the last segment on open and cut off a torn final
    /// frame (default: true). Without the scan, opening costs no reads and
    /// appends resume after whatever the last segment ends with.
    pub repair_tail: bool,
}

impl Default for JournalOptions {
    fn default() -> Self {
        Self {
            sync: true,
            max_segment_size: 64 * 1024 * 1024,
            repair_tail: true,
        }
    }
}

/// Append-only journal spread over numbered segment files in one directory.
///
/// Appends are serialized internally and return a [`Location`] that
/// [`Journal::read`] resolves back to the exact payload. [`Journal::iter`]
/// replays every record in append order.
///
/// # Example
///
/// ```rust
/// use tracker_journal::{Journal, JournalOptions};
///
/// let dir = tempfile::tempdir()?;
/// let journal = Journal::open(dir.path(), JournalOptions::default())?;
/// let location = journal.append(b"hello")?;
/// assert_eq!(journal.read(&location)?, b"hello");
/// journal.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Journal {
    dir: PathBuf,
    options: JournalOptions,
    active: Mutex<Option<SegmentWriter>>,
    segments: AtomicU32,
    closed: AtomicBool,
}

impl Journal {
    /// Opens the journal rooted at `dir`, creating it if absent.
    ///
    /// With `repair_tail` set, a torn frame at the end of the last segment
    /// (the trace of an append interrupted by a crash) is cut off before
    /// appends resume. Without it the segment contents are left alone, except
    /// that a last segment too short to hold its header (a crash while
    /// rolling over) is emptied so the header can be rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`](crate::JournalError) if:
    /// - The directory cannot be created or listed
    /// - Segment ids are not contiguous
    /// - `repair_tail` is set and the last segment is damaged anywhere but
    ///   its tail
    pub fn open<P: AsRef<Path>>(dir: P, options: JournalOptions) -> Result<Self, JournalError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let segments = list_segments(&dir)?;
        let last = match segments.last() {
            Some(&last) => {
                let path = segment_path(&dir, last);
                if options.repair_tail {
                    repair_tail(&path, last)?;
                } else {
                    reset_torn_header(&path, last)?;
                }
                last
            }
            None => 0,
        };
        let writer = SegmentWriter::open(segment_path(&dir, last), last, options.sync)?;

        info!(
            dir = %dir.display(),
            segments = last + 1,
            active_len = writer.len(),
            "journal opened"
        );

        Ok(Self {
            dir,
            options,
            active: Mutex::new(Some(writer)),
            segments: AtomicU32::new(last + 1),
            closed: AtomicBool::new(false),
        })
    }

    /// Number of segments, including the active one.
    ///
    /// Does not wait on in-flight appends.
    pub fn segment_count(&self) -> Result<u32, JournalError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(JournalError::Closed);
        }
        Ok(self.segments.load(Ordering::Acquire))
    }

    /// Appends a record and returns its location once it is durable.
    pub fn append(&self, payload: &[u8]) -> Result<Location, JournalError> {
        if payload.len() as u64 > MAX_PAYLOAD_SIZE as u64 {
            return Err(JournalError::PayloadTooLarge {
                size: payload.len() as u64,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut active = self.active.lock();
        let writer = active.as_mut().ok_or(JournalError::Closed)?;

        let frame_size = (FRAME_HEADER_SIZE + payload.len()) as u64;
        if !writer.is_empty() && writer.len() + frame_size > self.options.max_segment_size {
            let next = writer.segment() + 1;
            let rolled = SegmentWriter::open(segment_path(&self.dir, next), next, self.options.sync)?;
            writer.sync()?;
            debug!(segment = next, "rolled over to new segment");
            *writer = rolled;
            self.segments.store(next + 1, Ordering::Release);
        }

        writer.append(FrameKind::Record, payload)
    }

    /// Reads the record stored at `location`.
    pub fn read(&self, location: &Location) -> Result<Vec<u8>, JournalError> {
        let not_found = || JournalError::NotFound {
            segment: location.segment,
            offset: location.offset,
        };

        if location.segment >= self.segment_count()? {
            return Err(not_found());
        }

        let path = segment_path(&self.dir, location.segment);
        let mut reader = match SegmentReader::open(&path, location.segment, ReadMode::Strict) {
            Ok(reader) => reader,
            Err(JournalError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(not_found())
            }
            Err(e) => return Err(e),
        };
        reader.read_at(location)
    }

    /// Replays every record from the start of the journal.
    ///
    /// Each call starts a fresh pass. Records appended while the pass is
    /// running may or may not be included.
    pub fn iter(&self) -> Result<JournalIter, JournalError> {
        let segments = self.segment_count()?;
        Ok(JournalIter {
            dir: self.dir.clone(),
            next_segment: 0,
            segments,
            reader: None,
            done: false,
        })
    }

    /// Syncs and closes the journal. Closing twice is a no-op.
    pub fn close(&self) -> Result<(), JournalError> {
        let mut active = self.active.lock();
        if let Some(mut writer) = active.take() {
            self.closed.store(true, Ordering::Release);
            writer.sync()?;
            info!(dir = %self.dir.display(), "journal closed");
        }
        Ok(())
    }
}

/// Forward replay over all records of a journal.
///
/// Yields `(location, payload)` pairs in append order. The first error ends
/// the pass.
#[derive(Debug)]
pub struct JournalIter {
    dir: PathBuf,
    next_segment: u32,
    segments: u32,
    reader: Option<SegmentReader>,
    done: bool,
}

impl JournalIter {
    fn advance(&mut self) -> Result<Option<(Location, Vec<u8>)>, JournalError> {
        loop {
            if let Some(reader) = self.reader.as_mut() {
                if let Some(record) = reader.read_record()? {
                    return Ok(Some(record));
                }
                self.reader = None;
            }
            if self.next_segment >= self.segments {
                return Ok(None);
            }
            let segment = self.next_segment;
            let path = segment_path(&self.dir, segment);
            self.reader = Some(SegmentReader::open(&path, segment, ReadMode::Strict)?);
            self.next_segment += 1;
        }
    }
}

impl Iterator for JournalIter {
    type Item = Result<(Location, Vec<u8>), JournalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Path of segment `segment` inside `dir`.
pub fn segment_path(dir: &Path, segment: u32) -> PathBuf {
    dir.join(format!("{}{:08}{}", SEGMENT_PREFIX, segment, SEGMENT_SUFFIX))
}

fn parse_segment_name(name: &str) -> Option<u32> {
    name.strip_prefix(SEGMENT_PREFIX)?
        .strip_suffix(SEGMENT_SUFFIX)?
        .parse()
        .ok()
}

/// Lists segment ids in `dir`, checking they run 0, 1, 2, ... without gaps.
fn list_segments(dir: &Path) -> Result<Vec<u32>, JournalError> {
    let mut segments = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(id) = entry.file_name().to_str().and_then(parse_segment_name) {
            segments.push(id);
        }
    }
    segments.sort_unstable();

    for (expected, &id) in segments.iter().enumerate() {
        if id != expected as u32 {
            return Err(JournalError::MissingSegment {
                dir: dir.to_path_buf(),
                segment: expected as u32,
            });
        }
    }
    Ok(segments)
}

/// Empties a segment whose header was only partly written.
///
/// Looks at the file length only; no segment bytes are read.
fn reset_torn_header(path: &Path, segment: u32) -> Result<(), JournalError> {
    let size = fs::metadata(path)?.len();
    if size > 0 && size < HEADER_SIZE as u64 {
        warn!(segment, discarded = size, "resetting segment with torn header");
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(0)?;
        file.sync_all()?;
    }
    Ok(())
}

/// Cuts a torn final frame off the segment at `path`.
fn repair_tail(path: &Path, segment: u32) -> Result<(), JournalError> {
    let size = fs::metadata(path)?.len();
    if size < HEADER_SIZE as u64 {
        return reset_torn_header(path, segment);
    }

    let mut reader = SegmentReader::open(path, segment, ReadMode::Permissive)?;
    while reader.read_frame()?.is_some() {}
    let valid_end = reader.position();

    if valid_end < size {
        warn!(
            segment,
            valid_end,
            discarded = size - valid_end,
            "truncating torn frame at end of segment"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(valid_end)?;
        file.sync_all()?;
    }
    Ok(())
}
