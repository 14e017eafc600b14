//! The event store: identifier assignment, write path, read path, recovery.

use crate::commit::CommitSequencer;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::event::Event;
use crate::index::MetadataIndex;
use crate::metadata::{Entry, MetaData};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, error, info, warn};
use tracker_journal::{Journal, JournalError, JournalOptions};

/// Counters describing an open store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Identifiers assigned so far.
    pub events: u64,
    /// Slots in the metadata index.
    pub index_capacity: usize,
    /// Segments in the payload log.
    pub payload_segments: u32,
    /// Segments in the metadata log.
    pub metadata_segments: u32,
}

/// Durable event store with dense identifiers.
///
/// Every appended event gets the next identifier, its payload goes to the
/// payload log and a fixed-size metadata entry to the metadata log. The
/// metadata log holds one entry per identifier, in identifier order, so
/// reopening a store rebuilds the whole index without touching payloads.
///
/// All methods take `&self`; share the store across threads with an `Arc`.
///
/// # Example
///
/// ```rust
/// use tracker_store::{Event, EventStore};
///
/// let dir = tempfile::tempdir()?;
/// let store = EventStore::build(dir.path())?;
///
/// let id = store.add_event(&Event::from("a"), 1, 10)?;
/// assert_eq!(id, 0);
/// assert_eq!(store.get_event(id)?, Event::from("a"));
/// assert_eq!(store.get_event_metadata(id)?.user_id, 1);
/// store.close()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct EventStore {
    payloads: Journal,
    metadata: Journal,
    index: MetadataIndex,
    next_id: AtomicU64,
    commits: CommitSequencer,
    poisoned: AtomicBool,
    closed: AtomicBool,
}

impl EventStore {
    /// Opens the store under `data_dir` with default settings.
    pub fn build<P: AsRef<Path>>(data_dir: P) -> Result<Self, StoreError> {
        Self::open(StoreConfig::new(data_dir))
    }

    /// Opens (or creates) a store and rebuilds its index from the metadata
    /// log.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Config`] for an unusable configuration
    /// - [`StoreError::Journal`] if the payload log cannot be opened
    /// - [`StoreError::Recovery`] if the metadata log cannot be replayed in
    ///   full
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        // The payload log is never scanned on open; reads go straight to
        // exact locations.
        let payload_options = JournalOptions {
            repair_tail: false,
            ..config.journal.clone()
        };
        let payloads = Journal::open(config.payload_dir(), payload_options)?;
        let metadata =
            Journal::open(config.metadata_dir(), config.journal.clone()).map_err(|e| {
                StoreError::Recovery {
                    entries: 0,
                    reason: e.to_string(),
                }
            })?;

        let entries = replay(&metadata)?;
        let count = entries.len();

        let mut capacity = config.initial_capacity;
        while capacity < count {
            capacity = capacity.saturating_mul(2);
        }
        let index = MetadataIndex::with_capacity(capacity);

        let mut abandoned = 0usize;
        for (id, entry) in entries.into_iter().enumerate() {
            if entry == Entry::Abandoned {
                abandoned += 1;
            }
            index.install(id, entry);
        }

        info!(
            data_dir = %config.data_dir.display(),
            events = count,
            abandoned,
            index_capacity = index.capacity(),
            "event store recovered"
        );

        Ok(Self {
            payloads,
            metadata,
            index,
            next_id: AtomicU64::new(count as u64),
            commits: CommitSequencer::new(count as u64),
            poisoned: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        })
    }

    /// Appends an event and returns its identifier.
    ///
    /// The identifier is consumed even when the append fails. If the
    /// payload cannot be written the identifier is recorded as abandoned and
    /// [`StoreError::DurableWrite`] is returned. If the metadata entry cannot
    /// be written the store refuses all further appends
    /// ([`StoreError::Poisoned`]).
    pub fn add_event(
        &self,
        event: &Event,
        user_id: i64,
        event_type_id: i32,
    ) -> Result<u64, StoreError> {
        self.check_open()?;
        if self.poisoned.load(Ordering::Acquire) {
            return Err(StoreError::Poisoned);
        }

        let id = self.next_id.fetch_add(1, Ordering::AcqRel);
        let slot = id as usize;
        self.index.ensure_capacity(slot);

        let payload = self.payloads.append(event.as_bytes());

        let turn = self.commits.wait_turn(id);
        if self.poisoned.load(Ordering::Acquire) {
            return Err(StoreError::Poisoned);
        }

        let (entry, outcome) = match payload {
            Ok(location) => (
                Entry::Event(MetaData::new(user_id, event_type_id, location)),
                Ok(id),
            ),
            Err(e) => (Entry::Abandoned, Err(StoreError::DurableWrite(e))),
        };

        if let Err(e) = self.metadata.append(&entry.to_bytes()) {
            self.poisoned.store(true, Ordering::Release);
            error!(id, error = %e, "metadata append failed, refusing further appends");
            return Err(StoreError::DurableWrite(e));
        }
        self.index.install(slot, entry);
        drop(turn);

        match &outcome {
            Ok(_) => debug!(id, user_id, event_type_id, "event appended"),
            Err(e) => warn!(id, error = %e, "payload append failed, identifier abandoned"),
        }
        outcome
    }

    /// Returns the metadata of event `id`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::OutOfRange`] if `id` was never assigned
    /// - [`StoreError::Abandoned`] if the append that took `id` failed
    /// - [`StoreError::Unpopulated`] if the append that took `id` is still
    ///   running
    pub fn get_event_metadata(&self, id: u64) -> Result<MetaData, StoreError> {
        self.check_open()?;

        let assigned = self.next_id.load(Ordering::Acquire);
        if id >= assigned {
            return Err(StoreError::OutOfRange { id, assigned });
        }

        match self.index.lookup(id as usize) {
            Some(Entry::Event(meta)) => Ok(meta),
            Some(Entry::Abandoned) => Err(StoreError::Abandoned { id }),
            None => Err(StoreError::Unpopulated { id }),
        }
    }

    /// Returns event `id`, fetched from the payload log.
    ///
    /// Fails like [`EventStore::get_event_metadata`], and additionally with
    /// [`StoreError::NotFound`] or [`StoreError::Corrupt`] when the payload
    /// log can no longer produce the stored record.
    pub fn get_event(&self, id: u64) -> Result<Event, StoreError> {
        let meta = self.get_event_metadata(id)?;
        let bytes = self
            .payloads
            .read(&meta.location)
            .map_err(|source| match source {
                JournalError::Closed => StoreError::Closed,
                JournalError::NotFound { .. } => StoreError::NotFound { id, source },
                JournalError::Corrupt { .. }
                | JournalError::ChecksumMismatch { .. }
                | JournalError::InvalidFrame { .. }
                | JournalError::TruncatedFrame { .. }
                | JournalError::InvalidHeader { .. } => StoreError::Corrupt { id, source },
                other => StoreError::Journal(other),
            })?;
        Ok(Event::from_bytes(&bytes))
    }

    /// Number of identifiers assigned so far.
    pub fn len(&self) -> u64 {
        self.next_id.load(Ordering::Acquire)
    }

    /// Returns true if no identifier has been assigned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns counters describing the store.
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        self.check_open()?;
        Ok(StoreStats {
            events: self.len(),
            index_capacity: self.index.capacity(),
            payload_segments: self.payloads.segment_count()?,
            metadata_segments: self.metadata.segment_count()?,
        })
    }

    /// Flushes and closes both logs.
    ///
    /// Closing twice is a no-op. Every other operation fails with
    /// [`StoreError::Closed`] afterwards.
    pub fn close(&self) -> Result<(), StoreError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let payloads = self.payloads.close();
        let metadata = self.metadata.close();
        payloads?;
        metadata?;
        info!(events = self.len(), "event store closed");
        Ok(())
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close event store");
        }
    }
}

/// Reads every metadata entry in log order.
fn replay(metadata: &Journal) -> Result<Vec<Entry>, StoreError> {
    let mut entries = Vec::new();
    let records = metadata.iter().map_err(|e| StoreError::Recovery {
        entries: 0,
        reason: e.to_string(),
    })?;

    for record in records {
        let position = entries.len() as u64;
        let (location, bytes) = record.map_err(|e| StoreError::Recovery {
            entries: position,
            reason: e.to_string(),
        })?;
        let entry = Entry::from_bytes(&bytes).map_err(|e| StoreError::Recovery {
            entries: position,
            reason: format!("entry at {}: {}", location, e),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
