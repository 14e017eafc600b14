//! Error types for store operations.

use thiserror::Error;
use tracker_journal::JournalError;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An append to the payload or metadata log failed.
    #[error("durable write failed: {0}")]
    DurableWrite(#[source] JournalError),
    /// The identifier was never assigned.
    #[error("event id {id} out of range ({assigned} assigned)")]
    OutOfRange {
        /// Requested identifier.
        id: u64,
        /// Number of identifiers assigned so far.
        assigned: u64,
    },
    /// The payload log no longer holds the event's record.
    #[error("payload for event {id} not found: {source}")]
    NotFound {
        /// Requested identifier.
        id: u64,
        /// Underlying journal error.
        source: JournalError,
    },
    /// The payload log holds a damaged record for the event.
    #[error("payload for event {id} is corrupt: {source}")]
    Corrupt {
        /// Requested identifier.
        id: u64,
        /// Underlying journal error.
        source: JournalError,
    },
    /// The metadata log could not be replayed.
    #[error("recovery failed after {entries} metadata entries: {reason}")]
    Recovery {
        /// Entries replayed before the failure.
        entries: u64,
        /// What went wrong.
        reason: String,
    },
    /// The identifier is assigned but its append has not finished.
    #[error("event {id} is not yet committed")]
    Unpopulated {
        /// Requested identifier.
        id: u64,
    },
    /// The identifier was consumed by an append whose payload write failed.
    #[error("event {id} was abandoned by a failed append")]
    Abandoned {
        /// Requested identifier.
        id: u64,
    },
    /// A metadata append failed; the store no longer accepts writes.
    #[error("store is poisoned by a failed metadata append")]
    Poisoned,
    /// The store has been closed.
    #[error("store is closed")]
    Closed,
    /// A metadata record could not be decoded.
    #[error("invalid metadata record: {0}")]
    InvalidMetaData(String),
    /// Journal error outside the cases above.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true for lookups of identifiers that were never handed out.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StoreError::OutOfRange { .. })
    }
}
