//! Segmented append-only journal for the tracker event store.
//!
//! This crate provides:
//! - Framed, checksummed, append-only storage for opaque records
//! - Positional reads through [`Location`] tokens handed out by appends
//! - Forward replay of every record in append order
//! - Torn-tail repair when a journal is reopened after a crash
//!
//! ## Quick Start
//!
//! ```rust
//! use tracker_journal::{Journal, JournalOptions, Location};
//!
//! let dir = tempfile::tempdir()?;
//! let journal = Journal::open(dir.path(), JournalOptions::default())?;
//!
//! let first = journal.append(b"first")?;
//! let second = journal.append(b"second")?;
//!
//! // Locations encode to a fixed 16 bytes and can be stored elsewhere.
//! let encoded = second.to_bytes();
//! assert_eq!(journal.read(&Location::from_bytes(&encoded)?)?, b"second");
//!
//! let replayed: Vec<_> = journal.iter()?.collect::<Result<_, _>>()?;
//! assert_eq!(replayed[0], (first, b"first".to_vec()));
//! journal.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Types
//!
//! - [`Journal`] - Segmented journal with append, read, and replay
//! - [`Location`] - Token identifying one stored record
//! - [`SegmentWriter`] / [`SegmentReader`] - Single-segment file access

#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Frame structure and serialization.
pub mod frame;
/// Segmented journal.
pub mod journal;
/// Location tokens and their encoding.
pub mod location;
/// Segment reader implementation.
pub mod reader;
/// Segment writer implementation.
pub mod writer;

pub use errors::JournalError;
pub use frame::{FrameKind, RecordFrame, SegmentHeader};
pub use journal::{Journal, JournalIter, JournalOptions};
pub use location::{Location, LOCATION_SIZE};
pub use reader::{ReadMode, SegmentReader};
pub use writer::SegmentWriter;
