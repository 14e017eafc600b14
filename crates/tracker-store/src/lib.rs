//! Embedded event store with dense identifiers and fast restart.
//!
//! This crate provides:
//! - [`EventStore`]: append events, fetch them and their metadata by id
//! - Two durable logs per store: payloads and fixed-size metadata entries
//! - A dense in-memory [`MetadataIndex`] rebuilt from the metadata log alone
//!   when a store is reopened
//!
//! Identifiers start at 0 and are never reused. Appends may run from many
//! threads at once; reads never wait on index growth.
//!
//! ## Quick Start
//!
//! ```rust
//! use tracker_store::{Event, EventStore};
//!
//! let dir = tempfile::tempdir()?;
//! {
//!     let store = EventStore::build(dir.path())?;
//!     assert_eq!(store.add_event(&Event::from("a"), 1, 10)?, 0);
//!     assert_eq!(store.add_event(&Event::from("b"), 2, 20)?, 1);
//!     store.close()?;
//! }
//!
//! let store = EventStore::build(dir.path())?;
//! assert_eq!(store.get_event(0)?, Event::from("a"));
//! assert_eq!(store.get_event_metadata(1)?.event_type_id, 20);
//! assert_eq!(store.add_event(&Event::from("c"), 3, 30)?, 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

mod commit;
/// Store configuration.
pub mod config;
/// Error types for store operations.
pub mod error;
/// Event payloads.
pub mod event;
/// In-memory metadata index.
pub mod index;
/// Metadata records.
pub mod metadata;
/// The event store.
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use event::Event;
pub use index::MetadataIndex;
pub use metadata::{Entry, MetaData, METADATA_RECORD_SIZE};
pub use store::{EventStore, StoreStats};
pub use tracker_journal::{JournalOptions, Location};
