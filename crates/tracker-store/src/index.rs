//! Dense in-memory index from event id to metadata.

use crate::metadata::Entry;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use tracing::debug;

type Table = Box<[OnceLock<Entry>]>;

/// Growable dense array mapping identifiers to metadata entries.
///
/// The table is published behind an `Arc`: lookups clone the current handle
/// and read from it without further locking, so they see either the table
/// before a resize or the one after, never a partial copy. Growth doubles the
/// table under an exclusive lock that also holds off installs, so no entry
/// written during a copy is lost.
#[derive(Debug)]
pub struct MetadataIndex {
    table: RwLock<Arc<Table>>,
    resize: RwLock<()>,
}

impl MetadataIndex {
    /// Creates an empty index with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: RwLock::new(Arc::new(empty_table(capacity.max(1)))),
            resize: RwLock::new(()),
        }
    }

    fn current(&self) -> Arc<Table> {
        Arc::clone(&self.table.read())
    }

    /// Number of slots in the current table.
    pub fn capacity(&self) -> usize {
        self.table.read().len()
    }

    /// Grows the table until slot `id` exists.
    ///
    /// Safe to race with other growers: the size is re-checked once the
    /// exclusive lock is held.
    pub fn ensure_capacity(&self, id: usize) {
        if id < self.capacity() {
            return;
        }

        let _exclusive = self.resize.write();
        let old = self.current();
        if id < old.len() {
            return;
        }

        let mut new_len = old.len();
        while new_len <= id {
            new_len = new_len.saturating_mul(2);
        }

        let mut grown = Vec::with_capacity(new_len);
        grown.extend(old.iter().cloned());
        grown.resize_with(new_len, OnceLock::new);
        *self.table.write() = Arc::new(grown.into_boxed_slice());

        debug!(from = old.len(), to = new_len, "grew metadata index");
    }

    /// Places `entry` in slot `id`, growing first if the slot does not exist.
    ///
    /// Returns false if the slot was already filled; the existing entry is
    /// kept.
    pub fn install(&self, id: usize, entry: Entry) -> bool {
        loop {
            {
                let _shared = self.resize.read();
                let table = self.current();
                if let Some(slot) = table.get(id) {
                    return slot.set(entry).is_ok();
                }
            }
            self.ensure_capacity(id);
        }
    }

    /// Returns the entry in slot `id`, or `None` if nothing was installed.
    pub fn lookup(&self, id: usize) -> Option<Entry> {
        self.current().get(id).and_then(|slot| slot.get().copied())
    }
}

fn empty_table(len: usize) -> Table {
    (0..len).map(|_| OnceLock::new()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetaData;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use tracker_journal::Location;

    fn entry(n: u64) -> Entry {
        Entry::Event(MetaData::new(
            n as i64,
            (n % 7) as i32,
            Location {
                segment: 0,
                offset: 16 + n * 32,
                len: 20,
            },
        ))
    }

    #[test]
    fn grows_by_doubling() {
        let index = MetadataIndex::with_capacity(4);
        index.ensure_capacity(3);
        assert_eq!(index.capacity(), 4);
        index.ensure_capacity(4);
        assert_eq!(index.capacity(), 8);
        index.ensure_capacity(20);
        assert_eq!(index.capacity(), 32);
    }

    #[test]
    fn zero_capacity_is_rounded_up() {
        let index = MetadataIndex::with_capacity(0);
        assert_eq!(index.capacity(), 1);
        assert!(index.install(5, entry(5)));
        assert_eq!(index.capacity(), 8);
    }

    #[test]
    fn growth_keeps_installed_entries() {
        let index = MetadataIndex::with_capacity(2);
        assert!(index.install(0, entry(0)));
        assert!(index.install(1, entry(1)));
        index.ensure_capacity(100);
        assert_eq!(index.lookup(0), Some(entry(0)));
        assert_eq!(index.lookup(1), Some(entry(1)));
        assert_eq!(index.lookup(2), None);
        assert_eq!(index.lookup(1_000), None);
    }

    #[test]
    fn slots_are_write_once() {
        let index = MetadataIndex::with_capacity(2);
        assert!(index.install(0, entry(0)));
        assert!(!index.install(0, entry(9)));
        assert_eq!(index.lookup(0), Some(entry(0)));
    }

    #[test]
    fn lookups_survive_concurrent_growth() {
        let index = MetadataIndex::with_capacity(1);
        for id in 0..16 {
            assert!(index.install(id, entry(id as u64)));
        }

        let stop = AtomicBool::new(false);
        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while !stop.load(Ordering::Relaxed) {
                        for id in 0..16 {
                            assert_eq!(index.lookup(id), Some(entry(id as u64)));
                        }
                    }
                });
            }

            for id in 16..4_096 {
                assert!(index.install(id, entry(id as u64)));
            }
            stop.store(true, Ordering::Relaxed);
        });

        for id in 0..4_096 {
            assert_eq!(index.lookup(id), Some(entry(id as u64)));
        }
    }

    #[test]
    fn concurrent_installs_are_not_lost() {
        let index = MetadataIndex::with_capacity(1);
        thread::scope(|scope| {
            for t in 0..8 {
                let index = &index;
                scope.spawn(move || {
                    for id in (t..2_000).step_by(8) {
                        index.ensure_capacity(id);
                        assert!(index.install(id, entry(id as u64)));
                    }
                });
            }
        });

        for id in 0..2_000 {
            assert_eq!(index.lookup(id), Some(entry(id as u64)));
        }
    }
}
