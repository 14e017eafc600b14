use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;
use tracker_store::{Event, EventStore, JournalOptions, StoreConfig, StoreError};

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        data_dir: dir.path().to_path_buf(),
        initial_capacity: 2,
        journal: JournalOptions {
            sync: false,
            max_segment_size: 4096,
            ..JournalOptions::default()
        },
    }
}

fn payload(thread: usize, seq: usize) -> Event {
    Event::from(format!("t{}-e{}", thread, seq))
}

/// Appends `per_thread` events from each of `threads` threads at once and
/// returns `(id, thread, seq)` for every append.
fn append_concurrently(
    store: &Arc<EventStore>,
    threads: usize,
    per_thread: usize,
) -> Vec<(u64, usize, usize)> {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let store = Arc::clone(store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..per_thread)
                    .map(|i| {
                        let id = store.add_event(&payload(t, i), t as i64, i as i32).unwrap();
                        (id, t, i)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect()
}

#[test]
fn test_concurrent_appends_yield_contiguous_ids() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(EventStore::open(config(&temp_dir)).unwrap());

    let threads = 8;
    let per_thread = 100;
    let appended = append_concurrently(&store, threads, per_thread);

    let ids: HashSet<u64> = appended.iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids.len(), threads * per_thread);
    assert_eq!(ids, (0..(threads * per_thread) as u64).collect());

    for (id, t, i) in &appended {
        assert_eq!(store.get_event(*id).unwrap(), payload(*t, *i));
        let meta = store.get_event_metadata(*id).unwrap();
        assert_eq!(meta.user_id, *t as i64);
        assert_eq!(meta.event_type_id, *i as i32);
    }
}

#[test]
fn test_concurrent_appends_survive_restart() {
    let temp_dir = TempDir::new().unwrap();

    let appended = {
        let store = Arc::new(EventStore::open(config(&temp_dir)).unwrap());
        let appended = append_concurrently(&store, 6, 50);
        store.close().unwrap();
        appended
    };

    let store = EventStore::open(config(&temp_dir)).unwrap();
    assert_eq!(store.len(), 300);
    for (id, t, i) in &appended {
        assert_eq!(store.get_event(*id).unwrap(), payload(*t, *i));
        assert_eq!(store.get_event_metadata(*id).unwrap().user_id, *t as i64);
    }
    assert_eq!(store.add_event(&Event::from("next"), 0, 0).unwrap(), 300);
}

#[test]
fn test_readers_during_growth() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(EventStore::open(config(&temp_dir)).unwrap());

    for i in 0..4 {
        store.add_event(&payload(0, i), 0, i as i32).unwrap();
    }

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut reads = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    for i in 0..4 {
                        assert_eq!(store.get_event(i as u64).unwrap(), payload(0, i));
                    }
                    // Ids handed out but not yet committed may be seen as
                    // unpopulated; nothing else may fail.
                    let latest = store.len().saturating_sub(1);
                    match store.get_event_metadata(latest) {
                        Ok(_) | Err(StoreError::Unpopulated { .. }) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let writers: Vec<_> = (1..5)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..200 {
                    store.add_event(&payload(t, i), t as i64, i as i32).unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.len(), 804);
    assert!(store.stats().unwrap().index_capacity >= 804);
    for id in 0..804 {
        assert!(store.get_event_metadata(id).is_ok());
    }
}
