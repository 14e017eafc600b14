use tempfile::TempDir;
use tracker_store::{Event, EventStore, JournalOptions, StoreConfig, StoreError};

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        data_dir: dir.path().to_path_buf(),
        initial_capacity: 4,
        journal: JournalOptions {
            sync: false,
            ..JournalOptions::default()
        },
    }
}

#[test]
fn test_basic_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::build(temp_dir.path()).unwrap();

    assert_eq!(store.add_event(&Event::from("a"), 1, 10).unwrap(), 0);
    assert_eq!(store.add_event(&Event::from("b"), 2, 20).unwrap(), 1);

    assert_eq!(store.get_event(0).unwrap(), Event::from("a"));

    let meta = store.get_event_metadata(1).unwrap();
    assert_eq!(meta.user_id, 2);
    assert_eq!(meta.event_type_id, 20);

    match store.get_event_metadata(5) {
        Err(StoreError::OutOfRange { id, assigned }) => {
            assert_eq!(id, 5);
            assert_eq!(assigned, 2);
        }
        other => panic!("Expected OutOfRange error, got {:?}", other),
    }
}

#[test]
fn test_ids_are_dense() {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::open(config(&temp_dir)).unwrap();
    assert!(store.is_empty());

    for i in 0..50u64 {
        let id = store
            .add_event(&Event::from(format!("event-{}", i)), i as i64, 1)
            .unwrap();
        assert_eq!(id, i);
    }

    assert_eq!(store.len(), 50);
    for i in 0..50 {
        assert!(store.get_event_metadata(i).is_ok());
    }
    for i in 50..60 {
        assert!(store.get_event_metadata(i).unwrap_err().is_out_of_range());
        assert!(store.get_event(i).unwrap_err().is_out_of_range());
    }
}

#[test]
fn test_round_trip_beyond_initial_capacity() {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::open(config(&temp_dir)).unwrap();

    let events: Vec<(Event, i64, i32)> = (0..100)
        .map(|i| (Event::new(vec![i as u8; i % 17]), -(i as i64), (i % 5) as i32))
        .collect();

    for (event, user_id, event_type_id) in &events {
        store.add_event(event, *user_id, *event_type_id).unwrap();
    }
    assert!(store.stats().unwrap().index_capacity >= 100);

    for (i, (event, user_id, event_type_id)) in events.iter().enumerate() {
        let id = i as u64;
        assert_eq!(&store.get_event(id).unwrap(), event);
        let meta = store.get_event_metadata(id).unwrap();
        assert_eq!(meta.user_id, *user_id);
        assert_eq!(meta.event_type_id, *event_type_id);
    }
}

#[test]
fn test_failed_payload_append_consumes_id() {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::open(config(&temp_dir)).unwrap();

    store.add_event(&Event::from("a"), 1, 10).unwrap();

    let oversized = Event::new(vec![0u8; 16 * 1024 * 1024 + 1]);
    assert!(matches!(
        store.add_event(&oversized, 2, 20),
        Err(StoreError::DurableWrite(_))
    ));
    assert!(matches!(
        store.get_event_metadata(1),
        Err(StoreError::Abandoned { id: 1 })
    ));

    assert_eq!(store.add_event(&Event::from("c"), 3, 30).unwrap(), 2);
    assert_eq!(store.get_event(2).unwrap(), Event::from("c"));
}

#[test]
fn test_close_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let store = EventStore::open(config(&temp_dir)).unwrap();
    store.add_event(&Event::from("a"), 1, 10).unwrap();

    store.close().unwrap();
    store.close().unwrap();

    assert!(matches!(
        store.add_event(&Event::from("b"), 2, 20),
        Err(StoreError::Closed)
    ));
    assert!(matches!(store.get_event(0), Err(StoreError::Closed)));
    assert!(matches!(store.get_event_metadata(0), Err(StoreError::Closed)));
    assert!(matches!(store.stats(), Err(StoreError::Closed)));
}

#[test]
fn test_logs_are_created_under_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(&temp_dir);
    let store = EventStore::open(config.clone()).unwrap();
    store.add_event(&Event::from("a"), 1, 10).unwrap();

    assert!(config.payload_dir().is_dir());
    assert!(config.metadata_dir().is_dir());

    let stats = store.stats().unwrap();
    assert_eq!(stats.events, 1);
    assert_eq!(stats.payload_segments, 1);
    assert_eq!(stats.metadata_segments, 1);
}

#[test]
fn test_invalid_config_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig {
        initial_capacity: 0,
        ..config(&temp_dir)
    };
    assert!(matches!(EventStore::open(config), Err(StoreError::Config(_))));
}
