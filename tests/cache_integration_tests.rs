//! Integration Tests for the cache engine
//!
//! Exercises persistence across engine restarts, the background sweep and
//! the record store through the public API.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use durable_cache::cache::{CacheChange, ChangeKind, ManualClock, StorageType};
use durable_cache::models::User;
use durable_cache::{
    CacheConfig, CacheEngine, CacheError, CacheHandle, FileBackend, MemoryBackend,
    PersistenceBackend, RecordStore,
};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

fn config() -> CacheConfig {
    CacheConfig {
        default_ttl: Duration::from_secs(60),
        max_size: 100,
        storage_key: "integration_cache".to_string(),
        enable_persistence: true,
        cleanup_interval: Duration::from_secs(60),
    }
}

fn open(backend: &FileBackend, clock: &ManualClock) -> CacheEngine<String> {
    CacheEngine::with_clock(config(), backend.clone(), Arc::new(clock.clone())).unwrap()
}

// == Persistence Round-Trip ==

#[test]
fn test_restart_restores_entries() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    let clock = ManualClock::new(1_000_000);

    let mut engine = open(&backend, &clock);
    assert_ok!(engine.set("alpha", "1".to_string(), None));
    assert_ok!(engine.set("beta", "2".to_string(), Some(Duration::from_millis(500))));
    drop(engine);

    let mut engine = open(&backend, &clock);
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.stats().storage_type, StorageType::Persistent);
    assert_eq!(engine.get("alpha"), Some("1".to_string()));
    assert_eq!(engine.ttl_remaining("beta"), Some(Duration::from_millis(500)));
}

#[test]
fn test_restart_after_elapsed_time_respects_expiry() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    let clock = ManualClock::new(1_000_000);

    let mut engine = open(&backend, &clock);
    assert_ok!(engine.set("short", "s".to_string(), Some(Duration::from_millis(100))));
    assert_ok!(engine.set("long", "l".to_string(), None));
    drop(engine);

    clock.advance(200);
    let mut engine = open(&backend, &clock);

    // Restored as-is; liveness is decided on access.
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.get("short"), None);
    assert_eq!(engine.get("long"), Some("l".to_string()));
}

#[test]
fn test_clear_then_restart_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    let clock = ManualClock::new(1_000_000);

    let mut engine = open(&backend, &clock);
    assert_ok!(engine.set("alpha", "1".to_string(), None));
    assert_ok!(engine.clear());
    drop(engine);

    let engine = open(&backend, &clock);
    assert!(engine.is_empty());
    assert!(!backend.path_for("integration_cache").exists());
}

#[test]
fn test_corrupt_snapshot_on_disk_is_discarded() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    fs::write(backend.path_for("integration_cache"), "[[\"half").unwrap();

    let engine = open(&backend, &ManualClock::new(0));

    assert!(engine.is_empty());
    assert_eq!(backend.read("integration_cache").unwrap(), None);
}

#[test]
fn test_unreadable_snapshot_file_is_erased() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());
    // Not valid UTF-8, so the backend read itself fails.
    fs::write(backend.path_for("integration_cache"), [0xff, 0xfe, 0x00, 0x5b]).unwrap();
    assert_err!(backend.read("integration_cache"));

    let engine = open(&backend, &ManualClock::new(0));

    assert!(engine.is_empty());
    assert!(!backend.path_for("integration_cache").exists());
}

#[test]
fn test_write_failure_reported_to_caller() {
    let temp_dir = TempDir::new().unwrap();
    // A file where the backend expects a directory makes every write fail.
    let blocker = temp_dir.path().join("not_a_dir");
    fs::write(&blocker, "").unwrap();
    let backend = FileBackend::new(&blocker);

    let mut engine: CacheEngine<String> = CacheEngine::new(config(), backend).unwrap();
    let result = engine.set("alpha", "1".to_string(), None);

    assert!(matches!(result, Err(CacheError::Persistence(_))));
    assert_eq!(engine.get("alpha"), Some("1".to_string()));
}

// == Eviction Scenario ==

#[test]
fn test_least_used_eviction_scenario() {
    let clock = ManualClock::new(5_000);
    let config = CacheConfig {
        max_size: 2,
        ..config()
    };
    let mut engine: CacheEngine<String> =
        CacheEngine::with_clock(config, MemoryBackend::new(), Arc::new(clock.clone())).unwrap();
    let ttl = Some(Duration::from_millis(1000));

    assert_ok!(engine.set("A", "a".to_string(), ttl));
    clock.advance(1);
    assert_ok!(engine.set("B", "b".to_string(), ttl));
    clock.advance(1);
    assert_eq!(engine.get("A"), Some("a".to_string()));
    clock.advance(1);
    assert_ok!(engine.set("C", "c".to_string(), ttl));

    assert_eq!(engine.len(), 2);
    assert!(engine.has("A"));
    assert!(!engine.has("B"));
    assert!(engine.has("C"));
}

// == Handle and Sweep ==

#[tokio::test]
async fn test_background_sweep_publishes_changes() {
    let config = CacheConfig {
        cleanup_interval: Duration::from_millis(50),
        ..config()
    };
    let engine: CacheEngine<String> = CacheEngine::new(config, MemoryBackend::new()).unwrap();
    let cache = CacheHandle::start(engine);
    let mut changes = cache.subscribe().await;

    assert_ok!(
        cache
            .set("ephemeral", "e".to_string(), Some(Duration::from_millis(20)))
            .await
    );
    assert_eq!(
        changes.recv().await.unwrap(),
        CacheChange::keyed("ephemeral", ChangeKind::Set)
    );

    let swept = tokio::time::timeout(Duration::from_secs(2), changes.recv())
        .await
        .expect("sweep should run")
        .unwrap();
    assert_eq!(swept, CacheChange::table(ChangeKind::Swept { removed: 1 }));
    assert_eq!(cache.stats().await.total_items, 0);

    assert!(cache.shutdown());
    assert!(!cache.shutdown());
}

// == Record Store ==

#[tokio::test]
async fn test_record_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let backend = FileBackend::new(temp_dir.path());

    {
        let engine = CacheEngine::new(config(), backend.clone()).unwrap();
        let users = RecordStore::<User>::new(CacheHandle::new(engine));
        assert_ok!(users.add(User::new("1", "Ada", "ada@example.com")).await);
        assert_ok!(users.add(User::new("2", "Linus", "linus@example.com")).await);
        assert_ok!(users.remove("1").await);
    }

    let engine = CacheEngine::new(config(), backend).unwrap();
    let users = RecordStore::<User>::new(CacheHandle::new(engine));

    let listed = users.list().await;
    assert_eq!(listed, vec![User::new("2", "Linus", "linus@example.com")]);
    assert_err!(users.update(User::new("1", "Ada", "ada@example.com")).await);
}

#[tokio::test]
async fn test_record_store_mutations_notify_subscribers() {
    let engine: CacheEngine<Vec<User>> = CacheEngine::in_memory(config()).unwrap();
    let users = RecordStore::new(CacheHandle::new(engine));
    let mut changes = users.cache().subscribe().await;

    assert_ok!(users.add(User::new("1", "Ada", "ada@example.com")).await);
    assert_ok!(users.update(User::new("1", "Ada L.", "ada@example.com")).await);

    for _ in 0..2 {
        assert_eq!(
            changes.recv().await.unwrap(),
            CacheChange::keyed("users", ChangeKind::Set)
        );
    }
}
