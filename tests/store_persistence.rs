use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use webhook_ingest::{
    CommitSummary, EventId, EventKind, EventStore, FileSnapshot, SnapshotStorage, WebhookEvent,
};

fn event(id: &str) -> WebhookEvent {
    WebhookEvent {
        id: EventId(id.to_string()),
        event_type: EventKind::Push,
        repo: "octocat/hello-world".to_string(),
        branch: "main".to_string(),
        author: "octocat".to_string(),
        author_avatar: String::new(),
        timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        commits: vec![CommitSummary {
            id: "c1".to_string(),
            message: "first".to_string(),
            author: "octocat".to_string(),
            timestamp: "2026-01-01T00:00:00.000Z".to_string(),
        }],
        received_at: None,
    }
}

const PERSIST_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn appended_events_survive_a_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("webhooks.json");

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    store.append(event("a")).await;
    store.append(event("b")).await;
    drop(store);

    let reopened = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    let events = reopened.list(None).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id.0, "b");
    assert_eq!(events[1].id.0, "a");
    assert_eq!(events[0].commits.len(), 1);
    assert!(events[0].received_at.is_some());
}

#[tokio::test]
async fn reopen_truncates_oversized_snapshot_to_capacity() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("webhooks.json");

    let snapshot = FileSnapshot::new(&path);
    let events: Vec<_> = (0..5).map(|i| event(&format!("evt_{i}"))).collect();
    snapshot.persist(&events).await.unwrap();

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 3, PERSIST_TIMEOUT).await;
    let loaded = store.list(None).await;
    assert_eq!(loaded.len(), 3);
    // most-recent-first order means the head of the snapshot survives
    assert_eq!(loaded[0].id.0, "evt_0");
    assert_eq!(loaded[2].id.0, "evt_2");
}

#[tokio::test]
async fn missing_snapshot_loads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.json");

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn corrupt_snapshot_starts_empty_and_recovers() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("webhooks.json");
    std::fs::write(&path, b"{ this is not a snapshot").unwrap();

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    assert!(store.is_empty().await);

    // the next append rewrites a valid snapshot over the corrupt one
    store.append(event("a")).await;
    let reopened = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    assert_eq!(reopened.len().await, 1);
}

#[tokio::test]
async fn persist_leaves_no_temp_file_behind() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("webhooks.json");

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    store.append(event("a")).await;

    assert!(path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path() != path)
        .collect();
    assert!(leftovers.is_empty(), "unexpected files: {leftovers:?}");

    // the snapshot on disk is well-formed JSON
    let bytes = std::fs::read(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn clear_empties_the_durable_backing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("webhooks.json");

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    store.append(event("a")).await;
    store.clear().await;

    let reopened = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    assert!(reopened.is_empty().await);
}

#[tokio::test]
async fn snapshot_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("data").join("webhooks.json");

    let store = EventStore::open(Arc::new(FileSnapshot::new(&path)), 100, PERSIST_TIMEOUT).await;
    store.append(event("a")).await;
    assert!(path.exists());
}
