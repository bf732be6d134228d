use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::warn;

use crate::error::StorageError;
use crate::storage::SnapshotStorage;
use crate::types::{now_iso, WebhookEvent};

/// Append-ordered, bounded, deduplicated collection of normalized events.
///
/// The store keeps its working set most-recent-first and enforces the
/// capacity bound and id uniqueness internally; handlers never touch the
/// underlying collection. Writers exclude each other, readers observe either
/// the pre- or post-mutation state atomically.
pub struct EventStore {
    events: RwLock<Vec<WebhookEvent>>,
    capacity: usize,
    storage: Arc<dyn SnapshotStorage>,
    persist_timeout: Duration,
}

impl EventStore {
    /// Open a store over `storage`, loading whatever snapshot survives from
    /// a previous run.
    ///
    /// A snapshot that cannot be loaded is logged and treated as empty: the
    /// service keeps accepting deliveries rather than refusing to boot over
    /// lost history.
    pub async fn open(
        storage: Arc<dyn SnapshotStorage>,
        capacity: usize,
        persist_timeout: Duration,
    ) -> Self {
        let mut events = match storage.load().await {
            Ok(events) => events,
            Err(err) => {
                warn!(error = %err, "failed to load snapshot, starting with empty history");
                Vec::new()
            }
        };

        let capacity = capacity.max(1);
        events.truncate(capacity);

        Self {
            events: RwLock::new(events),
            capacity,
            storage,
            persist_timeout,
        }
    }

    /// Insert `event` at the head unless an event with the same id is
    /// already stored. Returns whether an insertion occurred.
    ///
    /// Insertion past capacity evicts from the tail. Eviction is FIFO on
    /// insertion order, not on event timestamps, since insertion order is
    /// the only monotonic signal under network reordering. The snapshot is
    /// flushed before this returns; a flush failure keeps the in-memory
    /// append.
    pub async fn append(&self, mut event: WebhookEvent) -> bool {
        let mut guard = self.events.write().await;
        if guard.iter().any(|stored| stored.id == event.id) {
            return false;
        }

        event.received_at = Some(now_iso());
        guard.insert(0, event);
        guard.truncate(self.capacity);

        self.persist_snapshot(&guard).await;
        true
    }

    /// Events in store order (most-recent-first), optionally truncated.
    pub async fn list(&self, limit: Option<usize>) -> Vec<WebhookEvent> {
        let guard = self.events.read().await;
        match limit {
            Some(n) => guard.iter().take(n).cloned().collect(),
            None => guard.clone(),
        }
    }

    /// Empty the store and its durable backing. Irreversible.
    pub async fn clear(&self) {
        let mut guard = self.events.write().await;
        guard.clear();
        self.persist_snapshot(&guard).await;
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Flush the current snapshot, bounded by the persist timeout.
    ///
    /// Failure is logged, not propagated: the vendor will not redeliver an
    /// acknowledged webhook, so losing the durable copy is preferable to
    /// losing the only delivery attempt.
    async fn persist_snapshot(&self, events: &[WebhookEvent]) {
        match tokio::time::timeout(self.persist_timeout, self.storage.persist(events)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "snapshot persist failed, keeping in-memory state");
            }
            Err(_) => {
                warn!(error = %StorageError::Timeout, "snapshot persist timed out, keeping in-memory state");
            }
        }
    }
}
