use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::types::WebhookEvent;

/// Durable backing for the event store.
///
/// The store mutates its in-memory working set and hands the whole snapshot
/// to the backend. Delivery volume is low enough that read-modify-write over
/// a full snapshot is the right trade; backends only need to make the write
/// itself atomic.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    async fn load(&self) -> Result<Vec<WebhookEvent>, StorageError>;
    async fn persist(&self, events: &[WebhookEvent]) -> Result<(), StorageError>;
}

/// In-memory snapshot for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemorySnapshot {
    events: Mutex<Vec<WebhookEvent>>,
}

impl InMemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStorage for InMemorySnapshot {
    async fn load(&self) -> Result<Vec<WebhookEvent>, StorageError> {
        Ok(self.events.lock().await.clone())
    }

    async fn persist(&self, events: &[WebhookEvent]) -> Result<(), StorageError> {
        *self.events.lock().await = events.to_vec();
        Ok(())
    }
}

/// Single-file JSON snapshot.
///
/// The snapshot is written to a sibling temp file and renamed into place, so
/// a crash mid-write never leaves a truncated history behind. A missing file
/// loads as an empty history.
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SnapshotStorage for FileSnapshot {
    async fn load(&self) -> Result<Vec<WebhookEvent>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn persist(&self, events: &[WebhookEvent]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(events)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
