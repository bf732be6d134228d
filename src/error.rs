use std::fmt;

/// Errors surfaced by the snapshot storage backends.
///
/// Storage failures never abort an acknowledged ingestion; the store logs
/// them and keeps its in-memory state. They are still typed so backends and
/// tests can tell the cases apart.
#[derive(Debug)]
pub enum StorageError {
    /// Reading or writing the snapshot file failed.
    Io(std::io::Error),

    /// The snapshot on disk could not be encoded or decoded.
    Serde(serde_json::Error),

    /// The durable write did not finish within the configured bound.
    Timeout,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "snapshot i/o failed: {err}"),
            StorageError::Serde(err) => write!(f, "snapshot encoding failed: {err}"),
            StorageError::Timeout => write!(f, "snapshot write timed out"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err)
    }
}
