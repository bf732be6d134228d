use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Canonical, storage-ready representation of a webhook delivery.
///
/// A `WebhookEvent` is independent of the vendor's payload shape. It is
/// produced by the normalizer, immutable after creation, and the only thing
/// the store ever holds; raw vendor payloads are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Identifier generated at ingestion time, never supplied by the vendor.
    pub id: EventId,

    /// Which normalization branch produced this record.
    pub event_type: EventKind,

    /// Full repository identifier (`owner/name`), `"unknown"` if absent.
    pub repo: String,

    /// Branch derived from the vendor ref notation, `"unknown"` if absent.
    pub branch: String,

    /// Display name of the actor who triggered the event.
    pub author: String,

    /// Avatar URL for the actor, possibly empty.
    pub author_avatar: String,

    /// When the service processed the event. Assigned at ingestion; vendor
    /// timestamps are never trusted for this field.
    pub timestamp: String,

    /// Commits in the vendor's delivery order, empty for non-push events.
    pub commits: Vec<CommitSummary>,

    /// When the event was handed to the durable store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<String>,
}

/// One commit entry of a push delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: String,
    pub message: String,
    pub author: String,
    pub timestamp: String,
}

/// Unique identifier for a stored event.
///
/// This is a strongly-typed wrapper to avoid accidental mixing of event IDs
/// with other string identifiers. It is the sole deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event types the normalizer recognizes and stores.
///
/// Unrecognized vendor types are acknowledged upstream but never reach the
/// store, so nothing else appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Push,
    Ping,
    Test,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Push => f.write_str("push"),
            EventKind::Ping => f.write_str("ping"),
            EventKind::Test => f.write_str("test"),
        }
    }
}

/// Current processing time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current processing time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
