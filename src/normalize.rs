//! Vendor payload normalization.
//!
//! Pure transformation from GitHub's heterogeneous webhook payloads into the
//! canonical event shape, branching on the `X-GitHub-Event` discriminator.
//! Missing optional fields degrade to documented fallbacks; only a body that
//! is not a JSON object at all is a hard failure, and that is the HTTP
//! layer's problem.

use serde_json::Value;

use crate::types::{now_iso, now_millis, CommitSummary, EventId, EventKind, WebhookEvent};

/// Outcome of running a delivery through the normalizer.
#[derive(Debug, Clone)]
pub enum Normalized {
    /// A recognized event, ready for the store.
    Event(WebhookEvent),

    /// An event type this service does not track. It must still be
    /// acknowledged with a 2xx upstream, since vendors disable delivery on
    /// repeated non-2xx responses.
    Ignored { event_type: String },
}

/// Normalize a vendor delivery into the canonical event shape.
///
/// `event_type` is the discriminator header value, `payload` the parsed
/// request body. An absent discriminator is treated as unrecognized.
pub fn normalize(event_type: Option<&str>, payload: &Value) -> Normalized {
    match event_type {
        Some("ping") => Normalized::Event(normalize_ping(payload)),
        Some("push") => Normalized::Event(normalize_push(payload)),
        Some(other) => Normalized::Ignored {
            event_type: other.to_string(),
        },
        None => Normalized::Ignored {
            event_type: "unknown".to_string(),
        },
    }
}

fn normalize_ping(payload: &Value) -> WebhookEvent {
    WebhookEvent {
        id: EventId(format!("github_ping_{}", now_millis())),
        event_type: EventKind::Ping,
        repo: str_at(payload, &["repository", "full_name"], "unknown"),
        // ping carries no ref
        branch: "main".to_string(),
        author: str_at(payload, &["sender", "login"], "github"),
        author_avatar: str_at(payload, &["sender", "avatar_url"], ""),
        timestamp: now_iso(),
        commits: Vec::new(),
        received_at: None,
    }
}

fn normalize_push(payload: &Value) -> WebhookEvent {
    let branch = payload
        .get("ref")
        .and_then(Value::as_str)
        .and_then(|r| r.rsplit('/').next())
        .unwrap_or("unknown")
        .to_string();

    let commits = payload
        .get("commits")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(normalize_commit).collect())
        .unwrap_or_default();

    WebhookEvent {
        id: EventId(format!("github_{}", now_millis())),
        event_type: EventKind::Push,
        repo: str_at(payload, &["repository", "full_name"], "unknown"),
        branch,
        author: str_at(payload, &["pusher", "name"], "unknown"),
        author_avatar: str_at(payload, &["sender", "avatar_url"], ""),
        timestamp: now_iso(),
        commits,
        received_at: None,
    }
}

/// Map a single vendor commit entry, substituting fallbacks for anything
/// missing or mistyped. A malformed entry never aborts the delivery.
fn normalize_commit(entry: &Value) -> CommitSummary {
    CommitSummary {
        id: str_at(entry, &["id"], "unknown"),
        message: str_at(entry, &["message"], ""),
        author: str_at(entry, &["author", "name"], "unknown"),
        timestamp: entry
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(now_iso),
    }
}

/// Fully-populated fabricated event for exercising the pipeline without a
/// real vendor delivery.
pub fn synthetic_event() -> WebhookEvent {
    let now = now_iso();
    WebhookEvent {
        id: EventId(format!("github_test_{}", now_millis())),
        event_type: EventKind::Test,
        repo: "octocat/hello-world".to_string(),
        branch: "main".to_string(),
        author: "test-user".to_string(),
        author_avatar: "https://avatars.githubusercontent.com/u/1".to_string(),
        timestamp: now.clone(),
        commits: vec![CommitSummary {
            id: "test123".to_string(),
            message: "Test commit from webhook test endpoint".to_string(),
            author: "test-user".to_string(),
            timestamp: now,
        }],
        received_at: None,
    }
}

/// Read a string at a key path, falling back when any step is missing or
/// the leaf is not a string.
fn str_at(value: &Value, path: &[&str], fallback: &str) -> String {
    let mut current = value;
    for key in path {
        match current.get(key) {
            Some(next) => current = next,
            None => return fallback.to_string(),
        }
    }
    current.as_str().unwrap_or(fallback).to_string()
}
