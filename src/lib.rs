//! A single-process webhook ingestion service.
//!
//! This crate receives GitHub webhook deliveries over HTTP, normalizes their
//! heterogeneous payload shapes into one canonical event record, and keeps a
//! **bounded, deduplicated, most-recent-first** rolling history that it
//! serves back as JSON.
//!
//! ## Guarantees
//! - Bounded resource usage: the history never exceeds its configured capacity
//! - Deduplication by event id
//! - Every stored event passed through the normalizer
//! - Acknowledged deliveries survive a restart (best-effort snapshot)
//!
//! ## Non-Guarantees
//! - Strict serializability across writers beyond a single mutation path
//! - Durability when the snapshot write itself fails (the in-memory append
//!   is kept and the failure logged, so the vendor is not provoked into a
//!   retry storm)
//! - Distributed coordination
//!
//! This crate is intentionally **not a delivery engine**. It is the receiving
//! end: accept, normalize, bound, persist, serve.

mod config;
mod error;
mod http;
mod normalize;
mod signing;
mod storage;
mod store;
mod types;

pub use config::ServerConfig;
pub use error::StorageError;
pub use http::{build_router, Ack, AppState, EVENT_HEADER};
pub use normalize::{normalize, synthetic_event, Normalized};
pub use signing::{compute_signature, verify_signature, SIGNATURE_HEADER};
pub use storage::{FileSnapshot, InMemorySnapshot, SnapshotStorage};
pub use store::EventStore;
pub use types::{CommitSummary, EventId, EventKind, WebhookEvent};
