//! HTTP surface: ingestion, query, test, and the uniform 404.
//!
//! The ingestion handler captures the raw body bytes before any parsing so
//! signature verification covers the body exactly as the vendor sent it.
//! Every recognized-or-ignorable delivery is acknowledged with 200: vendors
//! interpret non-2xx as delivery failure and eventually disable the hook.

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::normalize::{self, Normalized};
use crate::signing;
use crate::store::EventStore;
use crate::types::{EventKind, WebhookEvent};

/// Header carrying the vendor's event-type discriminator.
pub const EVENT_HEADER: &str = "X-GitHub-Event";

/// Shared state for all route handlers.
pub struct AppState {
    pub store: EventStore,

    /// Shared secret for signature verification, `None` to accept unsigned
    /// deliveries.
    pub secret: Option<Vec<u8>>,
}

/// Acknowledgment body for ingestion and test deliveries.
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookEvent>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    limit: Option<usize>,
}

/// Build the full HTTP surface over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhooks/github", post(ingest).get(list_events))
        .route("/webhooks/github/test", post(create_test_event))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn ingest(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(secret) = state.secret.as_deref() {
        let verified = headers
            .get(signing::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|header| signing::verify_signature(secret, &body, header));
        if !verified {
            warn!(bytes = body.len(), "rejected delivery: missing or invalid signature");
            return error_response(StatusCode::UNAUTHORIZED, "Invalid signature");
        }
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!(bytes = body.len(), error = %err, "rejected delivery: body is not valid JSON");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body");
        }
    };

    let event_type = headers
        .get(EVENT_HEADER)
        .and_then(|value| value.to_str().ok());

    match normalize::normalize(event_type, &payload) {
        Normalized::Event(event) => {
            let inserted = state.store.append(event.clone()).await;
            if inserted {
                let stored = state.store.len().await;
                info!(
                    event_type = %event.event_type,
                    repo = %event.repo,
                    stored = stored,
                    "webhook processed"
                );
                ack(ack_message(event.event_type), Some(event))
            } else {
                info!(id = %event.id, "duplicate delivery ignored");
                ack("Duplicate webhook ignored", Some(event))
            }
        }
        Normalized::Ignored { event_type } => {
            debug!(%event_type, "acknowledged unrecognized event type");
            ack("Webhook received", None)
        }
    }
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let events = state.store.list(params.limit).await;
    info!(count = events.len(), "returning stored webhooks");
    Json(events).into_response()
}

/// Synthesize a fabricated event and run it through the same `append` path
/// as real ingestion, so the two cannot silently diverge in invariants.
async fn create_test_event(State(state): State<Arc<AppState>>) -> Response {
    let event = normalize::synthetic_event();
    state.store.append(event.clone()).await;
    info!(id = %event.id, "synthesized test webhook");
    ack("Test webhook created", Some(event))
}

async fn not_found(method: Method, uri: Uri) -> Response {
    debug!(%method, %uri, "no route matched");
    error_response(StatusCode::NOT_FOUND, "Not found")
}

fn ack(message: &str, webhook: Option<WebhookEvent>) -> Response {
    Json(Ack {
        success: true,
        message: message.to_string(),
        webhook,
    })
    .into_response()
}

fn ack_message(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Ping => "Ping received",
        EventKind::Push => "Webhook processed",
        EventKind::Test => "Test webhook created",
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Outermost safety net: a panicking handler becomes a generic 500 with the
/// detail kept in the logs, never in the response.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(%detail, "request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Unknown error")
}
