use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webhook_ingest::{build_router, AppState, EventStore, FileSnapshot, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let storage = Arc::new(FileSnapshot::new(config.data_path.clone()));
    let store = EventStore::open(storage, config.max_events, config.persist_timeout).await;

    let state = Arc::new(AppState {
        store,
        secret: config.secret.as_ref().map(|s| s.as_bytes().to_vec()),
    });
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, signature_check = config.secret.is_some(), "webhook server listening");
    info!("  GET  /webhooks/github       - stored webhook history");
    info!("  POST /webhooks/github       - receive GitHub webhook");
    info!("  POST /webhooks/github/test  - synthesize a test webhook");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
