//! perfq API server.

use std::sync::Arc;

use perfq_api::{AppState, routes};
use perfq_config::{ApiSettings, QueueSettings, RedisSettings};
use perfq_queue::JobQueue;
use perfq_store::RedisStore;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let queue_settings = QueueSettings::from_env()?;
    let redis = RedisSettings::from_env()?;
    let api = ApiSettings::from_env()?;

    info!(url = %redis.url, "Connecting to store...");
    let store = RedisStore::connect_with_queue_key(&redis.url, &redis.queue_key).await?;
    info!("Store connected");

    let queue = Arc::new(JobQueue::new(
        Arc::new(store),
        queue_settings.fetch_timeout_seconds,
    ));
    let state = AppState::new(queue, queue_settings, api.auth_token.clone());

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    info!(bind = %api.bind, "Starting perfq API");
    let listener = TcpListener::bind(&api.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
