//! Feedline - A social feed backend core
//!
//! Composition root: constructs the timeline store, feed cache, repository,
//! event bus and rate governor, wires them into the HTTP surface and the
//! fan-out consumer, and owns their lifecycle.

mod api;
mod clock;
mod config;
mod error;
mod events;
mod fanout;
mod feed;
mod limit;
mod models;
mod repo;
mod tasks;
mod timeline;

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use fanout::{spawn_fanout_consumer, FanoutConsumer};
use tasks::spawn_cleanup_task;

/// Main entry point for the feed backend.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Construct the shared stores, repository, event bus and governor
/// 4. Start the fan-out consumer and the cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedline=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Feedline");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: max_timeline_entries={}, feed_cache_ttl={}s, port={}, rate={}per{}ms",
        config.max_timeline_entries,
        config.feed_cache_ttl_secs,
        config.server_port,
        config.rate_max_requests,
        config.rate_window_ms
    );

    // Construct the full object graph; the consumer gets the receiving half
    // of the event bus
    let (state, event_stream) = AppState::from_config(&config);
    info!("Stores and repository initialized");

    // Start the fan-out consumer
    let consumer = FanoutConsumer::new(
        state.timelines.clone(),
        state.repo.clone(),
        state.tombstones.clone(),
        config.fanout_chunk_size,
    );
    let consumer_handle = spawn_fanout_consumer(consumer, event_stream);
    info!("Fan-out consumer started");

    // Start background cleanup task
    let cleanup_handle = spawn_cleanup_task(
        state.cache.clone(),
        state.governor.clone(),
        state.tombstones.clone(),
        config.cleanup_interval_secs,
    );
    info!("Background cleanup task started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown; ConnectInfo feeds the rate
    // governor's peer-address identity fallback
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(consumer_handle, cleanup_handle))
    .await
    .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful shutdown.
async fn shutdown_signal(consumer_handle: JoinHandle<()>, cleanup_handle: JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the background tasks
    consumer_handle.abort();
    cleanup_handle.abort();
    warn!("Background tasks aborted");
}
