//! Refresh Cache - demo topic server
//!
//! Serves a periodically refreshed topic cache over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use refresh_cache::api::{create_router, AppState};
use refresh_cache::topics::{new_topic_cache, update_topic, TopicCache, MAIN_TOPIC_KEY};
use refresh_cache::{CacheError, Config};

/// Main entry point for the demo topic server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the topic cache and register its update function
/// 4. Load the cache and hand over to periodic refresh
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. On SIGINT/SIGTERM cancel refreshes and close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refresh_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Refresh Cache topic server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: update_interval={:?}, port={}, error_buffer={}",
        config.update_interval, config.server_port, config.error_buffer
    );

    let topics = new_topic_cache(config.update_interval).context("failed to create topic cache")?;
    topics.add_update_func(MAIN_TOPIC_KEY, update_topic())?;

    let shutdown = CancellationToken::new();
    let (errors_tx, errors_rx) = mpsc::channel(config.error_buffer);
    let drain_handle = tokio::spawn(drain_errors(errors_rx));

    topics
        .cache()
        .start_and_manage_updates(shutdown.clone(), errors_tx)
        .await
        .context("initial topic cache load failed")?;
    info!("Topic cache loaded");

    let app = create_router(AppState::new(topics.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}/topics/{}", addr, MAIN_TOPIC_KEY);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown, topics))
        .await
        .context("server error")?;

    // The refresh task held the last sender, so the drain ends on its own
    if let Err(err) = drain_handle.await {
        warn!("Error drain task ended abnormally: {}", err);
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Logs every failed refresh cycle until the channel closes.
async fn drain_errors(mut errors: mpsc::Receiver<CacheError>) {
    while let Some(err) = errors.recv().await {
        error!("Topic cache refresh failed: {}", err);
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, cancels background refreshes and closes the cache.
async fn shutdown_signal(shutdown: CancellationToken, topics: TopicCache) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
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

    shutdown.cancel();
    topics.cache().close().await;
    warn!("Topic cache closed");
}
