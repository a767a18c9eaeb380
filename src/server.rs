//! HTTP server initialization and runtime setup.
//!
//! Handles the store connection, worker spawning, and Axum server lifecycle.

use crate::application::allocator::CodeAllocator;
use crate::application::services::{LinkService, SharedLinkService};
use crate::config::Config;
use crate::domain::click_worker::run_click_workers;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::persistence::RedisLinkRepository;
use crate::routes::{RateLimit, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Upper bound on waiting for queued clicks after the listener stops.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Redis connection (retried until `redis_connect_attempts` is spent)
/// - Background click workers
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the click queue is closed and drained before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Redis stays unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository: Arc<dyn LinkRepository> = Arc::new(
        RedisLinkRepository::connect(&config.redis_url, config.redis_connect_attempts)
            .await
            .context("Failed to initialize link store")?,
    );

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let workers = tokio::spawn(run_click_workers(
        click_rx,
        repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!(
        "Click workers started ({} tasks)",
        config.click_worker_concurrency
    );

    let allocator = CodeAllocator::new(config.commit_strategy());
    let link_service: Arc<SharedLinkService> =
        Arc::new(LinkService::new(repository, allocator, click_tx));

    let state = AppState::new(link_service, config.base_url.clone());

    let app = app_router(
        state,
        RateLimit {
            per_second: config.rate_limit_per_second,
            burst: config.rate_limit_burst,
            behind_proxy: config.behind_proxy,
        },
    )?;

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router, and with it the last click sender, is gone; workers exit
    // once the queue is empty.
    tracing::info!("Draining click queue");
    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, workers).await {
        Ok(Ok(())) => tracing::info!("Click queue drained"),
        Ok(Err(e)) => tracing::warn!("Click worker pool failed: {}", e),
        Err(_) => tracing::warn!("Timed out draining click queue"),
    }

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
