//! Background workers applying click-count increments.
//!
//! A fixed set of tasks share one bounded queue. Every increment is retried
//! with exponential backoff; when retries run out the failure is logged and
//! dropped. Nothing is ever reported back to the redirect that produced it.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

/// Base delay of the exponential backoff, in milliseconds.
const BACKOFF_BASE_MS: u64 = 10;

/// Runs `concurrency` workers until the queue is closed and drained.
///
/// The queue closes once every [`mpsc::Sender`] has been dropped, so awaiting
/// this future after shutting the server down flushes pending clicks.
pub async fn run_click_workers(
    rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let rx = Arc::new(Mutex::new(rx));
    let mut workers = JoinSet::new();

    for id in 0..concurrency.max(1) {
        workers.spawn(worker_loop(id, rx.clone(), repository.clone()));
    }

    while let Some(result) = workers.join_next().await {
        if let Err(e) = result {
            warn!(error = %e, "Click worker terminated abnormally");
        }
    }

    info!("Click workers stopped");
}

async fn worker_loop(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<ClickEvent>>>,
    repository: Arc<dyn LinkRepository>,
) {
    debug!(worker = id, "Click worker started");

    loop {
        // The lock is held only while waiting for the next event.
        let event = rx.lock().await.recv().await;
        let Some(event) = event else {
            break;
        };

        process_click(repository.as_ref(), &event).await;
    }

    debug!(worker = id, "Click worker finished");
}

/// Applies one increment, retrying transient store failures.
pub async fn process_click(repository: &dyn LinkRepository, event: &ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(BACKOFF_BASE_MS)
        .map(jitter)
        .take(MAX_RETRIES);
    let code = event.code.as_str();

    match Retry::start(strategy, move || repository.increment_clicks(code)).await {
        Ok(()) => {
            metrics::counter!("clicks_recorded_total").increment(1);
            debug!(code, "Click recorded");
        }
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            warn!(code, error = %e, "Dropping click after retries");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::AppError;
    use serde_json::json;

    #[tokio::test]
    async fn test_process_click_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(|_| Ok(()));

        process_click(&repo, &ClickEvent::new("abc123")).await;
    }

    #[tokio::test]
    async fn test_process_click_retries_then_gives_up() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks()
            .times(MAX_RETRIES + 1)
            .returning(|_| Err(AppError::storage("down", json!({}))));

        process_click(&repo, &ClickEvent::new("abc123")).await;
    }

    #[tokio::test]
    async fn test_process_click_recovers_after_transient_failure() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_increment_clicks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::storage("blip", json!({}))));
        repo.expect_increment_clicks()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        process_click(&repo, &ClickEvent::new("abc123")).await;
    }

    #[tokio::test]
    async fn test_workers_drain_queue_and_stop_when_closed() {
        let mut repo = MockLinkRepository::new();
        repo.expect_increment_clicks().times(5).returning(|_| Ok(()));

        let (tx, rx) = mpsc::channel(16);
        for i in 0..5 {
            tx.send(ClickEvent::new(format!("code{i}"))).await.unwrap();
        }
        drop(tx);

        run_click_workers(rx, Arc::new(repo), 3).await;
    }
}
