//! Link creation, resolution and management service.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::application::allocator::CodeAllocator;
use crate::domain::click_event::ClickEvent;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::url_validator::validate_url;

/// Service instance used by the HTTP layer, erased over the store backend.
pub type SharedLinkService = LinkService<dyn LinkRepository>;

/// Service for creating and resolving shortened links.
///
/// The store is injected at construction; nothing here reaches for global
/// state, so tests can run against mocks or
/// [`crate::infrastructure::persistence::MemoryLinkRepository`].
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    allocator: CodeAllocator,
    click_sender: mpsc::Sender<ClickEvent>,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        allocator: CodeAllocator,
        click_sender: mpsc::Sender<ClickEvent>,
    ) -> Self {
        Self {
            link_repository,
            allocator,
            click_sender,
        }
    }

    /// Shortens `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is shorter than 10 characters
    /// or does not start with `http://` / `https://`; nothing is persisted.
    /// Returns [`AppError::GenerationExhausted`] if no free code was found.
    /// Returns [`AppError::Storage`] on store failures.
    pub async fn create_short_link(&self, original_url: String) -> Result<Link, AppError> {
        validate_url(&original_url)?;

        let link = self
            .allocator
            .allocate_and_save(self.link_repository.as_ref(), original_url)
            .await?;

        metrics::counter!("links_created_total").increment(1);
        info!(code = %link.short_code, url = %link.original_url, "Short link created");

        Ok(link)
    }

    /// Returns the original URL for `code` and queues a click increment.
    ///
    /// The increment is handed to the click workers without waiting; a full
    /// or closed queue drops it. Neither case affects the returned URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    /// Returns [`AppError::Storage`] on store failures.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        let link = self.link_repository.find_by_code(code).await?;

        self.dispatch_click(code);
        metrics::counter!("redirects_total").increment(1);

        Ok(link.original_url)
    }

    /// Returns the full record for `code`. Does not count as a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    /// Returns [`AppError::Storage`] on store failures.
    pub async fn get_link_info(&self, code: &str) -> Result<Link, AppError> {
        self.link_repository.find_by_code(code).await
    }

    /// Returns every stored link in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the code index cannot be read.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.link_repository.find_all().await
    }

    /// Deletes the link for `code`. The code becomes available for reallocation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    /// Returns [`AppError::Storage`] on store failures.
    pub async fn delete_link(&self, code: &str) -> Result<(), AppError> {
        self.link_repository.delete(code).await.map_err(|e| match e {
            AppError::NotFound { .. } => {
                AppError::not_found("Short link not found", json!({ "code": code }))
            }
            other => other,
        })?;

        metrics::counter!("links_deleted_total").increment(1);
        info!(code, "Short link deleted");

        Ok(())
    }

    /// Reports whether the backing store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.link_repository.health_check().await
    }

    /// The sending half of the click queue, for health reporting.
    pub fn click_sender(&self) -> &mpsc::Sender<ClickEvent> {
        &self.click_sender
    }

    fn dispatch_click(&self, code: &str) {
        match self.click_sender.try_send(ClickEvent::new(code)) {
            Ok(()) => debug!(code, "Click queued"),
            Err(TrySendError::Full(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(code, "Click queue full, dropping click");
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(code, "Click queue closed, dropping click");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::allocator::CommitStrategy;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn create_test_link(code: &str, url: &str, clicks: u64) -> Link {
        Link::new(code.to_string(), url.to_string(), Utc::now(), clicks)
    }

    fn service(
        repo: MockLinkRepository,
        capacity: usize,
    ) -> (LinkService<MockLinkRepository>, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let service = LinkService::new(
            Arc::new(repo),
            CodeAllocator::new(CommitStrategy::LastWriterWins),
            tx,
        );
        (service, rx)
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(false));
        repo.expect_save()
            .withf(|link| link.original_url == "https://example.com/page")
            .times(1)
            .returning(|_| Ok(()));

        let (service, _rx) = service(repo, 8);
        let link = service
            .create_short_link("https://example.com/page".to_string())
            .await
            .unwrap();

        assert_eq!(link.short_code.len(), 6);
        assert_eq!(link.original_url, "https://example.com/page");
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_create_short_link_invalid_url_persists_nothing() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(0);
        repo.expect_save().times(0);
        repo.expect_save_if_absent().times(0);

        let (service, _rx) = service(repo, 8);

        for url in ["ftp://x", "short", "ftp://example.com/file"] {
            let result = service.create_short_link(url.to_string()).await;
            assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_create_short_link_storage_failure() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_save()
            .returning(|_| Err(AppError::storage("down", json!({}))));

        let (service, _rx) = service(repo, 8);
        let result = service
            .create_short_link("https://example.com".to_string())
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_resolve_returns_url_and_queues_click() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link("Ab3dE9", "https://example.com/page", 0);
        repo.expect_find_by_code()
            .withf(|code| code == "Ab3dE9")
            .times(1)
            .returning(move |_| Ok(link.clone()));
        repo.expect_increment_clicks().times(0);

        let (service, mut rx) = service(repo, 8);
        let url = service.resolve("Ab3dE9").await.unwrap();

        assert_eq!(url, "https://example.com/page");
        assert_eq!(rx.try_recv().unwrap(), ClickEvent::new("Ab3dE9"));
    }

    #[tokio::test]
    async fn test_resolve_not_found_queues_nothing() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .returning(|code| Err(AppError::not_found("Short link not found", json!({ "code": code }))));

        let (service, mut rx) = service(repo, 8);
        let result = service.resolve("missing").await;

        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_click_queue_full() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link("Ab3dE9", "https://example.com/page", 0);
        repo.expect_find_by_code()
            .returning(move |_| Ok(link.clone()));

        let (service, _rx) = service(repo, 1);

        assert!(service.resolve("Ab3dE9").await.is_ok());
        // Queue is now full; the second click is dropped silently.
        assert!(service.resolve("Ab3dE9").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_click_queue_closed() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link("Ab3dE9", "https://example.com/page", 0);
        repo.expect_find_by_code()
            .returning(move |_| Ok(link.clone()));

        let (service, rx) = service(repo, 4);
        drop(rx);

        assert_eq!(
            service.resolve("Ab3dE9").await.unwrap(),
            "https://example.com/page"
        );
    }

    #[tokio::test]
    async fn test_get_link_info_does_not_queue_click() {
        let mut repo = MockLinkRepository::new();
        let link = create_test_link("Ab3dE9", "https://example.com/page", 3);
        repo.expect_find_by_code()
            .returning(move |_| Ok(link.clone()));

        let (service, mut rx) = service(repo, 8);
        let info = service.get_link_info("Ab3dE9").await.unwrap();

        assert_eq!(info.clicks, 3);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_links_empty() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_all().times(1).returning(|| Ok(Vec::new()));

        let (service, _rx) = service(repo, 8);
        assert!(service.list_links().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_link_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete()
            .withf(|code| code == "doesnotexist")
            .returning(|_| Err(AppError::not_found("missing", json!({}))));

        let (service, _rx) = service(repo, 8);
        let result = service.delete_link("doesnotexist").await;

        match result.unwrap_err() {
            AppError::NotFound { details, .. } => assert_eq!(details["code"], "doesnotexist"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_link_success() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let (service, _rx) = service(repo, 8);
        assert!(service.delete_link("Ab3dE9").await.is_ok());
    }
}
