#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use shortlink::application::allocator::{CodeAllocator, CommitStrategy};
use shortlink::application::services::LinkService;
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::entities::Link;
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use shortlink::routes::base_router;
use shortlink::state::AppState;
use tokio::sync::mpsc;

pub const BASE_URL: &str = "http://sho.rt";

pub struct TestContext {
    pub state: AppState,
    pub clicks: mpsc::Receiver<ClickEvent>,
    pub store: Arc<MemoryLinkRepository>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with(CommitStrategy::default(), 100)
}

pub fn create_test_state_with(strategy: CommitStrategy, queue_capacity: usize) -> TestContext {
    let store = Arc::new(MemoryLinkRepository::new());
    let (tx, rx) = mpsc::channel(queue_capacity);

    let repository: Arc<dyn LinkRepository> = store.clone();
    let link_service = Arc::new(LinkService::new(
        repository,
        CodeAllocator::new(strategy),
        tx,
    ));

    TestContext {
        state: AppState::new(link_service, BASE_URL),
        clicks: rx,
        store,
    }
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(base_router(state)).unwrap()
}

pub async fn create_test_link(store: &MemoryLinkRepository, code: &str, url: &str) {
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    store
        .save(&Link::new(code.to_string(), url.to_string(), created_at, 0))
        .await
        .unwrap();
}
