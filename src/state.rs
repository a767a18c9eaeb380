//! Shared state injected into every HTTP handler.

use std::sync::Arc;

use crate::application::services::SharedLinkService;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<SharedLinkService>,
    /// Prefix for short URLs in responses, without trailing slash.
    pub base_url: String,
}

impl AppState {
    pub fn new(link_service: Arc<SharedLinkService>, base_url: impl Into<String>) -> Self {
        Self {
            link_service,
            base_url: base_url.into(),
        }
    }

    /// Builds the public short URL for `code`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }
}
