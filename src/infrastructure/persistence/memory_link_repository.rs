//! In-process implementation of the link repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    records: HashMap<String, Link>,
    codes: HashSet<String>,
}

/// Link store held in memory.
///
/// Mirrors the Redis layout (records plus a code index) behind a single lock,
/// so every operation is atomic. Used by tests and for running the service
/// without Redis; contents are lost on restart.
#[derive(Default)]
pub struct MemoryLinkRepository {
    inner: RwLock<Inner>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops the record for `code` but leaves it in the index, reproducing the
    /// window between an index read and record removal.
    #[cfg(test)]
    async fn remove_record_only(&self, code: &str) {
        self.inner.write().await.records.remove(code);
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": code }))
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn save(&self, link: &Link) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner
            .records
            .insert(link.short_code.clone(), link.clone());
        inner.codes.insert(link.short_code.clone());
        Ok(())
    }

    async fn save_if_absent(&self, link: &Link) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&link.short_code) {
            return Ok(false);
        }
        inner
            .records
            .insert(link.short_code.clone(), link.clone());
        inner.codes.insert(link.short_code.clone());
        Ok(true)
    }

    async fn find_by_code(&self, code: &str) -> Result<Link, AppError> {
        self.inner
            .read()
            .await
            .records
            .get(code)
            .cloned()
            .ok_or_else(|| not_found(code))
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.inner.read().await.records.contains_key(code))
    }

    async fn increment_clicks(&self, code: &str) -> Result<(), AppError> {
        if let Some(link) = self.inner.write().await.records.get_mut(code) {
            link.clicks += 1;
        }
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Link>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .codes
            .iter()
            .filter_map(|code| inner.records.get(code).cloned())
            .collect())
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.records.remove(code).is_none() {
            return Err(not_found(code));
        }
        inner.codes.remove(code);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
