//! Repository trait for short link persistence.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Store contract for links, keyed by short code.
///
/// Alongside one record per code the store keeps a secondary index of every
/// active code; [`save`](Self::save) adds to it and [`delete`](Self::delete)
/// removes from it.
///
/// Implementations must be safe for concurrent use from many request tasks.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::RedisLinkRepository`] - Redis hash + set
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-process maps
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts or overwrites the record and adds the code to the index.
    ///
    /// Never fails merely because the code already exists (last writer wins).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend failures.
    async fn save(&self, link: &Link) -> Result<(), AppError>;

    /// Inserts the record only if no record exists for its code.
    ///
    /// Returns `Ok(false)` without writing anything when the code is taken.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend failures.
    async fn save_if_absent(&self, link: &Link) -> Result<bool, AppError>;

    /// Loads the full record for a code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists.
    /// Returns [`AppError::Storage`] on backend failures.
    async fn find_by_code(&self, code: &str) -> Result<Link, AppError>;

    /// Checks whether a record exists for a code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend failures.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Atomically adds one to the click counter.
    ///
    /// A missing record is a no-op; the record is never recreated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] on backend failures.
    async fn increment_clicks(&self, code: &str) -> Result<(), AppError>;

    /// Resolves every indexed code to its record.
    ///
    /// Codes whose record cannot be loaded (e.g. deleted between the index
    /// read and the lookup) are skipped. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`] if the index itself cannot be read.
    async fn find_all(&self) -> Result<Vec<Link>, AppError>;

    /// Removes the record and its index entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists.
    /// Returns [`AppError::Storage`] on backend failures.
    async fn delete(&self, code: &str) -> Result<(), AppError>;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> bool;
}
