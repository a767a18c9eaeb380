//! Short code allocation.
//!
//! The allocator draws candidates from a [`CodeGenerator`], probes the store
//! for each one and commits the first free code together with its link.
//!
//! # Race window
//!
//! The existence probe and the commit are separate store calls. Two concurrent
//! allocations can both see the same candidate as free:
//!
//! - [`CommitStrategy::LastWriterWins`] commits with
//!   [`LinkRepository::save`]; the later writer overwrites the earlier record.
//!   This is the default and matches the historical behaviour of the service.
//! - [`CommitStrategy::CreateIfAbsent`] commits with
//!   [`LinkRepository::save_if_absent`]; the loser sees the code as taken and
//!   moves on to the next candidate, spending one attempt.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

/// Candidates tried before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// How a free code is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitStrategy {
    /// Existence check, then unconditional save.
    #[default]
    LastWriterWins,
    /// Existence check, then atomic create-if-absent.
    CreateIfAbsent,
}

/// Produces currently-unused short codes. Holds no state of its own.
#[derive(Clone)]
pub struct CodeAllocator {
    generator: Arc<dyn CodeGenerator>,
    strategy: CommitStrategy,
    max_attempts: usize,
}

impl CodeAllocator {
    /// Creates an allocator backed by the OS random source.
    pub fn new(strategy: CommitStrategy) -> Self {
        Self::with_generator(Arc::new(RandomCodeGenerator), strategy)
    }

    /// Creates an allocator with a custom candidate source.
    pub fn with_generator(generator: Arc<dyn CodeGenerator>, strategy: CommitStrategy) -> Self {
        Self {
            generator,
            strategy,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    /// Returns the first candidate the store reports as unused.
    ///
    /// Nothing is written; see the module docs for the race this leaves open.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::GenerationExhausted`] after [`MAX_ATTEMPTS`] collisions.
    /// Returns [`AppError::Storage`] if an existence probe fails.
    pub async fn allocate<L>(&self, repository: &L) -> Result<String, AppError>
    where
        L: LinkRepository + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate()?;

            if !repository.exists(&code).await? {
                return Ok(code);
            }

            self.record_collision(&code, attempt);
        }

        Err(self.exhausted())
    }

    /// Allocates a code for `original_url` and commits the new link.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate`]. Save failures are returned as [`AppError::Storage`].
    pub async fn allocate_and_save<L>(
        &self,
        repository: &L,
        original_url: String,
    ) -> Result<Link, AppError>
    where
        L: LinkRepository + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate()?;

            if repository.exists(&code).await? {
                self.record_collision(&code, attempt);
                continue;
            }

            let link = Link::fresh(code, original_url.clone());

            match self.strategy {
                CommitStrategy::LastWriterWins => {
                    repository.save(&link).await?;
                    return Ok(link);
                }
                CommitStrategy::CreateIfAbsent => {
                    if repository.save_if_absent(&link).await? {
                        return Ok(link);
                    }
                    warn!(code = %link.short_code, "Lost allocation race, retrying");
                    self.record_collision(&link.short_code, attempt);
                }
            }
        }

        Err(self.exhausted())
    }

    fn record_collision(&self, code: &str, attempt: usize) {
        metrics::counter!("allocation_collisions_total").increment(1);
        debug!(code, attempt, "Short code collision");
    }

    fn exhausted(&self) -> AppError {
        AppError::generation_exhausted(
            "Failed to generate unique code",
            json!({ "attempts": self.max_attempts }),
        )
    }
}
