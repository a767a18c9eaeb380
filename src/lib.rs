//! # Shortlink
//!
//! A small URL shortening service built with Axum and Redis.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Link entity, store trait, click workers
//! - **Application Layer** ([`application`]) - Code allocation and link service
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - 6-character codes from a cryptographically secure source, collision-checked
//! - Optional strict allocation with atomic create-if-absent commits
//! - Click counting off the request path through a bounded worker pool
//! - Rate limiting, CORS and structured logging
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! export BASE_URL="http://localhost:8080"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::allocator::{CodeAllocator, CommitStrategy};
    pub use crate::application::services::{LinkService, SharedLinkService};
    pub use crate::domain::entities::Link;
    pub use crate::domain::repositories::LinkRepository;
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::{MemoryLinkRepository, RedisLinkRepository};
    pub use crate::state::AppState;
}
