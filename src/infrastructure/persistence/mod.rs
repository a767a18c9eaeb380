//! Link store implementations.
//!
//! - [`RedisLinkRepository`] - Production store on Redis hashes and a code set
//! - [`MemoryLinkRepository`] - In-process store for tests and local runs

pub mod memory_link_repository;
pub mod redis_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use redis_link_repository::RedisLinkRepository;
