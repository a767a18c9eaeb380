//! Infrastructure layer for external integrations.
//!
//! Implements the store trait defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - Redis and in-memory repository implementations

pub mod persistence;
