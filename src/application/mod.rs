//! Application layer implementing business logic.
//!
//! Services consume the repository traits from [`crate::domain`] and provide a
//! small API for HTTP handlers and the admin CLI.
//!
//! - [`allocator::CodeAllocator`] - Collision-checked short code allocation
//! - [`services::LinkService`] - Create, resolve, inspect, list and delete links

pub mod allocator;
pub mod services;
