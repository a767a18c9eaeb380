//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without persistence concerns. The only
//! entity is [`Link`], the mapping between a short code and its target URL.

pub mod link;

pub use link::Link;
