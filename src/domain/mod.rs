//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Store trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Background workers applying click increments
//!
//! # Click Processing Flow
//!
//! 1. A redirect lookup resolves the short code
//! 2. A [`click_event::ClickEvent`] is pushed onto a bounded channel (non-blocking)
//! 3. [`click_worker::run_click_workers`] applies the increment with retry logic
//! 4. Failures are logged and discarded; the redirect has already been answered

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
