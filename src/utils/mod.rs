//! Helper functions used across the application.
//!
//! - [`code_generator`] - Short code generation
//! - [`url_validator`] - Validation of submitted URLs
//! - [`mask`] - Redaction of credentials in connection strings

pub mod code_generator;
pub mod mask;
pub mod url_validator;
