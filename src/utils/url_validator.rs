//! Validation of URLs submitted for shortening.

use crate::error::AppError;
use serde_json::json;

/// Shortest URL accepted, counting the scheme.
pub const MIN_URL_LENGTH: usize = 10;

const ALLOWED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Checks that `url` is long enough and uses `http://` or `https://`.
///
/// The URL is otherwise stored exactly as given.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when either rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com/page").is_ok());
/// assert!(validate_url("ftp://x").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<(), AppError> {
    if url.len() < MIN_URL_LENGTH {
        return Err(AppError::bad_request(
            "Invalid URL format. URL must start with http:// or https://",
            json!({ "reason": "too_short", "min_length": MIN_URL_LENGTH, "provided_length": url.len() }),
        ));
    }

    if !ALLOWED_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(AppError::bad_request(
            "Invalid URL format. URL must start with http:// or https://",
            json!({ "reason": "unsupported_scheme" }),
        ));
    }

    Ok(())
}
