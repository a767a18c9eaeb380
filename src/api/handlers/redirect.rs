//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Top-level path segments that are never treated as short codes.
const RESERVED_PATHS: &[&str] = &["favicon.ico", "api", "health"];

/// Redirects a short code to its original URL with `301 Moved Permanently`.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Click Tracking
///
/// The click increment is queued for the background workers and not awaited.
/// The redirect is returned whether or not the increment later succeeds.
///
/// # Errors
///
/// Returns 404 Not Found for unknown and reserved codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if RESERVED_PATHS.contains(&code.as_str()) {
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        ));
    }

    let original_url = state.link_service.resolve(&code).await?;

    Ok((
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, original_url)],
    ))
}
