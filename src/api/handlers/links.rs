//! Handlers for link inspection and management endpoints.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::{LinkInfo, MessageResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored record for a short code.
///
/// # Endpoint
///
/// `GET /api/info/{code}`
///
/// # Response
///
/// ```json
/// {
///   "short_code": "Ab3dE9",
///   "original_url": "https://example.com/page",
///   "created_at": "2024-05-01T12:30:00Z",
///   "clicks": 1
/// }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn link_info_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfo>, AppError> {
    let link = state.link_service.get_link_info(&code).await?;
    Ok(Json(link.into()))
}

/// Lists every stored link in unspecified order.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// An empty store yields `[]`.
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkInfo>>, AppError> {
    let links = state.link_service.list_links().await?;
    Ok(Json(links.into_iter().map(LinkInfo::from).collect()))
}

/// Deletes a short link. The code may be reallocated afterwards.
///
/// # Endpoint
///
/// `DELETE /api/links/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    state.link_service.delete_link(&code).await?;

    Ok(Json(MessageResponse {
        message: "Link deleted successfully".to_string(),
    }))
}
