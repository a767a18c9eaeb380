//! API route configuration.

use crate::api::handlers::{
    delete_link_handler, link_info_handler, list_links_handler, shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Link management routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`        - Create a short link
/// - `GET    /info/{code}`    - Stored record for a code
/// - `GET    /links`          - All stored links
/// - `DELETE /links/{code}`   - Delete a link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/info/{code}", get(link_info_handler))
        .route("/links", get(list_links_handler))
        .route("/links/{code}", delete(delete_link_handler))
}
