//! Page data endpoints
//!
//! Serve the cached data behind the profile and single post pages.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::AppState;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

/// GET /pages/post/:id
async fn post_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/pages/post/:id"])
        .start_timer();

    let page = state.page_service().post_page(&id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/pages/post/:id", "200"])
        .inc();

    Ok(Json(&*page).into_response())
}

/// GET /pages/:slug
///
/// `slug` is the profile path segment, e.g. `@ferris`.
async fn profile_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/pages/:slug"])
        .start_timer();

    let page = state.page_service().profile_page(&slug).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/pages/:slug", "200"])
        .inc();

    Ok(Json(&*page).into_response())
}

/// Create page data router
pub fn pages_router() -> Router<AppState> {
    Router::new()
        .route("/post/:id", get(post_page))
        .route("/:slug", get(profile_page))
}
