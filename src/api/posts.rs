//! `posts.*` procedures

use axum::extract::State;
use serde::Deserialize;

use super::rpc::{RpcInput, RpcOutput};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::data::{Post, PostWithAuthor};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct GetByIdInput {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPostsByUserIdInput {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostInput {
    pub content: String,
}

/// GET /api/trpc/posts.getAll
pub async fn get_all(
    State(state): State<AppState>,
) -> Result<RpcOutput<Vec<PostWithAuthor>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "posts.getAll"])
        .start_timer();

    let posts = state.feed_service().list_recent_posts().await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "posts.getAll", "200"])
        .inc();

    Ok(RpcOutput(posts))
}

/// GET /api/trpc/posts.getById
pub async fn get_by_id(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<GetByIdInput>,
) -> Result<RpcOutput<PostWithAuthor>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "posts.getById"])
        .start_timer();

    let post = state.feed_service().get_post_by_id(&input.id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "posts.getById", "200"])
        .inc();

    Ok(RpcOutput(post))
}

/// GET /api/trpc/posts.getPostsByUserId
pub async fn get_posts_by_user_id(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<GetPostsByUserIdInput>,
) -> Result<RpcOutput<Vec<PostWithAuthor>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "posts.getPostsByUserId"])
        .start_timer();

    let posts = state
        .feed_service()
        .list_posts_by_user(&input.user_id)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "posts.getPostsByUserId", "200"])
        .inc();

    Ok(RpcOutput(posts))
}

/// POST /api/trpc/posts.create
///
/// The author is always the session user.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    RpcInput(input): RpcInput<CreatePostInput>,
) -> Result<RpcOutput<Post>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "posts.create"])
        .start_timer();

    let post = state
        .post_service()
        .create_post(&session.user_id, input.content)
        .await?;

    // The author's cached profile page is missing the new post.
    if let Some(name) = state
        .feed_service()
        .get_user_by_id(&session.user_id)
        .await?
        .and_then(|author| author.name)
    {
        state.page_service().invalidate_profile(&name).await;
    }

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "posts.create", "200"])
        .inc();

    Ok(RpcOutput(post))
}
