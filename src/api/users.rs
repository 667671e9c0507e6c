//! `users.*` procedures

use axum::extract::State;

use super::rpc::RpcOutput;
use crate::AppState;
use crate::auth::MaybeUser;
use crate::data::Author;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

/// GET /api/trpc/users.byUserId
///
/// Author projection of the signed-in user. `null` when the session user
/// no longer exists.
pub async fn by_user_id(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
) -> Result<RpcOutput<Option<Author>>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "users.byUserId"])
        .start_timer();

    let session = session.ok_or(AppError::Unauthorized)?;
    let author = state.feed_service().get_user_by_id(&session.user_id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "users.byUserId", "200"])
        .inc();

    Ok(RpcOutput(author))
}
