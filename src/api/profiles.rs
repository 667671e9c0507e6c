//! `profiles.*` procedures

use axum::extract::State;
use serde::Deserialize;

use super::rpc::{RpcInput, RpcOutput};
use crate::AppState;
use crate::data::Author;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};

#[derive(Debug, Deserialize)]
pub struct GetUserByNameInput {
    pub name: String,
}

/// GET /api/trpc/profiles.getUserByName
///
/// An unknown name is reported as `INTERNAL_SERVER_ERROR` with the message
/// "User not found"; clients already match on that pair.
pub async fn get_user_by_name(
    State(state): State<AppState>,
    RpcInput(input): RpcInput<GetUserByNameInput>,
) -> Result<RpcOutput<Author>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "profiles.getUserByName"])
        .start_timer();

    let author = state
        .feed_service()
        .get_user_by_name(&input.name)
        .await
        .map_err(|error| match error {
            AppError::NotFound => AppError::ServerError("User not found".to_string()),
            other => other,
        })?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "profiles.getUserByName", "200"])
        .inc();

    Ok(RpcOutput(author))
}
