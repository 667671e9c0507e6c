//! API layer
//!
//! HTTP handlers for:
//! - Procedure calls under `/api/trpc` (feed, posts, profiles)
//! - Page data (profile and single post pages)
//! - Metrics (Prometheus)

pub mod metrics;
mod pages;
mod posts;
mod profiles;
mod rpc;
mod users;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::AppState;
use crate::auth::require_auth;

pub use metrics::metrics_router;
pub use pages::pages_router;
pub use posts::{CreatePostInput, GetByIdInput, GetPostsByUserIdInput};
pub use profiles::GetUserByNameInput;
pub use rpc::{RpcInput, RpcOutput};

/// Create procedure router
///
/// Queries are `GET /<procedure>?input=...`, mutations `POST /<procedure>`
/// with a JSON body. Mutations require a session.
pub fn rpc_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/posts.getAll", get(posts::get_all))
        .route("/posts.getById", get(posts::get_by_id))
        .route("/posts.getPostsByUserId", get(posts::get_posts_by_user_id))
        .route("/profiles.getUserByName", get(profiles::get_user_by_name))
        .route("/users.byUserId", get(users::by_user_id));

    let protected = Router::new()
        .route("/posts.create", post(posts::create))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
