//! Feed service
//!
//! Read-only queries behind the feed, post and profile pages.

use std::sync::Arc;

use crate::data::{Author, Database, PostWithAuthor};
use crate::error::AppError;

/// Maximum posts returned by any feed query
pub const FEED_LIMIT: usize = 100;

/// Feed service
pub struct FeedService {
    db: Arc<Database>,
}

impl FeedService {
    /// Create new feed service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Newest posts of all authors, at most [`FEED_LIMIT`]
    pub async fn list_recent_posts(&self) -> Result<Vec<PostWithAuthor>, AppError> {
        self.db.get_recent_posts(FEED_LIMIT).await
    }

    /// Newest posts of one author, at most [`FEED_LIMIT`]
    ///
    /// An unknown author or one without posts yields an empty list.
    pub async fn list_posts_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PostWithAuthor>, AppError> {
        self.db.get_posts_by_author(user_id, FEED_LIMIT).await
    }

    /// Single post with its author
    ///
    /// # Errors
    /// `NotFound` when no post has this id
    pub async fn get_post_by_id(&self, id: &str) -> Result<PostWithAuthor, AppError> {
        self.db
            .get_post_with_author(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Author projection by exact name
    ///
    /// # Errors
    /// `NotFound` when no user has this name
    pub async fn get_user_by_name(&self, name: &str) -> Result<Author, AppError> {
        self.db
            .get_author_by_name(name)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Author projection by id, if the user exists
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<Author>, AppError> {
        self.db.get_author_by_id(id).await
    }
}
