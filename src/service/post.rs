//! Post creation service
//!
//! Validates, rate limits and persists new posts.

use std::sync::Arc;

use chrono::Utc;

use super::validation::validate_content;
use crate::data::{Database, EntityId, Post};
use crate::error::AppError;
use crate::metrics::{POSTS_CREATED_TOTAL, RATE_LIMITED_TOTAL};
use crate::rate_limit::{RateLimitDecision, RateLimiter};

/// Post service
pub struct PostService {
    db: Arc<Database>,
    limiter: Arc<dyn RateLimiter>,
}

impl PostService {
    /// Create new post service
    pub fn new(db: Arc<Database>, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { db, limiter }
    }

    /// Create a new post
    ///
    /// # Arguments
    /// * `author_id` - Id of the signed-in user, taken from the session
    /// * `content` - Emoji-only text, 1 to 280 characters
    ///
    /// # Errors
    /// - `Validation` when content is rejected (nothing is rate limited)
    /// - `RateLimited` when the author exhausted the window (nothing is inserted)
    /// - limiter and database failures propagate unchanged, without retry
    pub async fn create_post(&self, author_id: &str, content: String) -> Result<Post, AppError> {
        validate_content(&content).map_err(AppError::Validation)?;

        match self.limiter.limit(author_id).await? {
            RateLimitDecision::Allowed { remaining } => {
                tracing::debug!(author_id, remaining, "Rate limit check passed");
            }
            RateLimitDecision::Limited { retry_after } => {
                RATE_LIMITED_TOTAL.inc();
                tracing::info!(
                    author_id,
                    retry_after_secs = retry_after.as_secs(),
                    "Post rejected by rate limiter"
                );
                return Err(AppError::RateLimited);
            }
        }

        let post = Post {
            id: EntityId::new().0,
            content,
            author_id: author_id.to_string(),
            created_at: Utc::now(),
        };
        self.db.insert_post(&post).await?;

        POSTS_CREATED_TOTAL.inc();
        tracing::info!(post_id = %post.id, author_id, "Post created");

        Ok(post)
    }
}
