//! Page data service
//!
//! Builds the data behind the profile page (`/@name`) and the single post
//! page. Generated pages are cached per path and regenerated once their
//! revalidate interval has passed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FeedService;
use crate::data::{Author, Database, PageCache, PostWithAuthor};
use crate::error::AppError;

/// Data for the profile page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
    /// Name taken from the slug
    pub name: String,
    /// `None` renders the not-found page
    pub user: Option<Author>,
    pub posts: Vec<PostWithAuthor>,
    pub generated_at: DateTime<Utc>,
    /// Seconds until the page is regenerated
    pub revalidate: u64,
}

/// Data for the single post page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub id: String,
    /// `None` renders the not-found page
    pub post: Option<PostWithAuthor>,
    pub generated_at: DateTime<Utc>,
    pub revalidate: u64,
}

/// Page data service
pub struct PageService {
    feed: FeedService,
    profiles: Arc<PageCache<ProfilePage>>,
    posts: Arc<PageCache<PostPage>>,
}

/// Profile slugs look like `@name`; only the first `@` is dropped.
pub fn name_from_slug(slug: &str) -> String {
    slug.replacen('@', "", 1)
}

/// Treat a missing record as an empty page section
fn found<T>(result: Result<T, AppError>) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AppError::NotFound) => Ok(None),
        Err(error) => Err(error),
    }
}

impl PageService {
    /// Create new page service
    pub fn new(
        db: Arc<Database>,
        profiles: Arc<PageCache<ProfilePage>>,
        posts: Arc<PageCache<PostPage>>,
    ) -> Self {
        Self {
            feed: FeedService::new(db),
            profiles,
            posts,
        }
    }

    /// Profile page for `slug`
    pub async fn profile_page(&self, slug: &str) -> Result<Arc<ProfilePage>, AppError> {
        let path = format!("/{slug}");
        if let Some(page) = self.profiles.get_fresh(&path).await {
            return Ok(page);
        }

        let name = name_from_slug(slug);
        let user = found(self.feed.get_user_by_name(&name).await)?;
        let posts = match &user {
            Some(user) => self.feed.list_posts_by_user(&user.id).await?,
            None => Vec::new(),
        };

        tracing::debug!(%path, found = user.is_some(), "Regenerated profile page");

        let page = ProfilePage {
            name,
            user,
            posts,
            generated_at: Utc::now(),
            revalidate: self.profiles.revalidate().as_secs(),
        };
        Ok(self.profiles.insert(&path, page).await)
    }

    /// Drop the cached profile pages of `name` so its next view is fresh
    ///
    /// Both slug spellings (`@name` and `name`) map to the same profile.
    pub async fn invalidate_profile(&self, name: &str) {
        self.profiles.invalidate(&format!("/@{name}")).await;
        self.profiles.invalidate(&format!("/{name}")).await;
    }

    /// Single post page for `id`
    pub async fn post_page(&self, id: &str) -> Result<Arc<PostPage>, AppError> {
        let path = format!("/post/{id}");
        if let Some(page) = self.posts.get_fresh(&path).await {
            return Ok(page);
        }

        let post = found(self.feed.get_post_by_id(id).await)?;

        tracing::debug!(%path, found = post.is_some(), "Regenerated post page");

        let page = PostPage {
            id: id.to_string(),
            post,
            generated_at: Utc::now(),
            revalidate: self.posts.revalidate().as_secs(),
        };
        Ok(self.posts.insert(&path, page).await)
    }
}
