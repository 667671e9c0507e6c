//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services receive their database and limiter handles explicitly.

mod feed;
mod pages;
mod post;
pub mod validation;

pub use feed::{FEED_LIMIT, FeedService};
pub use pages::{PageService, PostPage, ProfilePage, name_from_slug};
pub use post::PostService;
