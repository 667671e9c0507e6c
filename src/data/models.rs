//! Data models
//!
//! Rust structs representing database entities and query projections.
//! Post IDs are ULIDs; timestamps are chrono UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user
///
/// Rows are written by the identity provider integration; the feed only
/// reads them.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    /// Unique handle, used in profile URLs (`/@name`)
    pub name: Option<String>,
    /// Avatar URL
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reduced projection embedded in post results
    pub fn author(&self) -> Author {
        Author {
            id: self.id.clone(),
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// Author projection: `{id, name, image}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

// =============================================================================
// Post
// =============================================================================

/// An emoji-only post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

/// A post joined with its author projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
}

/// Flat row returned by the posts/users join
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PostWithAuthorRow {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
}

impl From<PostWithAuthorRow> for PostWithAuthor {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            author: Author {
                id: row.author_id.clone(),
                name: row.author_name,
                image: row.author_image,
            },
            post: Post {
                id: row.id,
                content: row.content,
                author_id: row.author_id,
                created_at: row.created_at,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_with_author_serializes_flat_camel_case() {
        let created_at = Utc::now();
        let item = PostWithAuthor {
            post: Post {
                id: "01HPOST".to_string(),
                content: "🦀".to_string(),
                author_id: "user-1".to_string(),
                created_at,
            },
            author: Author {
                id: "user-1".to_string(),
                name: Some("ferris".to_string()),
                image: None,
            },
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "01HPOST");
        assert_eq!(json["authorId"], "user-1");
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["author"]["name"], "ferris");
        assert!(json["author"]["image"].is_null());
    }

    #[test]
    fn entity_ids_are_ulids() {
        let id = EntityId::new();
        assert_eq!(id.0.len(), 26);
        assert!(ulid::Ulid::from_string(&id.0).is_ok());
    }
}
