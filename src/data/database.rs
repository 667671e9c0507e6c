//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with embedded migrations.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use super::models::*;
use crate::error::AppError;
use crate::metrics::observe_db_query;

const POST_WITH_AUTHOR_COLUMNS: &str = r#"
    p.id, p.content, p.author_id, p.created_at,
    u.name AS author_name, u.image AS author_image
"#;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!(path = %path.display(), "Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // User
    // =========================================================================

    /// Create or update a user
    ///
    /// Called by the identity provider integration when a user signs in.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let started = Instant::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, image, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                image = excluded.image
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        observe_db_query("UPSERT", "users", started.elapsed());

        Ok(())
    }

    /// Get full user row by ID
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let started = Instant::now();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        observe_db_query("SELECT", "users", started.elapsed());

        Ok(user)
    }

    /// Get author projection by user ID
    pub async fn get_author_by_id(&self, id: &str) -> Result<Option<Author>, AppError> {
        let started = Instant::now();
        let author = sqlx::query_as::<_, Author>("SELECT id, name, image FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        observe_db_query("SELECT", "users", started.elapsed());

        Ok(author)
    }

    /// Get author projection by exact user name
    pub async fn get_author_by_name(&self, name: &str) -> Result<Option<Author>, AppError> {
        let started = Instant::now();
        let author =
            sqlx::query_as::<_, Author>("SELECT id, name, image FROM users WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        observe_db_query("SELECT", "users", started.elapsed());

        Ok(author)
    }

    // =========================================================================
    // Post
    // =========================================================================

    /// Insert a new post
    ///
    /// Fails with a foreign key violation when the author does not exist.
    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        let started = Instant::now();
        sqlx::query(
            r#"
            INSERT INTO posts (id, content, author_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&post.id)
        .bind(&post.content)
        .bind(&post.author_id)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;
        observe_db_query("INSERT", "posts", started.elapsed());

        Ok(())
    }

    /// Get a post joined with its author
    pub async fn get_post_with_author(&self, id: &str) -> Result<Option<PostWithAuthor>, AppError> {
        let started = Instant::now();
        let query = format!(
            r#"
            SELECT {POST_WITH_AUTHOR_COLUMNS}
            FROM posts p
            INNER JOIN users u ON u.id = p.author_id
            WHERE p.id = ?
            "#
        );
        let row = sqlx::query_as::<_, PostWithAuthorRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        observe_db_query("SELECT", "posts", started.elapsed());

        Ok(row.map(PostWithAuthor::from))
    }

    /// Get the newest posts of all authors
    ///
    /// # Arguments
    /// * `limit` - Maximum number of results
    pub async fn get_recent_posts(&self, limit: usize) -> Result<Vec<PostWithAuthor>, AppError> {
        let started = Instant::now();
        let query = format!(
            r#"
            SELECT {POST_WITH_AUTHOR_COLUMNS}
            FROM posts p
            INNER JOIN users u ON u.id = p.author_id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        );
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        observe_db_query("SELECT", "posts", started.elapsed());

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    /// Get the newest posts of a single author
    ///
    /// # Arguments
    /// * `author_id` - Author user ID
    /// * `limit` - Maximum number of results
    pub async fn get_posts_by_author(
        &self,
        author_id: &str,
        limit: usize,
    ) -> Result<Vec<PostWithAuthor>, AppError> {
        let started = Instant::now();
        let query = format!(
            r#"
            SELECT {POST_WITH_AUTHOR_COLUMNS}
            FROM posts p
            INNER JOIN users u ON u.id = p.author_id
            WHERE p.author_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        );
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(&query)
            .bind(author_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        observe_db_query("SELECT", "posts", started.elapsed());

        Ok(rows.into_iter().map(PostWithAuthor::from).collect())
    }

    /// Count posts written by an author
    pub async fn count_posts_by_author(&self, author_id: &str) -> Result<i64, AppError> {
        let started = Instant::now();
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        observe_db_query("COUNT", "posts", started.elapsed());

        Ok(count)
    }
}
