//! Common test utilities for E2E tests

#![allow(dead_code)]

use std::sync::Arc;

use chirp::data::{EntityId, Post, User};
use chirp::rate_limit::RateLimiter;
use chirp::{AppState, config};
use chrono::Utc;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SESSION_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Test configuration rooted in `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            domain: "test.example.com".to_string(),
            protocol: "https".to_string(),
        },
        database: config::DatabaseConfig {
            path: temp_dir.path().join("test.db"),
        },
        auth: config::AuthConfig {
            session_secret: TEST_SESSION_SECRET.to_string(),
            session_max_age: 604800,
        },
        rate_limit: config::RateLimitConfig {
            max_requests: 3,
            window_seconds: 60,
            max_tracked_keys: 1000,
        },
        pages: config::PagesConfig {
            revalidate_seconds: 1,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(test_config(&temp_dir)).await.unwrap();
        Self::spawn(state, temp_dir).await
    }

    /// Create a test server around a custom rate limiter
    pub async fn with_limiter(limiter: Arc<dyn RateLimiter>) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::with_limiter(test_config(&temp_dir), limiter)
            .await
            .unwrap();
        Self::spawn(state, temp_dir).await
    }

    async fn spawn(state: AppState, temp_dir: TempDir) -> Self {
        chirp::metrics::init_metrics();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = chirp::build_router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: format!("http://{}", addr),
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// URL of a query procedure with its JSON input
    pub fn query_url(&self, procedure: &str, input: &serde_json::Value) -> String {
        let encoded: String =
            url::form_urlencoded::byte_serialize(input.to_string().as_bytes()).collect();
        self.url(&format!("/api/trpc/{procedure}?input={encoded}"))
    }

    /// Create a user in the database
    pub async fn create_test_user(&self, id: &str, name: Option<&str>) -> User {
        let user = User {
            id: id.to_string(),
            name: name.map(ToOwned::to_owned),
            image: Some(format!("https://cdn.example.com/{id}.png")),
            created_at: Utc::now(),
        };
        self.state.db.upsert_user(&user).await.unwrap();
        user
    }

    /// Insert a post directly, bypassing validation and rate limiting
    pub async fn create_test_post(&self, author_id: &str, content: &str) -> Post {
        let post = Post {
            id: EntityId::new().0,
            content: content.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now(),
        };
        self.state.db.insert_post(&post).await.unwrap();
        post
    }

    /// Create a signed session token for `user_id`
    pub fn create_test_token(&self, user_id: &str) -> String {
        use chirp::auth::{Session, create_session_token};

        let session = Session::new(user_id, self.state.config.auth.session_max_age);
        create_session_token(&session, &self.state.config.auth.session_secret)
            .expect("Failed to create test token")
    }

    /// POST `posts.create` as `token`
    pub async fn create_post(&self, token: &str, content: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/trpc/posts.create"))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .unwrap()
    }
}
