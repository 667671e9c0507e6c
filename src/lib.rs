//! Chirp - A small emoji-only social feed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Procedure calls (/api/trpc/<procedure>)                  │
//! │  - Page data (/pages/...)                                   │
//! │  - Health and metrics                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Feed queries                                             │
//! │  - Post creation (validation + rate limiting)               │
//! │  - Page data regeneration                                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx)                                            │
//! │  - In-memory page cache                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers and procedure envelope
//! - `service`: Business logic layer
//! - `rate_limit`: Per-author post rate limiting
//! - `data`: Database and cache layer
//! - `auth`: Session verification
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod rate_limit;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Post creation rate limiter
    pub limiter: Arc<dyn rate_limit::RateLimiter>,

    /// Generated profile pages, keyed by path
    pub profile_pages: Arc<data::PageCache<service::ProfilePage>>,

    /// Generated single post pages, keyed by path
    pub post_pages: Arc<data::PageCache<service::PostPage>>,
}

impl AppState {
    /// Initialize application state with the in-process rate limiter
    ///
    /// # Errors
    /// Returns error if the database cannot be opened or migrated
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        let limiter = Arc::new(rate_limit::SlidingWindowLimiter::with_max_tracked_keys(
            config.rate_limit.max_requests,
            config.rate_limit.window(),
            config.rate_limit.max_tracked_keys,
        ));
        Self::with_limiter(config, limiter).await
    }

    /// Initialize application state around an existing rate limiter
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Initialize page caches
    pub async fn with_limiter(
        config: config::AppConfig,
        limiter: Arc<dyn rate_limit::RateLimiter>,
    ) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;

        let revalidate = std::time::Duration::from_secs(config.pages.revalidate_seconds);
        let profile_pages = data::PageCache::new("profile_pages", revalidate);
        let post_pages = data::PageCache::new("post_pages", revalidate);
        tracing::info!(
            revalidate_secs = revalidate.as_secs(),
            "Page caches initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            limiter,
            profile_pages: Arc::new(profile_pages),
            post_pages: Arc::new(post_pages),
        })
    }

    pub fn feed_service(&self) -> service::FeedService {
        service::FeedService::new(self.db.clone())
    }

    pub fn post_service(&self) -> service::PostService {
        service::PostService::new(self.db.clone(), self.limiter.clone())
    }

    pub fn page_service(&self) -> service::PageService {
        service::PageService::new(
            self.db.clone(),
            self.profile_pages.clone(),
            self.post_pages.clone(),
        )
    }
}

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower::ServiceBuilder;
    use tower_http::{
        compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
    };

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/api/trpc", api::rpc_router(state.clone()))
        .nest("/pages", api::pages_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer)
                .layer(CompressionLayer::new()),
        )
        // Outermost: oversized bodies are answered with 413 before any
        // other layer sees the request.
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if !server.protocol.eq_ignore_ascii_case("https") {
        return CorsLayer::permissive();
    }

    let allowed_origin = server.base_url();
    match HeaderValue::from_str(&allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin from server base URL; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
