//! Chirp binary entry point

use std::sync::Arc;

use chirp::{AppState, config, rate_limit::SlidingWindowLimiter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application entry point
///
/// # Setup
/// 1. Load configuration from file and environment
/// 2. Initialize tracing/logging
/// 3. Initialize metrics
/// 4. Initialize AppState
/// 5. Build Axum router
/// 6. Start background tasks (rate limit pruning)
/// 7. Start HTTP server
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration
    let config = config::AppConfig::load()?;

    // 2. Initialize tracing/logging
    init_tracing(&config.logging);
    tracing::info!(
        domain = %config.server.domain,
        protocol = %config.server.protocol,
        max_posts = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_seconds,
        "Starting Chirp..."
    );

    if !config.requires_https() {
        tracing::warn!(
            domain = %config.server.domain,
            protocol = %config.server.protocol,
            "Serving over plain http for local development"
        );
    }

    // 3. Initialize metrics
    chirp::metrics::init_metrics();

    // 4. Initialize application state
    let limiter = Arc::new(SlidingWindowLimiter::with_max_tracked_keys(
        config.rate_limit.max_requests,
        config.rate_limit.window(),
        config.rate_limit.max_tracked_keys,
    ));
    let state = AppState::with_limiter(config.clone(), limiter.clone()).await?;

    // 5. Build Axum router
    let app = chirp::build_router(state);

    // 6. Start background tasks
    spawn_rate_limit_pruning_task(limiter, config.rate_limit.window());

    // 7. Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Public URL: {}", config.server.base_url());

    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.default_filter().into());

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Spawn background task dropping authors whose hits left the window
fn spawn_rate_limit_pruning_task(limiter: Arc<SlidingWindowLimiter>, window: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(window.max(std::time::Duration::from_secs(1)));

        // Consume the immediate first tick; nothing can have expired yet.
        interval.tick().await;

        loop {
            interval.tick().await;
            limiter.prune_expired().await;

            let stats = limiter.stats().await;
            tracing::debug!(
                tracked = stats.total_entries,
                active = stats.active_entries,
                "Rate limiter pruned"
            );
        }
    });

    tracing::info!("Rate limit pruning task spawned");
}
