//! Rate limiting for post creation
//!
//! The service talks to a [`RateLimiter`]; `SlidingWindowLimiter` is the
//! in-process implementation. A managed limiter can be plugged in by
//! implementing the trait.

use axum::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::AppError;

const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

/// Outcome of a single limiter check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Hit recorded; `remaining` more hits fit in the current window
    Allowed { remaining: u32 },
    /// Hit rejected; the oldest hit leaves the window after `retry_after`
    Limited { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-key limiter consulted before a rate-limited action
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Record a hit for `key` if the window allows it
    async fn limit(&self, key: &str) -> Result<RateLimitDecision, AppError>;
}

/// Hits of one key inside the trailing window
#[derive(Debug, Clone, Default)]
struct WindowLog {
    hits: VecDeque<Instant>,
}

impl WindowLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    fn last_hit(&self) -> Option<Instant> {
        self.hits.back().copied()
    }
}

/// Sliding window rate limiter
///
/// Admits at most `max_requests` hits per key in any trailing `window`.
/// Rejected hits are not recorded.
pub struct SlidingWindowLimiter {
    entries: Arc<RwLock<HashMap<String, WindowLog>>>,
    max_requests: u32,
    window: Duration,
    max_tracked_keys: usize,
}

impl SlidingWindowLimiter {
    /// Create new rate limiter
    ///
    /// # Arguments
    /// * `max_requests` - Maximum hits per window (posts: 3)
    /// * `window` - Window length (posts: 1 minute)
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_max_tracked_keys(max_requests, window, DEFAULT_MAX_TRACKED_KEYS)
    }

    /// Create new rate limiter with explicit in-memory key cap.
    pub fn with_max_tracked_keys(
        max_requests: u32,
        window: Duration,
        max_tracked_keys: usize,
    ) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_requests: max_requests.max(1),
            window,
            max_tracked_keys: max_tracked_keys.max(1),
        }
    }

    fn prune_expired_locked(
        entries: &mut HashMap<String, WindowLog>,
        now: Instant,
        window: Duration,
    ) -> usize {
        let before = entries.len();
        entries.retain(|_, log| {
            log.prune(now, window);
            !log.hits.is_empty()
        });
        before - entries.len()
    }

    fn evict_oldest_locked(entries: &mut HashMap<String, WindowLog>) -> bool {
        let Some(oldest_key) = entries
            .iter()
            .min_by_key(|(_, log)| log.last_hit())
            .map(|(key, _)| key.clone())
        else {
            return false;
        };
        entries.remove(&oldest_key);
        true
    }

    /// Number of hits for `key` inside the current window
    pub async fn count(&self, key: &str) -> u32 {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .map(|log| {
                log.hits
                    .iter()
                    .filter(|hit| now.duration_since(**hit) < self.window)
                    .count() as u32
            })
            .unwrap_or(0)
    }

    /// Reset rate limit for a key
    pub async fn reset(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Prune keys whose hits all left the window
    ///
    /// Should be called periodically to clean up expired entries.
    pub async fn prune_expired(&self) {
        let mut entries = self.entries.write().await;
        let removed = Self::prune_expired_locked(&mut entries, Instant::now(), self.window);

        if removed > 0 {
            tracing::debug!(removed, "Pruned expired rate limit entries");
        }
    }

    /// Get rate limiter statistics
    pub async fn stats(&self) -> RateLimitStats {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let active = entries
            .values()
            .filter(|log| {
                log.last_hit()
                    .is_some_and(|hit| now.duration_since(hit) < self.window)
            })
            .count();

        RateLimitStats {
            total_entries: entries.len(),
            active_entries: active,
            max_requests: self.max_requests,
            window_seconds: self.window.as_secs(),
            max_tracked_keys: self.max_tracked_keys,
        }
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn limit(&self, key: &str) -> Result<RateLimitDecision, AppError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if !entries.contains_key(key) && entries.len() >= self.max_tracked_keys {
            Self::prune_expired_locked(&mut entries, now, self.window);
            if entries.len() >= self.max_tracked_keys {
                let _ = Self::evict_oldest_locked(&mut entries);
            }
        }

        let log = entries.entry(key.to_string()).or_default();
        log.prune(now, self.window);

        let used = log.hits.len() as u32;
        if used >= self.max_requests {
            let retry_after = log
                .hits
                .front()
                .map(|oldest| self.window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(self.window);
            return Ok(RateLimitDecision::Limited { retry_after });
        }

        log.hits.push_back(now);
        Ok(RateLimitDecision::Allowed {
            remaining: self.max_requests - used - 1,
        })
    }
}

/// Rate limiter statistics
#[derive(Debug, Clone)]
pub struct RateLimitStats {
    /// Total number of tracked keys
    pub total_entries: usize,
    /// Keys with at least one hit inside the window
    pub active_entries: usize,
    /// Maximum hits per window
    pub max_requests: u32,
    /// Window duration in seconds
    pub window_seconds: u64,
    /// Maximum number of keys tracked in memory
    pub max_tracked_keys: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));

        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Allowed { remaining: 0 }
        );

        // 4th hit inside the window is rejected
        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(60)
            }
        );
        assert_eq!(limiter.count("author").await, 3);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.limit("author").await.unwrap().is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides_per_hit() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));

        limiter.limit("author").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        limiter.limit("author").await.unwrap();
        limiter.limit("author").await.unwrap();

        // Window still holds all three hits
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Limited {
                retry_after: Duration::from_secs(10)
            }
        );

        // First hit leaves the window; only one slot frees up
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(
            limiter.limit("author").await.unwrap(),
            RateLimitDecision::Allowed { remaining: 0 }
        );
        assert!(!limiter.limit("author").await.unwrap().is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_hits_do_not_extend_window() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.limit("author").await.unwrap().is_allowed());
        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(10)).await;
            assert!(!limiter.limit("author").await.unwrap().is_allowed());
        }

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(limiter.limit("author").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_different_keys() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(60));

        assert!(limiter.limit("author1").await.unwrap().is_allowed());
        assert!(limiter.limit("author1").await.unwrap().is_allowed());
        assert!(limiter.limit("author2").await.unwrap().is_allowed());
        assert!(limiter.limit("author2").await.unwrap().is_allowed());

        assert!(!limiter.limit("author1").await.unwrap().is_allowed());
        assert!(!limiter.limit("author2").await.unwrap().is_allowed());

        limiter.reset("author1").await;
        assert!(limiter.limit("author1").await.unwrap().is_allowed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_tracked_keys_evicts_oldest_entry() {
        let limiter = SlidingWindowLimiter::with_max_tracked_keys(10, Duration::from_secs(60), 2);

        limiter.limit("author1").await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        limiter.limit("author2").await.unwrap();
        tokio::time::advance(Duration::from_millis(1)).await;
        limiter.limit("author3").await.unwrap();

        let stats = limiter.stats().await;
        assert_eq!(stats.total_entries, 2);
        assert_eq!(limiter.count("author1").await, 0);
        assert_eq!(limiter.count("author2").await, 1);
        assert_eq!(limiter.count("author3").await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_expired() {
        let limiter = SlidingWindowLimiter::new(3, Duration::from_secs(60));
        limiter.limit("author1").await.unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.limit("author2").await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        limiter.prune_expired().await;
        let stats = limiter.stats().await;
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.active_entries, 1);
        assert_eq!(stats.window_seconds, 60);
    }
}
