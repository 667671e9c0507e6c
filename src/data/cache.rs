//! In-memory caches
//!
//! These caches are volatile and cleared on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};

const DEFAULT_MAX_PAGES: usize = 10_000;

#[derive(Debug)]
struct CachedPage<T> {
    page: Arc<T>,
    generated_at: Instant,
}

/// Generated page data keyed by request path
///
/// An entry is served until `revalidate` has elapsed since it was
/// generated; after that the caller regenerates and re-inserts it.
pub struct PageCache<T> {
    name: &'static str,
    pages: RwLock<HashMap<String, CachedPage<T>>>,
    revalidate: Duration,
    max_pages: usize,
}

impl<T> PageCache<T> {
    /// Create new page cache
    ///
    /// # Arguments
    /// * `name` - Label used in cache metrics
    /// * `revalidate` - How long a generated page stays fresh
    pub fn new(name: &'static str, revalidate: Duration) -> Self {
        Self {
            name,
            pages: RwLock::new(HashMap::new()),
            revalidate,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn revalidate(&self) -> Duration {
        self.revalidate
    }

    /// Get a page if it is still fresh
    pub async fn get_fresh(&self, path: &str) -> Option<Arc<T>> {
        let pages = self.pages.read().await;
        let result = pages
            .get(path)
            .filter(|entry| entry.generated_at.elapsed() < self.revalidate)
            .map(|entry| entry.page.clone());

        if result.is_some() {
            CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
        } else {
            CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
        }

        result
    }

    /// Store a freshly generated page
    pub async fn insert(&self, path: &str, page: T) -> Arc<T> {
        let page = Arc::new(page);
        let mut pages = self.pages.write().await;

        if !pages.contains_key(path) && pages.len() >= self.max_pages {
            let revalidate = self.revalidate;
            pages.retain(|_, entry| entry.generated_at.elapsed() < revalidate);
            if pages.len() >= self.max_pages {
                pages.clear();
            }
        }

        pages.insert(
            path.to_string(),
            CachedPage {
                page: page.clone(),
                generated_at: Instant::now(),
            },
        );

        page
    }

    /// Drop a cached page
    pub async fn invalidate(&self, path: &str) {
        self.pages.write().await.remove(path);
    }

    pub async fn len(&self) -> usize {
        self.pages.read().await.len()
    }
}
