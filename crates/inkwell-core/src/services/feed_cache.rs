//! Cached renderings of the home feed.
//!
//! Entries are keyed by the request's query string and live until their TTL
//! runs out or the cache is cleared. Creating a post does not evict anything,
//! so a cached page may lag behind the store for up to one TTL.

use std::sync::Arc;
use std::time::Duration;

use crate::ports::{Cache, CacheError};

/// Default lifetime of a cached home page.
pub const DEFAULT_FEED_TTL: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct FeedCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Cache key for the home page requested with `query_string`.
    pub fn key(query_string: &str) -> String {
        format!("feed:index:?{query_string}")
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.cache.get(key).await;
        tracing::debug!(key = %key, hit = hit.is_some(), "Feed cache lookup");
        hit
    }

    pub async fn set(&self, key: &str, rendering: &str) -> Result<(), CacheError> {
        self.cache.set(key, rendering, Some(self.ttl)).await
    }

    /// Forget every cached rendering; the next request recomputes.
    pub async fn clear(&self) -> Result<(), CacheError> {
        tracing::info!("Clearing feed cache");
        self.cache.clear().await
    }
}
