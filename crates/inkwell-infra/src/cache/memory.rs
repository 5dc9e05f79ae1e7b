//! In-memory cache implementation - used as fallback when Redis is unavailable.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use inkwell_core::ports::{Cache, CacheError};

/// Below this size a write never triggers a size-based sweep.
const SWEEP_MIN_ENTRIES: usize = 1024;
/// Longest time between two sweeps while writes keep coming.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

struct Entries {
    map: HashMap<String, CacheEntry>,
    sweep_at: usize,
    next_sweep: Instant,
}

impl Entries {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            sweep_at: SWEEP_MIN_ENTRIES,
            next_sweep: Instant::now() + SWEEP_INTERVAL,
        }
    }

    /// Drop expired entries once the map has doubled since the last sweep,
    /// or once the sweep interval has passed.
    fn sweep_if_due(&mut self, now: Instant) {
        if self.map.len() < self.sweep_at && now < self.next_sweep {
            return;
        }

        let before = self.map.len();
        self.map.retain(|_, entry| !entry.is_expired(now));
        self.sweep_at = (self.map.len() * 2).max(SWEEP_MIN_ENTRIES);
        self.next_sweep = now + SWEEP_INTERVAL;

        tracing::debug!(
            removed = before - self.map.len(),
            held = self.map.len(),
            "Swept expired cache entries"
        );
    }
}

/// In-memory cache using a simple HashMap with async RwLock.
///
/// Expiry reads the tokio clock, so a paused runtime controls TTLs in tests.
/// Expired keys are dropped when read, and by a sweep on write, so keys that
/// are never requested again do not pile up.
/// Note: Data is lost on process restart.
pub struct InMemoryCache {
    store: RwLock<Entries>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Entries::new()),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.read().await;
        let entry = store.map.get(key)?;

        if entry.is_expired(Instant::now()) {
            drop(store);
            let mut store = self.store.write().await;
            // Re-check: a writer may have refreshed the key in between.
            if store
                .map
                .get(key)
                .is_some_and(|e| e.is_expired(Instant::now()))
            {
                store.map.remove(key);
            }
            return None;
        }

        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self.store.write().await;
        let now = Instant::now();
        store.sweep_if_due(now);

        store.map.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );

        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.store.write().await.map.clear();
        Ok(())
    }
}
