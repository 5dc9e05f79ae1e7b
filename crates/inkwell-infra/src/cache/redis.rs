//! Redis cache implementation with connection pooling.
//!
//! Every key is stored under `<namespace>:`, which lets `clear` drop this
//! service's entries without touching the rest of the Redis database.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use inkwell_core::ports::{Cache, CacheError};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whether to fallback to in-memory cache if Redis is unavailable
    pub fallback_to_memory: bool,
    /// Key prefix owned by this service.
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            fallback_to_memory: true,
            namespace: "inkwell".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or(defaults.url),
            connect_timeout: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            fallback_to_memory: std::env::var("REDIS_FALLBACK_TO_MEMORY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.fallback_to_memory),
            namespace: std::env::var("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
        }
    }
}

/// Redis-backed cache implementation.
///
/// Uses connection manager for automatic reconnection and pooling.
pub struct RedisCache {
    conn: ConnectionManager,
    namespace: String,
}

impl RedisCache {
    pub async fn new(config: RedisConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| CacheError::Connection("Connection timed out".to_string()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, namespace = %config.namespace, "Connected to Redis cache");

        Ok(Self {
            conn,
            namespace: config.namespace,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        // SET with EX is a single command, so readers never see a torn value.
        match ttl {
            Some(duration) => {
                conn.set_ex::<_, _, ()>(key, value, duration.as_secs().max(1))
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
            }
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}:*", self.namespace);

        let keys: Vec<String> = {
            let mut iter = conn
                .scan_match::<_, String>(&pattern)
                .await
                .map_err(|e| CacheError::Operation(e.to_string()))?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if !keys.is_empty() {
            let mut conn = self.conn.clone();
            conn.del::<_, ()>(&keys)
                .await
                .map_err(|e| CacheError::Operation(e.to_string()))?;
        }

        tracing::debug!(namespace = %self.namespace, removed = keys.len(), "Redis cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn get_test_cache(namespace: &str) -> Option<RedisCache> {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6389".to_string()),
            connect_timeout: Duration::from_secs(1),
            fallback_to_memory: false,
            namespace: namespace.to_string(),
        };

        RedisCache::new(config).await.ok()
    }

    #[tokio::test]
    async fn test_redis_cache_set_get() {
        let cache = match get_test_cache("inkwell-test-get").await {
            Some(c) => c,
            None => {
                tracing::warn!("Redis not available, skipping test");
                return;
            }
        };

        let key = "test_key";
        let value = "test_value";

        cache.set(key, value, None).await.unwrap();
        assert_eq!(cache.get(key).await, Some(value.to_string()));

        cache.clear().await.unwrap();
        assert_eq!(cache.get(key).await, None);
    }

    #[tokio::test]
    async fn test_redis_cache_clear_is_namespaced() {
        let (Some(ours), Some(theirs)) = (
            get_test_cache("inkwell-test-ours").await,
            get_test_cache("inkwell-test-theirs").await,
        ) else {
            return;
        };

        ours.set("feed:index:?", "ours", None).await.unwrap();
        theirs.set("feed:index:?", "theirs", None).await.unwrap();

        ours.clear().await.unwrap();

        assert_eq!(ours.get("feed:index:?").await, None);
        assert_eq!(theirs.get("feed:index:?").await.as_deref(), Some("theirs"));
        theirs.clear().await.unwrap();
    }
}
