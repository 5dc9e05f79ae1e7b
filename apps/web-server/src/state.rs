//! Application state - shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use inkwell_core::ports::{Cache, Repositories, TokenService};
use inkwell_core::services::{
    AccountCommands, FeedCache, FeedQueries, GroupCommands, PostCommands, SocialGraph,
};
use inkwell_infra::{InMemoryCache, JwtTokenService, MemoryStore};

use crate::config::{AppConfig, SessionConfig};

/// Shared application state. Every field is a cheap `Arc`-backed handle.
#[derive(Clone)]
pub struct AppState {
    pub feed: FeedQueries,
    pub social: SocialGraph,
    pub posts: PostCommands,
    pub groups: GroupCommands,
    pub accounts: AccountCommands,
    pub feed_cache: FeedCache,
    pub tokens: Arc<dyn TokenService>,
    pub session: SessionConfig,
}

impl AppState {
    /// Wire the services over already-built adapters.
    pub fn new(
        repos: Repositories,
        cache: Arc<dyn Cache>,
        tokens: Arc<dyn TokenService>,
        feed_ttl: Duration,
        session: SessionConfig,
    ) -> Self {
        Self {
            feed: FeedQueries::new(repos.clone()),
            social: SocialGraph::new(repos.clone()),
            posts: PostCommands::new(repos.clone()),
            groups: GroupCommands::new(repos.clone()),
            accounts: AccountCommands::new(repos),
            feed_cache: FeedCache::new(cache, feed_ttl),
            tokens,
            session,
        }
    }

    /// Build the application state with the adapters the configuration asks for.
    pub async fn from_config(config: &AppConfig) -> std::io::Result<Self> {
        let repos = repositories(config).await;
        let cache = cache(config).await?;
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));

        tracing::info!(
            feed_ttl_secs = config.feed_cache_ttl.as_secs(),
            "Application state initialized"
        );

        Ok(Self::new(
            repos,
            cache,
            tokens,
            config.feed_cache_ttl,
            config.session.clone(),
        ))
    }
}

fn memory_repositories() -> Repositories {
    Arc::new(MemoryStore::new()).repositories()
}

#[cfg(feature = "postgres")]
async fn repositories(config: &AppConfig) -> Repositories {
    use inkwell_infra::{DatabaseConnections, postgres_repositories};

    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return memory_repositories();
    };

    match DatabaseConnections::init(db_config).await {
        Ok(connections) => postgres_repositories(connections.main),
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            memory_repositories()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn repositories(_config: &AppConfig) -> Repositories {
    tracing::info!("Running without postgres feature - using in-memory repositories");
    memory_repositories()
}

#[cfg(feature = "redis")]
async fn cache(config: &AppConfig) -> std::io::Result<Arc<dyn Cache>> {
    use inkwell_infra::RedisCache;

    let Some(redis_config) = &config.redis else {
        tracing::info!("REDIS_URL not set. Feed cache is in-process.");
        return Ok(Arc::new(InMemoryCache::new()));
    };

    match RedisCache::new(redis_config.clone()).await {
        Ok(cache) => Ok(Arc::new(cache)),
        Err(e) if redis_config.fallback_to_memory => {
            tracing::warn!(error = %e, "Redis unavailable. Falling back to in-memory cache.");
            Ok(Arc::new(InMemoryCache::new()))
        }
        Err(e) => {
            tracing::error!(error = %e, "Redis unavailable and fallback disabled");
            Err(std::io::Error::other(e.to_string()))
        }
    }
}

#[cfg(not(feature = "redis"))]
async fn cache(_config: &AppConfig) -> std::io::Result<Arc<dyn Cache>> {
    Ok(Arc::new(InMemoryCache::new()))
}
