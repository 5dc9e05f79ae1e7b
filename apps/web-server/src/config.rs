//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use inkwell_core::services::DEFAULT_FEED_TTL;
use inkwell_infra::JwtConfig;

#[cfg(feature = "postgres")]
use inkwell_infra::DatabaseConfig;
#[cfg(feature = "redis")]
use inkwell_infra::RedisConfig;

/// Where the session token lives and where anonymous users are sent.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub login_url: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            login_url: "/auth/login/".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "redis")]
    pub redis: Option<RedisConfig>,
    pub feed_cache_ttl: Duration,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let session_defaults = SessionConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            #[cfg(feature = "postgres")]
            database: DatabaseConfig::from_env(),
            #[cfg(feature = "redis")]
            redis: env::var("REDIS_URL").ok().map(|_| RedisConfig::from_env()),
            feed_cache_ttl: env::var("FEED_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_FEED_TTL),
            jwt: JwtConfig::from_env(),
            session: SessionConfig {
                cookie_name: env::var("SESSION_COOKIE").unwrap_or(session_defaults.cookie_name),
                login_url: env::var("LOGIN_URL").unwrap_or(session_defaults.login_url),
            },
        }
    }
}
