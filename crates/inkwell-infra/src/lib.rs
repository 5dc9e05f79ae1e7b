//! # Inkwell Infrastructure
//!
//! Concrete implementations of the ports defined in `inkwell-core`.
//! This crate contains the stores, caches and session token handling.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT session tokens
//! - `redis` - Redis-backed feed cache

pub mod cache;
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use database::MemoryStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections, postgres_repositories};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};
