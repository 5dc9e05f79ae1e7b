//! Storage: the in-memory store and, behind `postgres`, the SeaORM repositories.

mod memory;

#[cfg(feature = "postgres")]
mod connections;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use connections::{DatabaseConfig, DatabaseConnections};
#[cfg(feature = "postgres")]
pub use postgres_repo::postgres_repositories;

#[cfg(test)]
mod scenarios;

#[cfg(feature = "postgres")]
#[cfg(test)]
mod tests;
