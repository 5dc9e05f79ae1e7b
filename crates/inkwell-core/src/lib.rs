//! # Inkwell Core
//!
//! The domain layer of the Inkwell blogging backend: entities, ports, and the
//! feed, social-graph and mutation services built on top of them.
//! This crate has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod outcome;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use outcome::{Outcome, Redirect};
pub use pagination::{Page, PageRequest, paginate};
