//! # Inkwell Shared
//!
//! Wire types shared by the server and its clients: page payloads, form
//! bodies and error documents.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorDto};
