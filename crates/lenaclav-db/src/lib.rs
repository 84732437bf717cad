//! Lenaclav Database Layer
//!
//! This crate provides the database abstraction layer for the lenaclav
//! content API, using SQLite via sqlx for persistence.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
