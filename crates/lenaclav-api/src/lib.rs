//! Lenaclav REST API
//!
//! This crate provides the Axum-based HTTP API for the lenaclav content
//! service: CRUD routes for posts, blogs, events, and users, plus the
//! auth endpoints backed by the identity provider.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
