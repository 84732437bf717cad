//! Health check and welcome endpoints

use axum::{Json, Router, routing::get};
use serde::Serialize;
use serde_json::{Value, json};

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Root welcome handler
async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the lenaclav.com API",
    }))
}

/// Health check handler
async fn health() -> Json<HealthResponse> {
    // Record health check metric
    metrics::counter!("lenaclav_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
}
