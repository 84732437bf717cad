//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Invalid token payload")]
    InvalidPayload,

    #[error("Public key not found")]
    KeyNotFound,

    #[error("Signature verification failed: {0}")]
    SignatureInvalid(jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Issuer mismatch")]
    IssuerMismatch,

    #[error("Session expired")]
    SessionExpired,

    #[error("Failed to fetch key set: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error("User lookup failed: {0}")]
    Store(#[from] lenaclav_db::DbError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Verification failures are terminal for the request and all map to
        // 401; the body message is the only distinction between kinds.
        let status = match &self {
            AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };

        let body = axum::Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
