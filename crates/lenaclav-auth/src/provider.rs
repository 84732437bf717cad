//! Identity-provider seam
//!
//! Account management (registration, credential checks, token issuance)
//! belongs to a hosted identity pool, which is an external collaborator.
//! This module defines the seam the API talks to, plus [`LocalProvider`],
//! which mirrors the hosted pool's test-environment behavior: self-signed
//! base64 tokens and no-op account operations.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::debug;

use crate::error::AuthError;

/// Tokens returned from a login or refresh
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub token: String,
    pub refresh_token: String,
    /// Expiry as a millisecond Unix timestamp
    pub expires_at: i64,
}

/// One directory entry from the identity pool
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub user: String,
    pub username: String,
    pub email: String,
    pub status: Option<String>,
}

/// Paged directory listing
#[derive(Debug, Clone, Default)]
pub struct DirectoryPage {
    pub users: Vec<DirectoryUser>,
    pub cursor: Option<String>,
}

/// Operations delegated to the identity pool
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn register(
        &self,
        email: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<(), AuthError>;

    /// Confirm a signup, with a code or as an administrator
    async fn confirm(&self, username: &str, code: Option<&str>) -> Result<(), AuthError>;

    async fn login(&self, username: &str, password: &str) -> Result<TokenGrant, AuthError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, AuthError>;

    async fn forgot_password(&self, username: &str) -> Result<(), AuthError>;

    async fn reset_password(
        &self,
        username: &str,
        code: &str,
        password: &str,
    ) -> Result<(), AuthError>;

    /// Delete the account behind an access token (self-service)
    async fn delete_self(&self, access_token: &str) -> Result<(), AuthError>;

    /// Delete an account by username (admin)
    async fn admin_delete_user(&self, username: &str) -> Result<(), AuthError>;

    /// List pool accounts, at most `limit`, resuming from `cursor`
    async fn list_users(&self, limit: i64, cursor: Option<&str>)
    -> Result<DirectoryPage, AuthError>;
}

/// A mock identity is any username that is neither an email address nor a
/// phone number; mock identities never reach a hosted pool.
pub fn is_mock_user(username: &str) -> bool {
    if username.is_empty() {
        return true;
    }
    if username.contains('@') {
        return false;
    }
    let digits = username.strip_prefix('+').unwrap_or(username);
    let is_phone = digits.len() >= 7 && digits.chars().all(|c| c.is_ascii_digit());
    !is_phone
}

/// Token lifetime granted by the local provider
const LOCAL_TOKEN_TTL_SECONDS: i64 = 3600;

/// Local identity provider
///
/// Stands in for the hosted pool in development and tests. Logins accept
/// any password and yield a self-signed token that the verifier decodes
/// on its self-signed path; account operations are accepted as no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    /// Encode a self-signed token: base64 over a JSON claims object
    pub fn self_signed_token(username: &str) -> String {
        let payload = json!({ "username": username, "sub": username });
        BASE64.encode(payload.to_string())
    }

    fn grant(username: &str) -> TokenGrant {
        TokenGrant {
            token: Self::self_signed_token(username),
            refresh_token: "test-refresh".to_string(),
            expires_at: (Utc::now() + Duration::seconds(LOCAL_TOKEN_TTL_SECONDS))
                .timestamp_millis(),
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalProvider {
    async fn register(
        &self,
        email: &str,
        _phone: Option<&str>,
        _password: &str,
    ) -> Result<(), AuthError> {
        debug!("local register for {}", email);
        Ok(())
    }

    async fn confirm(&self, username: &str, _code: Option<&str>) -> Result<(), AuthError> {
        debug!("local confirm for {}", username);
        Ok(())
    }

    async fn login(&self, username: &str, _password: &str) -> Result<TokenGrant, AuthError> {
        if !is_mock_user(username) {
            debug!("real identity {} served by the local provider", username);
        }
        Ok(Self::grant(username))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<TokenGrant, AuthError> {
        Ok(Self::grant("test-user"))
    }

    async fn forgot_password(&self, _username: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn reset_password(
        &self,
        _username: &str,
        _code: &str,
        _password: &str,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    async fn delete_self(&self, _access_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn admin_delete_user(&self, _username: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn list_users(
        &self,
        _limit: i64,
        _cursor: Option<&str>,
    ) -> Result<DirectoryPage, AuthError> {
        // No hosted pool to enumerate
        Ok(DirectoryPage::default())
    }
}
