//! Bearer-credential verification
//!
//! Two credential shapes are accepted:
//!
//! - self-signed tokens: base64 over a JSON claims object, used in local
//!   mode and by the test environment
//! - issuer-signed JWTs: verified against the issuer's published key set
//!
//! The bypass flag and the issuer are fixed at construction; nothing is
//! read from ambient process state at request time.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::AuthError;
use crate::jwks::KeySetCache;

/// Verified token claims, kept as the raw JSON object so issuer-specific
/// fields pass through to the principal untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(pub serde_json::Map<String, serde_json::Value>);

impl Claims {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    fn str_claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        self.str_claim("username")
    }

    pub fn sub(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    /// The roles-version marker, if present and parseable.
    ///
    /// Issuers deliver custom attributes as strings, so both numbers and
    /// numeric strings are accepted; anything else reads as absent.
    pub fn roles_version(&self) -> Option<i64> {
        match self.0.get("roles_version")? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Bearer-credential verifier
///
/// With `bypass` set, or when no issuer is configured, every credential is
/// treated as self-signed. Otherwise credentials containing a `.` are
/// verified as issuer-signed JWTs.
pub struct TokenVerifier {
    bypass: bool,
    issuer: Option<String>,
    keys: Option<Arc<KeySetCache>>,
}

impl TokenVerifier {
    /// Verifier with no issuer: self-signed credentials only
    pub fn new(bypass: bool) -> Self {
        Self {
            bypass,
            issuer: None,
            keys: None,
        }
    }

    /// Verifier backed by an issuer and its key-set cache
    pub fn with_issuer(bypass: bool, issuer: impl Into<String>, keys: Arc<KeySetCache>) -> Self {
        Self {
            bypass,
            issuer: Some(issuer.into()),
            keys: Some(keys),
        }
    }

    /// Verify a bearer credential and return its claims
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        match (&self.issuer, &self.keys) {
            (Some(issuer), Some(keys)) if !self.bypass && token.contains('.') => {
                self.verify_signed(token, issuer, keys).await
            }
            _ => Self::decode_self_signed(token),
        }
    }

    /// Decode a self-signed credential: base64 over a JSON claims object
    fn decode_self_signed(token: &str) -> Result<Claims, AuthError> {
        let bytes = BASE64
            .decode(token.trim())
            .map_err(|_| AuthError::InvalidCredential)?;
        serde_json::from_slice(&bytes).map_err(|_| AuthError::InvalidCredential)
    }

    /// Verify an issuer-signed JWT against the cached key set
    async fn verify_signed(
        &self,
        token: &str,
        issuer: &str,
        keys: &KeySetCache,
    ) -> Result<Claims, AuthError> {
        // An unreadable header cannot name a key, so it reports the same
        // way as an unknown key id.
        let header = decode_header(token).map_err(|_| AuthError::KeyNotFound)?;
        let kid = header.kid.ok_or(AuthError::KeyNotFound)?;

        let key_set = keys.get().await?;
        let jwk = key_set.find(&kid).ok_or(AuthError::KeyNotFound)?;
        let decoding_key = DecodingKey::from_jwk(jwk).map_err(AuthError::SignatureInvalid)?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[issuer]);

        let data = decode::<Claims>(token, &decoding_key, &validation).map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::SignatureInvalid(err),
    }
}
