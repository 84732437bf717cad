//! Lenaclav Authentication
//!
//! This crate provides bearer-credential verification and the request
//! session gate for the lenaclav API: self-signed tokens for local use,
//! issuer-signed JWTs checked against a cached remote key set, and the
//! roles-version staleness check.

pub mod error;
pub mod jwks;
pub mod middleware;
pub mod provider;
pub mod verifier;

pub use error::AuthError;
pub use jwks::KeySetCache;
pub use middleware::{Principal, SessionGate, session_middleware};
pub use provider::{
    DirectoryPage, DirectoryUser, IdentityProvider, LocalProvider, TokenGrant, is_mock_user,
};
pub use verifier::{Claims, TokenVerifier};
