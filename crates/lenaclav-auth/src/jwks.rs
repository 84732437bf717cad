//! Remote key-set cache
//!
//! Signing keys are published by the issuer at
//! `<issuer>/.well-known/jwks.json`. The cache fetches lazily, serves the
//! cached set until the TTL elapses, and can be invalidated by its owner.
//! A fetch failure is not retried and not cached: the error surfaces to
//! the caller and the next request fetches again.

use jsonwebtoken::jwk::JwkSet;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::AuthError;

/// Cached issuer key set with time-based expiry
pub struct KeySetCache {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    cached: RwLock<Option<CachedKeys>>,
}

struct CachedKeys {
    fetched_at: Instant,
    keys: JwkSet,
}

impl KeySetCache {
    /// Create a cache for the issuer's well-known JWKS document
    pub fn from_issuer(issuer: &str, ttl: Duration) -> Result<Self, AuthError> {
        let url = format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'));
        Self::new(url, ttl)
    }

    /// Create a cache for an explicit key-set URL
    pub fn new(url: impl Into<String>, ttl: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            url: url.into(),
            ttl,
            cached: RwLock::new(None),
        })
    }

    /// The key-set URL this cache fetches from
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current key set, fetching it when missing or expired
    pub async fn get(&self) -> Result<JwkSet, AuthError> {
        {
            let guard = self.cached.read().await;
            if let Some(cached) = guard.as_ref()
                && cached.fetched_at.elapsed() < self.ttl
            {
                return Ok(cached.keys.clone());
            }
        }

        let keys = self.fetch().await?;
        *self.cached.write().await = Some(CachedKeys {
            fetched_at: Instant::now(),
            keys: keys.clone(),
        });
        Ok(keys)
    }

    /// Drop the cached key set; the next `get` fetches again
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    /// Seed the cache without a fetch
    pub async fn prime(&self, keys: JwkSet) {
        *self.cached.write().await = Some(CachedKeys {
            fetched_at: Instant::now(),
            keys,
        });
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        debug!("Fetching key set from {}", self.url);
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.json::<JwkSet>().await?)
    }
}
