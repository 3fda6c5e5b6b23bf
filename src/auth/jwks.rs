// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Used when bearer tokens are signed by an external identity provider with
//! asymmetric keys. Keys are fetched over HTTPS and cached for
//! [`DEFAULT_CACHE_TTL`]; an unknown `kid` forces one refresh so key
//! rotation is picked up without waiting for expiry. Those forced refreshes
//! are limited to one per [`MIN_REFRESH_INTERVAL`], so tokens with made-up
//! key ids cannot drive traffic to the identity provider.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Minimum age of the cached set before an unknown `kid` may refresh it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a manager for the given JWKS endpoint.
    pub fn new(jwks_url: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::InternalError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client,
        })
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Resolve the key for a token header.
    ///
    /// With a `kid`, the matching key is required. Without one, the first
    /// usable key in the set is taken.
    pub async fn decoding_key(&self, kid: Option<&str>) -> Result<(DecodingKey, Algorithm), AuthError> {
        let jwks = self.cached_or_fetch().await?;
        match kid {
            Some(kid) => match find_key(&jwks, kid) {
                Some(found) => found,
                None => {
                    if self.fetched_within(MIN_REFRESH_INTERVAL).await {
                        tracing::debug!(kid, "Unknown JWKS key id, key set is fresh");
                        return Err(AuthError::NoMatchingKey);
                    }
                    tracing::info!(kid, "Unknown JWKS key id, refreshing key set");
                    let jwks = self.refresh().await?;
                    find_key(&jwks, kid).unwrap_or(Err(AuthError::NoMatchingKey))
                }
            },
            None => jwks
                .keys
                .iter()
                .find_map(|jwk| jwk_to_decoding_key(jwk).ok())
                .ok_or(AuthError::NoMatchingKey),
        }
    }

    /// Fetch the key set and replace the cache.
    pub async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let jwks = self.fetch().await?;
        *self.cache.write().await = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Whether a fresh key set is cached.
    pub async fn is_cached(&self) -> bool {
        self.cache
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
    }

    async fn fetched_within(&self, window: Duration) -> bool {
        self.cache
            .read()
            .await
            .as_ref()
            .is_some_and(|entry| entry.fetched_at.elapsed() < window)
    }

    /// Install a key set as if it had just been fetched.
    #[cfg(test)]
    pub(crate) async fn install(&self, jwks: JwkSet) {
        *self.cache.write().await = Some(CacheEntry {
            jwks,
            fetched_at: Instant::now(),
        });
    }

    async fn cached_or_fetch(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.as_ref() {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }
        self.refresh().await
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::JwksFetchError(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))
    }
}

fn find_key(jwks: &JwkSet, kid: &str) -> Option<Result<(DecodingKey, Algorithm), AuthError>> {
    jwks.find(kid).map(jwk_to_decoding_key)
}

/// Convert a JWK to a decoding key and the algorithm it verifies.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    let algorithm = match (&jwk.algorithm, jwk.common.key_algorithm) {
        (_, Some(KeyAlgorithm::RS256)) => Algorithm::RS256,
        (_, Some(KeyAlgorithm::RS384)) => Algorithm::RS384,
        (_, Some(KeyAlgorithm::RS512)) => Algorithm::RS512,
        (_, Some(KeyAlgorithm::PS256)) => Algorithm::PS256,
        (_, Some(KeyAlgorithm::PS384)) => Algorithm::PS384,
        (_, Some(KeyAlgorithm::PS512)) => Algorithm::PS512,
        (_, Some(KeyAlgorithm::ES256)) => Algorithm::ES256,
        (_, Some(KeyAlgorithm::ES384)) => Algorithm::ES384,
        (_, Some(KeyAlgorithm::EdDSA)) => Algorithm::EdDSA,
        (AlgorithmParameters::RSA(_), _) => Algorithm::RS256,
        (AlgorithmParameters::EllipticCurve(_), _) => Algorithm::ES256,
        (AlgorithmParameters::OctetKeyPair(_), _) => Algorithm::EdDSA,
        _ => {
            return Err(AuthError::InternalError(
                "Unsupported key type in JWKS".to_string(),
            ))
        }
    };

    let key = DecodingKey::from_jwk(jwk)
        .map_err(|e| AuthError::InternalError(format!("Invalid JWKS key: {e}")))?;

    Ok((key, algorithm))
}
