// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use crate::auth::{AuthError, JwksManager};
use crate::config::Config;
use crate::storage::WalletAccountStore;

/// How bearer tokens are verified.
///
/// JWKS takes precedence over the shared secret when both are set. With
/// neither, only builds with the `dev` feature accept tokens at all.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Key set for asymmetrically signed tokens
    pub jwks: Option<JwksManager>,
    /// HS256 secret for tokens minted by the login service
    pub shared_secret: Option<DecodingKey>,
    /// Expected `iss` claim
    pub issuer: Option<String>,
    /// Expected `aud` claim
    pub audience: Option<String>,
}

impl AuthConfig {
    pub fn with_shared_secret(secret: &[u8]) -> Self {
        Self {
            shared_secret: Some(DecodingKey::from_secret(secret)),
            ..Self::default()
        }
    }

    pub fn with_jwks(jwks: JwksManager) -> Self {
        Self {
            jwks: Some(jwks),
            ..Self::default()
        }
    }

    /// Build the verifier set described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        let jwks = config
            .jwks_url
            .as_ref()
            .map(|url| JwksManager::new(url.as_str()))
            .transpose()?;

        Ok(Self {
            jwks,
            shared_secret: config
                .api_secret
                .as_deref()
                .map(|secret| DecodingKey::from_secret(secret.as_bytes())),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    pub fn issuer(mut self, issuer: Option<String>) -> Self {
        self.issuer = issuer;
        self
    }

    pub fn audience(mut self, audience: Option<String>) -> Self {
        self.audience = audience;
        self
    }
}

/// Shared handler state. Cloned per request; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WalletAccountStore>,
    pub auth_config: AuthConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn WalletAccountStore>) -> Self {
        Self {
            store,
            auth_config: AuthConfig::default(),
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }
}
