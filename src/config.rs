// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb database file | `./data/wallet_accounts.redb` |
//! | `STORE_BACKEND` | `redb` or `memory` | `redb` |
//! | `API_SECRET` | HS256 secret for bearer tokens | - |
//! | `JWT_JWKS_URL` | JWKS endpoint (https) | - |
//! | `JWT_ISSUER` | Expected JWT issuer claim | not checked |
//! | `JWT_AUDIENCE` | Expected JWT audience claim | not checked |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key | plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! At least one of `API_SECRET` and `JWT_JWKS_URL` must be set, unless the
//! crate is built with the `dev` feature.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Path of the redb file. The parent directory is created on open.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const DEFAULT_DATABASE_PATH: &str = "./data/wallet_accounts.redb";

/// Selects the wallet account store.
///
/// `memory` loses everything on restart and is meant for local runs.
pub const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

pub const API_SECRET_ENV: &str = "API_SECRET";
pub const JWKS_URL_ENV: &str = "JWT_JWKS_URL";
pub const ISSUER_ENV: &str = "JWT_ISSUER";
pub const AUDIENCE_ENV: &str = "JWT_AUDIENCE";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Logging format: `json` for structured output, anything else is pretty.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not valid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{TLS_CERT_PATH_ENV} and {TLS_KEY_PATH_ENV} must be set together")]
    PartialTls,

    #[error("no token verifier configured: set {API_SECRET_ENV} or {JWKS_URL_ENV}")]
    NoVerifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redb,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store_backend: StoreBackend,
    pub database_path: PathBuf,
    pub api_secret: Option<String>,
    pub jwks_url: Option<Url>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub tls: Option<TlsPaths>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host: IpAddr = var(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e| invalid(HOST_ENV, e))?;

        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };

        let store_backend = match var(STORE_BACKEND_ENV).as_deref() {
            None | Some("redb") => StoreBackend::Redb,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(invalid(
                    STORE_BACKEND_ENV,
                    format!("unknown backend '{other}' (expected 'redb' or 'memory')"),
                ))
            }
        };

        let database_path =
            PathBuf::from(var(DATABASE_PATH_ENV).unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()));

        let jwks_url = var(JWKS_URL_ENV).map(|raw| parse_jwks_url(&raw)).transpose()?;
        let api_secret = var(API_SECRET_ENV);

        if jwks_url.is_none() && api_secret.is_none() && !cfg!(feature = "dev") {
            return Err(ConfigError::NoVerifier);
        }

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialTls),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            store_backend,
            database_path,
            api_secret,
            jwks_url,
            issuer: var(ISSUER_ENV),
            audience: var(AUDIENCE_ENV),
            tls,
        })
    }
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn parse_jwks_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| invalid(JWKS_URL_ENV, e))?;
    if url.scheme() != "https" {
        return Err(invalid(JWKS_URL_ENV, "must use https"));
    }
    Ok(url)
}
