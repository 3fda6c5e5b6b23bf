// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AuthError;

/// Claims read from a bearer token.
///
/// Tokens minted by the account login flow carry the caller in a `user_id`
/// claim, which may be a string or a number. Tokens from standard OIDC
/// issuers use `sub` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Service-specific user identifier
    #[serde(default)]
    pub user_id: Option<Value>,

    /// Subject, used when `user_id` is absent
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Session ID
    #[serde(default)]
    pub sid: Option<String>,
}

/// Authenticated caller extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Canonical user ID, compared against `WalletAccount::user_id`
    pub user_id: String,

    /// Session ID (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Original issuer
    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Build the caller identity from verified claims.
    ///
    /// Fails with `MissingIdentity` when neither claim yields a non-empty id.
    pub fn from_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let from_user_id = match claims.user_id {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(render_number(&n)),
            _ => None,
        };

        let user_id = from_user_id
            .or(claims.sub)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingIdentity)?;

        Ok(Self {
            user_id,
            session_id: claims.sid,
            issuer: claims.iss,
            expires_at: claims.exp,
        })
    }
}

/// Integral floats (`7.0`) render without the fraction so they compare equal
/// to the string form stored on records.
fn render_number(n: &serde_json::Number) -> String {
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}
