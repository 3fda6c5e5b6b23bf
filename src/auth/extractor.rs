// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers that mutate records:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.user_id is the token-derived caller identity
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::TokenClaims;
use super::{AuthError, AuthenticatedUser};
use crate::state::{AppState, AuthConfig};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for the token-authenticated caller.
///
/// Reuses the identity placed in request extensions by
/// [`require_auth`](super::middleware::require_auth) when present, otherwise
/// verifies the `Authorization: Bearer` header itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers)?;
        let user = verify_token(token, &state.auth_config).await?;

        Ok(Auth(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Verify a bearer token and return the caller it identifies.
pub async fn verify_token(token: &str, auth_config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    if let Some(ref jwks) = auth_config.jwks {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let (key, algorithm) = jwks.decoding_key(header.kid.as_deref()).await?;
        return verify_signed(token, &key, algorithm, auth_config);
    }

    if let Some(ref secret) = auth_config.shared_secret {
        return verify_signed(token, secret, Algorithm::HS256, auth_config);
    }

    verify_unsigned(token)
}

fn verify_signed(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
    auth_config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    if let Some(ref issuer) = auth_config.issuer {
        validation.set_issuer(&[issuer]);
    }

    if let Some(ref audience) = auth_config.audience {
        validation.set_audience(&[audience]);
    } else {
        validation.validate_aud = false;
    }

    let token_data = decode::<TokenClaims>(token, key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    })?;

    AuthenticatedUser::from_claims(token_data.claims)
}

/// Decode without checking the signature.
///
/// WARNING: development builds only.
#[cfg(feature = "dev")]
fn verify_unsigned(token: &str) -> Result<AuthenticatedUser, AuthError> {
    let token_data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| AuthError::MalformedToken)?;

    let claims = token_data.claims;
    // `exp` is mandatory, as in signed mode
    if claims.exp == 0 {
        return Err(AuthError::MalformedToken);
    }
    let now = chrono::Utc::now().timestamp();
    if claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return Err(AuthError::TokenExpired);
    }

    AuthenticatedUser::from_claims(claims)
}

#[cfg(not(feature = "dev"))]
fn verify_unsigned(_token: &str) -> Result<AuthenticatedUser, AuthError> {
    Err(AuthError::InternalError(
        "no bearer token verifier configured".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwksManager;
    use crate::test_support::{
        memory_state, rs256_token, rsa_jwk_set, token_for, token_with_claims, user, RSA_KID,
        TEST_SECRET,
    };
    use axum::http::Request;
    use serde_json::json;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_extractor_requires_auth_header() {
        let (state, _) = memory_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_rejects_other_schemes() {
        let (state, _) = memory_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwYXNz"));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));

        let mut parts = parts_with_header(Some("Bearer    "));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_extractor_succeeds_with_signed_token() {
        let (state, _) = memory_state();
        let header = format!("Bearer {}", token_for("user_123"));
        let mut parts = parts_with_header(Some(&header));

        let Auth(caller) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(caller.user_id, "user_123");
    }

    #[tokio::test]
    async fn auth_extractor_prefers_extensions() {
        let (state, _) = memory_state();
        let mut parts = parts_with_header(None);
        parts.extensions.insert(user("user_from_middleware"));

        let Auth(caller) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(caller.user_id, "user_from_middleware");
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_signature() {
        let config = AuthConfig::with_shared_secret(b"some-other-secret");
        let result = verify_token(&token_for("user_123"), &config).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let config = AuthConfig::with_shared_secret(TEST_SECRET);
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = token_with_claims(json!({"user_id": "user_123", "exp": exp}));

        let result = verify_token(&token, &config).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn token_without_exp_is_malformed() {
        let config = AuthConfig::with_shared_secret(TEST_SECRET);
        let token = token_with_claims(json!({"user_id": "user_123"}));

        let result = verify_token(&token, &config).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[tokio::test]
    async fn issuer_is_checked_when_configured() {
        let config =
            AuthConfig::with_shared_secret(TEST_SECRET).issuer(Some("accounts-login".to_string()));
        let exp = chrono::Utc::now().timestamp() + 3600;

        let wrong = token_with_claims(json!({"user_id": "u1", "exp": exp, "iss": "elsewhere"}));
        assert!(matches!(
            verify_token(&wrong, &config).await,
            Err(AuthError::InvalidIssuer)
        ));

        let right = token_with_claims(json!({"user_id": "u1", "exp": exp, "iss": "accounts-login"}));
        assert_eq!(verify_token(&right, &config).await.unwrap().user_id, "u1");
    }

    async fn jwks_config() -> AuthConfig {
        let jwks = JwksManager::new("https://unreachable.invalid/jwks.json").unwrap();
        jwks.install(rsa_jwk_set()).await;
        AuthConfig::with_jwks(jwks)
    }

    fn live_claims(user_id: &str) -> serde_json::Value {
        json!({"user_id": user_id, "exp": chrono::Utc::now().timestamp() + 3600})
    }

    #[tokio::test]
    async fn jwks_mode_verifies_rsa_signature() {
        let config = jwks_config().await;

        let token = rs256_token(Some(RSA_KID), live_claims("user_rsa"));
        let caller = verify_token(&token, &config).await.unwrap();
        assert_eq!(caller.user_id, "user_rsa");

        // No kid: the first usable key in the set is tried
        let token = rs256_token(None, live_claims("user_rsa"));
        assert_eq!(verify_token(&token, &config).await.unwrap().user_id, "user_rsa");
    }

    #[tokio::test]
    async fn jwks_mode_rejects_unknown_kid() {
        let config = jwks_config().await;
        let token = rs256_token(Some("not-published"), live_claims("user_rsa"));

        assert!(matches!(
            verify_token(&token, &config).await,
            Err(AuthError::NoMatchingKey)
        ));
    }

    #[tokio::test]
    async fn jwks_mode_rejects_hs256_tokens() {
        let config = jwks_config().await;

        // Signed with the shared secret, checked against the RSA key
        let result = verify_token(&token_for("user_rsa"), &config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn jwks_mode_checks_expiry() {
        let config = jwks_config().await;
        let token = rs256_token(
            Some(RSA_KID),
            json!({"user_id": "user_rsa", "exp": chrono::Utc::now().timestamp() - 3600}),
        );

        assert!(matches!(
            verify_token(&token, &config).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let config = AuthConfig::with_shared_secret(TEST_SECRET);
        let result = verify_token("not-a-jwt", &config).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[cfg(feature = "dev")]
    #[tokio::test]
    async fn unsigned_mode_still_requires_exp() {
        let config = AuthConfig::default();

        let no_exp = token_with_claims(json!({"user_id": "u1"}));
        assert!(matches!(
            verify_token(&no_exp, &config).await,
            Err(AuthError::MalformedToken)
        ));

        let expired = token_with_claims(json!({
            "user_id": "u1",
            "exp": chrono::Utc::now().timestamp() - 3600
        }));
        assert!(matches!(
            verify_token(&expired, &config).await,
            Err(AuthError::TokenExpired)
        ));

        assert_eq!(
            verify_token(&token_for("u1"), &config).await.unwrap().user_id,
            "u1"
        );
    }

    #[cfg(not(feature = "dev"))]
    #[tokio::test]
    async fn no_verifier_rejects_everything() {
        let result = verify_token(&token_for("user_123"), &AuthConfig::default()).await;
        assert!(matches!(result, Err(AuthError::InternalError(_))));
    }
}
