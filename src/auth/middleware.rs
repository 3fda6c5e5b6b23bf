// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request middleware for the wallet account routes.
//!
//! - [`json_content_type`] marks every response as JSON unless the handler
//!   already chose a content type.
//! - [`require_auth`] rejects requests without a valid bearer token and
//!   stores the caller in request extensions, where the
//!   [`Auth`](super::Auth) extractor picks it up.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/WalletAccounts", post(create_wallet_account))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_auth));
//! ```

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::{bearer_token, verify_token};
use crate::state::AppState;

/// Default `content-type: application/json` on responses that have a body.
pub async fn json_content_type(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if response.status() == StatusCode::NO_CONTENT {
        return response;
    }
    response
        .headers_mut()
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static("application/json"));
    response
}

/// Authentication middleware function.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    let user = match verify_token(&token, &state.auth_config).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    tracing::debug!(user_id = %user.user_id, "Authenticated request");
    request.extensions_mut().insert(user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Auth;
    use crate::test_support::{memory_state, token_for};
    use axum::{
        body::{to_bytes, Body},
        http::Request as HttpRequest,
        middleware,
        routing::{delete, get},
        Router,
    };
    use tower::ServiceExt;

    async fn whoami(Auth(user): Auth) -> String {
        user.user_id
    }

    async fn forget() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    fn app() -> Router {
        let (state, _) = memory_state();
        Router::new()
            .route("/whoami", get(whoami))
            .route("/forget", delete(forget))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
            .layer(middleware::from_fn(json_content_type))
            .with_state(state)
    }

    #[tokio::test]
    async fn rejects_missing_token() {
        let response = app()
            .oneshot(HttpRequest::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn passes_identity_to_handler() {
        let response = app()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header("Authorization", format!("Bearer {}", token_for("u1")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"u1");
    }

    #[tokio::test]
    async fn keeps_handler_content_type() {
        let response = app()
            .oneshot(
                HttpRequest::get("/whoami")
                    .header("Authorization", format!("Bearer {}", token_for("u1")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // String responses set text/plain themselves
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn no_content_stays_untyped() {
        let response = app()
            .oneshot(
                HttpRequest::delete("/forget")
                    .header("Authorization", format!("Bearer {}", token_for("u1")))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}
