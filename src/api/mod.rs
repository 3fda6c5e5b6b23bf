// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::{json_content_type, require_auth},
    models::WalletAccount,
    state::AppState,
};

pub mod health;
pub mod wallet_accounts;

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeResponse {
    pub message: String,
}

/// Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "Home",
    responses(
        (status = 200, description = "Service is up", body = HomeResponse)
    )
)]
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "Welcome to the wallet accounts API".to_string(),
    })
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(home))
        .route(
            "/WalletAccounts",
            get(wallet_accounts::list_wallet_accounts).post(wallet_accounts::create_wallet_account),
        )
        .route("/WalletAccounts/{id}", get(wallet_accounts::get_wallet_account));

    // Create authenticates inside the handler, after the body is validated
    let protected_routes = Router::new()
        .route(
            "/WalletAccounts/{id}",
            put(wallet_accounts::update_wallet_account)
                .delete(wallet_accounts::delete_wallet_account),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let account_routes = public_routes
        .merge(protected_routes)
        .layer(middleware::from_fn(json_content_type));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(account_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        home,
        wallet_accounts::create_wallet_account,
        wallet_accounts::list_wallet_accounts,
        wallet_accounts::get_wallet_account,
        wallet_accounts::update_wallet_account,
        wallet_accounts::delete_wallet_account,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            WalletAccount,
            HomeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Home", description = "Service banner"),
        (name = "WalletAccounts", description = "Wallet account registry"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;
