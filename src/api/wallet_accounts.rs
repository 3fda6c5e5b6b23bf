// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet account API endpoints.
//!
//! Reads are public. Create, update and delete require a bearer token, and
//! the caller must own the record being written (see
//! [`authorize_mutation`]). Delete is a soft delete: the record stays
//! readable with `enabled: false`.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{
        header::{HeaderName, LOCATION},
        StatusCode,
    },
    Json,
};

use crate::{
    auth::{Auth, AuthError},
    error::ApiError,
    models::WalletAccount,
    state::AppState,
    storage::{authorize_mutation, LIST_LIMIT},
};

/// Collection path for wallet accounts.
pub const RESOURCE_PATH: &str = "/WalletAccounts";

/// Header naming the id of a disabled record.
const ENTITY: HeaderName = HeaderName::from_static("entity");

fn parse_id(raw: &str) -> Result<u64, ApiError> {
    // `u64::from_str` tolerates a leading '+'
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::bad_request(format!(
            "Invalid wallet account id '{raw}': expected an unsigned integer"
        )));
    }
    raw.parse::<u64>()
        .map_err(|e| ApiError::bad_request(format!("Invalid wallet account id '{raw}': {e}")))
}

/// Register a wallet account for the authenticated user.
///
/// The body's `user_id` must match the caller. `id`, `enabled` and the
/// timestamps in the body are ignored.
#[utoipa::path(
    post,
    path = "/WalletAccounts",
    tag = "WalletAccounts",
    security(("bearer_auth" = [])),
    request_body = WalletAccount,
    responses(
        (status = 201, description = "Wallet account created", body = WalletAccount),
        (status = 401, description = "Missing/invalid token or user_id is not the caller"),
        (status = 409, description = "Wallet address already registered"),
        (status = 422, description = "Malformed body or missing field"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_wallet_account(
    State(state): State<AppState>,
    auth: Result<Auth, AuthError>,
    body: Bytes,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<WalletAccount>), ApiError> {
    let mut account: WalletAccount = serde_json::from_slice(&body)?;
    account.normalize();
    account.validate()?;

    let Auth(caller) = auth?;
    authorize_mutation(&caller, &account)?;

    let created = state.store.create(account)?;
    tracing::info!(
        wallet_account_id = created.id,
        user_id = %caller.user_id,
        coin = %created.coin,
        "Wallet account created"
    );

    let location = format!("{RESOURCE_PATH}/{}", created.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)))
}

/// List wallet accounts (at most 100).
#[utoipa::path(
    get,
    path = "/WalletAccounts",
    tag = "WalletAccounts",
    responses(
        (status = 200, description = "Wallet accounts", body = [WalletAccount]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_wallet_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<WalletAccount>>, ApiError> {
    Ok(Json(state.store.list_all(LIST_LIMIT)?))
}

/// Get a wallet account by id.
#[utoipa::path(
    get,
    path = "/WalletAccounts/{id}",
    tag = "WalletAccounts",
    params(
        ("id" = u64, Path, description = "Wallet account id")
    ),
    responses(
        (status = 200, description = "Wallet account", body = WalletAccount),
        (status = 400, description = "Id is not an unsigned integer"),
        (status = 404, description = "Wallet account not found")
    )
)]
pub async fn get_wallet_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WalletAccount>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get_by_id(id)?))
}

/// Replace a wallet account owned by the caller.
///
/// Both the stored record and the submitted `user_id` must belong to the
/// caller. Apart from the id, server fields are reset as on create, so an
/// update re-enables a disabled record.
#[utoipa::path(
    put,
    path = "/WalletAccounts/{id}",
    tag = "WalletAccounts",
    security(("bearer_auth" = [])),
    params(
        ("id" = u64, Path, description = "Wallet account id")
    ),
    request_body = WalletAccount,
    responses(
        (status = 200, description = "Wallet account updated", body = WalletAccount),
        (status = 400, description = "Id is not an unsigned integer"),
        (status = 401, description = "Missing/invalid token or not the owner"),
        (status = 404, description = "Wallet account not found"),
        (status = 409, description = "Wallet address already registered"),
        (status = 422, description = "Malformed body or missing field")
    )
)]
pub async fn update_wallet_account(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<WalletAccount>, ApiError> {
    let id = parse_id(&id)?;

    let current = state.store.get_by_id(id)?;
    authorize_mutation(&caller, &current)?;

    let mut update: WalletAccount = serde_json::from_slice(&body)?;
    authorize_mutation(&caller, &update)?;

    update.normalize();
    update.validate()?;

    // The path decides which row is written, never the body
    update.id = current.id;

    let updated = state.store.update(&update)?;
    tracing::info!(
        wallet_account_id = updated.id,
        user_id = %caller.user_id,
        "Wallet account updated"
    );

    Ok(Json(updated))
}

/// Disable (soft-delete) a wallet account owned by the caller.
#[utoipa::path(
    delete,
    path = "/WalletAccounts/{id}",
    tag = "WalletAccounts",
    security(("bearer_auth" = [])),
    params(
        ("id" = u64, Path, description = "Wallet account id")
    ),
    responses(
        (status = 204, description = "Wallet account disabled"),
        (status = 400, description = "Id is not an unsigned integer"),
        (status = 401, description = "Missing/invalid token or not the owner"),
        (status = 404, description = "Wallet account not found")
    )
)]
pub async fn delete_wallet_account(
    State(state): State<AppState>,
    Auth(caller): Auth,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(HeaderName, String); 1]), ApiError> {
    let id = parse_id(&id)?;

    let current = state.store.get_by_id(id)?;
    authorize_mutation(&caller, &current)?;

    let affected = state.store.disable(id, &caller.user_id)?;
    tracing::info!(
        wallet_account_id = id,
        user_id = %caller.user_id,
        rows_affected = affected,
        "Wallet account disabled"
    );

    Ok((StatusCode::NO_CONTENT, [(ENTITY, id.to_string())]))
}
