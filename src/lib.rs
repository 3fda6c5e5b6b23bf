// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet Accounts - registry of on-chain wallet addresses per user
//!
//! Anyone can read wallet account records. Creating, updating and disabling
//! a record requires a bearer token, and only the record's owner may do it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Bearer token verification (HS256 secret or JWKS)
//! - `storage` - Wallet account stores (redb, in-memory) and ownership checks
//! - `models` - The `WalletAccount` entity, normalization and validation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
