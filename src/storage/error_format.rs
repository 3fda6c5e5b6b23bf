// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User-facing messages for storage errors.
//!
//! Backend errors carry redb/serde/IO detail that must not reach clients.
//! Only constraint violations and missing rows get a specific message.

use super::StoreError;

/// Message shown to clients for any backend failure.
pub const GENERIC_STORE_MESSAGE: &str = "Internal storage error";

/// Render a storage error as a client-safe message.
pub fn format_error(err: &StoreError) -> String {
    match err {
        StoreError::Conflict { field, .. } => format!("{} already taken", capitalize(field)),
        StoreError::NotFound(id) => format!("Wallet account {id} not found"),
        _ => GENERIC_STORE_MESSAGE.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
