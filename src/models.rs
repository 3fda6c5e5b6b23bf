// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Account Model
//!
//! A wallet account links an opaque user identifier to an on-chain address
//! and the coin (asset or chain) that address belongs to.
//!
//! The same struct is used as the request body, the stored row and the
//! response body. Server-owned fields (`id`, `enabled`, timestamps) are
//! overwritten by [`WalletAccount::normalize`] before anything is persisted,
//! so whatever a client sends for them is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::OwnedResource;

/// Entity validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is empty after normalization.
    #[error("Required {0}")]
    MissingField(&'static str),
}

/// A wallet account record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct WalletAccount {
    /// System-assigned identifier. Ignored on input.
    pub id: u64,
    /// On-chain address. Unique across all records.
    #[serde(rename = "wallet_address")]
    pub address: String,
    /// Asset or chain type (e.g. `ETH`, `BTC`).
    pub coin: String,
    /// Identifier of the owning user.
    pub user_id: String,
    /// `false` once the record has been disabled (soft delete).
    pub enabled: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl WalletAccount {
    /// Canonicalize the record before it is written.
    ///
    /// Trims and HTML-escapes every client-supplied string, clears the id so
    /// the store assigns a fresh one, re-enables the record and stamps both
    /// timestamps with the current time.
    pub fn normalize(&mut self) {
        self.id = 0;
        self.address = escape_html(self.address.trim());
        self.coin = escape_html(self.coin.trim());
        self.user_id = escape_html(self.user_id.trim());
        self.enabled = true;
        let now = Utc::now();
        self.created_at = now;
        self.updated_at = now;
    }

    /// Check that every required field is present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.is_empty() {
            return Err(ValidationError::MissingField("wallet address"));
        }
        if self.coin.is_empty() {
            return Err(ValidationError::MissingField("coin"));
        }
        if self.user_id.is_empty() {
            return Err(ValidationError::MissingField("user id"));
        }
        Ok(())
    }
}

impl OwnedResource for WalletAccount {
    fn owner_user_id(&self) -> &str {
        &self.user_id
    }
}

/// Escape the five HTML-significant characters.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
