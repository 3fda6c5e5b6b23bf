// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Account Storage
//!
//! Persistence for [`WalletAccount`] records behind the
//! [`WalletAccountStore`] trait. Handlers only ever see the trait object held
//! in `AppState`, so the backend is picked once at startup.
//!
//! ## Backends
//!
//! - [`RedbWalletAccountStore`] - embedded ACID database (redb), the default
//! - [`InMemoryWalletAccountStore`] - process-local maps, for tests and
//!   throwaway instances
//!
//! ## Contract
//!
//! Every operation is a single atomic write or read. Address uniqueness is
//! enforced by the store. Ownership is NOT: callers must run
//! [`authorize_mutation`] against the current row before `update`, while
//! `disable` filters on the owner itself.

pub mod database;
pub mod error_format;
pub mod memory;
pub mod ownership;

pub use database::RedbWalletAccountStore;
pub use error_format::format_error;
pub use memory::InMemoryWalletAccountStore;
pub use ownership::{authorize_mutation, OwnedResource, OwnershipError};

use crate::models::WalletAccount;

/// Maximum number of records returned by a list call.
pub const LIST_LIMIT: usize = 100;

/// Error type for wallet account storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("wallet account {0} not found")]
    NotFound(u64),

    #[error("{field} '{value}' is already registered")]
    Conflict { field: &'static str, value: String },

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for wallet accounts.
pub trait WalletAccountStore: Send + Sync {
    /// Insert a new record, assigning it a fresh id.
    ///
    /// The incoming `id` is ignored. Fails with [`StoreError::Conflict`] when
    /// the address is already registered.
    fn create(&self, account: WalletAccount) -> StoreResult<WalletAccount>;

    /// Return up to `limit` records in id order.
    fn list_all(&self, limit: usize) -> StoreResult<Vec<WalletAccount>>;

    /// Fetch one record.
    fn get_by_id(&self, id: u64) -> StoreResult<WalletAccount>;

    /// Replace the row whose primary key is `account.id`.
    fn update(&self, account: &WalletAccount) -> StoreResult<WalletAccount>;

    /// Set `enabled = false` on the row matching both `id` and `user_id`.
    ///
    /// Returns the number of rows changed; zero is not an error.
    fn disable(&self, id: u64, user_id: &str) -> StoreResult<u64>;

    /// Cheap liveness probe for readiness checks.
    fn ping(&self) -> StoreResult<()>;
}
