// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet account store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `wallet_accounts`: id → serialized WalletAccount (JSON bytes)
//! - `wallet_address_index`: address → id (uniqueness constraint)
//! - `sequences`: name → last issued id
//!
//! Each operation runs in a single redb transaction. redb serialises write
//! transactions, so the uniqueness check and the insert cannot interleave
//! with another writer.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{StoreError, StoreResult, WalletAccountStore};
use crate::models::WalletAccount;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: id → serialized WalletAccount.
const WALLET_ACCOUNTS: TableDefinition<u64, &[u8]> = TableDefinition::new("wallet_accounts");

/// Unique index: address → id.
const ADDRESS_INDEX: TableDefinition<&str, u64> = TableDefinition::new("wallet_address_index");

/// Monotonic id sequences.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

const ACCOUNT_SEQUENCE: &str = "wallet_accounts";

fn address_conflict(address: &str) -> StoreError {
    StoreError::Conflict {
        field: "wallet address",
        value: address.to_string(),
    }
}

// =============================================================================
// RedbWalletAccountStore
// =============================================================================

/// Embedded ACID wallet account store.
pub struct RedbWalletAccountStore {
    db: Database,
}

impl RedbWalletAccountStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(WALLET_ACCOUNTS)?;
            let _ = write_txn.open_table(ADDRESS_INDEX)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

impl WalletAccountStore for RedbWalletAccountStore {
    fn create(&self, mut account: WalletAccount) -> StoreResult<WalletAccount> {
        let write_txn = self.db.begin_write()?;
        {
            let mut index = write_txn.open_table(ADDRESS_INDEX)?;
            if index.get(account.address.as_str())?.is_some() {
                // Dropping the transaction without commit aborts it
                return Err(address_conflict(&account.address));
            }

            let mut sequences = write_txn.open_table(SEQUENCES)?;
            let next_id = sequences
                .get(ACCOUNT_SEQUENCE)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            sequences.insert(ACCOUNT_SEQUENCE, next_id)?;

            account.id = next_id;
            let json = serde_json::to_vec(&account)?;

            let mut accounts = write_txn.open_table(WALLET_ACCOUNTS)?;
            accounts.insert(next_id, json.as_slice())?;
            index.insert(account.address.as_str(), next_id)?;
        }
        write_txn.commit()?;

        Ok(account)
    }

    fn list_all(&self, limit: usize) -> StoreResult<Vec<WalletAccount>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_ACCOUNTS)?;

        let mut accounts = Vec::new();
        for entry in table.iter()?.take(limit) {
            let (_, value) = entry?;
            accounts.push(serde_json::from_slice(value.value())?);
        }
        Ok(accounts)
    }

    fn get_by_id(&self, id: u64) -> StoreResult<WalletAccount> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_ACCOUNTS)?;
        match table.get(id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn update(&self, account: &WalletAccount) -> StoreResult<WalletAccount> {
        let write_txn = self.db.begin_write()?;
        {
            let mut accounts = write_txn.open_table(WALLET_ACCOUNTS)?;

            // Read existing value and deserialize before mutating
            let existing: WalletAccount = {
                let guard = accounts
                    .get(account.id)?
                    .ok_or(StoreError::NotFound(account.id))?;
                serde_json::from_slice(guard.value())?
            };

            if existing.address != account.address {
                let mut index = write_txn.open_table(ADDRESS_INDEX)?;
                let holder = index.get(account.address.as_str())?.map(|v| v.value());
                if holder.is_some_and(|id| id != account.id) {
                    return Err(address_conflict(&account.address));
                }
                index.remove(existing.address.as_str())?;
                index.insert(account.address.as_str(), account.id)?;
            }

            let json = serde_json::to_vec(account)?;
            accounts.insert(account.id, json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(account.clone())
    }

    fn disable(&self, id: u64, user_id: &str) -> StoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let affected = {
            let mut accounts = write_txn.open_table(WALLET_ACCOUNTS)?;

            let current: Option<WalletAccount> = match accounts.get(id)? {
                Some(guard) => Some(serde_json::from_slice(guard.value())?),
                None => None,
            };

            match current {
                Some(mut account) if account.user_id == user_id => {
                    account.enabled = false;
                    account.updated_at = Utc::now();
                    let json = serde_json::to_vec(&account)?;
                    accounts.insert(id, json.as_slice())?;
                    1
                }
                _ => 0,
            }
        };
        write_txn.commit()?;

        Ok(affected)
    }

    fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(WALLET_ACCOUNTS)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
