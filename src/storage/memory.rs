// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-local wallet account store.
//!
//! Same contract as the redb store, kept in ordered maps behind one lock.
//! Used by handler tests and by `STORE_BACKEND=memory` for throwaway
//! instances. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use super::{StoreError, StoreResult, WalletAccountStore};
use crate::models::WalletAccount;

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<u64, WalletAccount>,
    address_index: HashMap<String, u64>,
    last_id: u64,
}

#[derive(Default)]
pub struct InMemoryWalletAccountStore {
    tables: RwLock<Tables>,
}

impl InMemoryWalletAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

impl WalletAccountStore for InMemoryWalletAccountStore {
    fn create(&self, mut account: WalletAccount) -> StoreResult<WalletAccount> {
        let mut tables = self.write()?;
        if tables.address_index.contains_key(&account.address) {
            return Err(StoreError::Conflict {
                field: "wallet address",
                value: account.address,
            });
        }

        tables.last_id += 1;
        account.id = tables.last_id;
        tables
            .address_index
            .insert(account.address.clone(), account.id);
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    fn list_all(&self, limit: usize) -> StoreResult<Vec<WalletAccount>> {
        let tables = self.read()?;
        Ok(tables.accounts.values().take(limit).cloned().collect())
    }

    fn get_by_id(&self, id: u64) -> StoreResult<WalletAccount> {
        self.read()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn update(&self, account: &WalletAccount) -> StoreResult<WalletAccount> {
        let mut tables = self.write()?;
        let previous_address = tables
            .accounts
            .get(&account.id)
            .map(|existing| existing.address.clone())
            .ok_or(StoreError::NotFound(account.id))?;

        if previous_address != account.address {
            if let Some(&holder) = tables.address_index.get(&account.address) {
                if holder != account.id {
                    return Err(StoreError::Conflict {
                        field: "wallet address",
                        value: account.address.clone(),
                    });
                }
            }
            tables.address_index.remove(&previous_address);
            tables
                .address_index
                .insert(account.address.clone(), account.id);
        }

        tables.accounts.insert(account.id, account.clone());
        Ok(account.clone())
    }

    fn disable(&self, id: u64, user_id: &str) -> StoreResult<u64> {
        let mut tables = self.write()?;
        match tables.accounts.get_mut(&id) {
            Some(account) if account.user_id == user_id => {
                account.enabled = false;
                account.updated_at = Utc::now();
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}
