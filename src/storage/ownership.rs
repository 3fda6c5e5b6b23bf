// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for mutating operations.
//!
//! Every update or disable must pass through [`authorize_mutation`] before
//! the store is touched. Reads are public and skip it.

use crate::auth::AuthenticatedUser;

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> &str;
}

/// The caller is authenticated but does not own the resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user {user_id} does not own this resource")]
pub struct OwnershipError {
    pub user_id: String,
}

/// Allow a mutation only when the caller owns `resource`.
///
/// Used against the stored row and, for updates, against the submitted
/// payload as well.
pub fn authorize_mutation<R>(caller: &AuthenticatedUser, resource: &R) -> Result<(), OwnershipError>
where
    R: OwnedResource + ?Sized,
{
    if resource.owner_user_id() == caller.user_id {
        Ok(())
    } else {
        Err(OwnershipError {
            user_id: caller.user_id.clone(),
        })
    }
}
