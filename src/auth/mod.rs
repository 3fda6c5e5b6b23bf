// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication for the wallet account API.
//!
//! ## Auth Flow
//!
//! 1. The login service issues a signed JWT naming the user
//! 2. Clients send `Authorization: Bearer <JWT>` on mutating requests
//! 3. This service:
//!    - Verifies the signature (JWKS keys or the shared HS256 secret)
//!    - Checks expiry, and issuer/audience when configured
//!    - Extracts `user_id` (or `sub`) as the caller identity
//!
//! Ownership of individual records is checked afterwards, in
//! `storage::ownership`.
//!
//! ## Security
//!
//! - Read endpoints are public; create/update/delete require a token
//! - JWKS keys are fetched over HTTPS and cached with a TTL
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::JwksManager;
