// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User directory trait used by the account layer.

use async_trait::async_trait;

use crate::error::LatchkeyError;
use crate::types::{OwnerId, User};

/// Backend that persists registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Create a user. Fails with `UsernameTaken` if `username` exists.
    async fn create_user(&self, username: &str, password_hash: &str)
    -> Result<OwnerId, LatchkeyError>;

    /// Look up a user by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, LatchkeyError>;

    /// Look up a user by id.
    async fn get_user(&self, id: OwnerId) -> Result<Option<User>, LatchkeyError>;
}
