// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store trait: owner-scoped persistence of encrypted records.

use async_trait::async_trait;

use crate::error::LatchkeyError;
use crate::types::{CredentialRecord, HealthStatus, OwnerId, RecordId};

/// Backend that persists encrypted credential records and vault metadata.
///
/// Implementations never see plaintext secrets. Every credential operation
/// is scoped to a single owner, and `insert` must be atomic with respect to
/// concurrent writers: a second insert of the same
/// `(owner, site, login)` triple fails with [`LatchkeyError::DuplicateRecord`].
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns true if `owner` references an existing user.
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool, LatchkeyError>;

    /// Insert a new record and return its id.
    ///
    /// Fails with `DuplicateRecord` if the triple exists and with
    /// `NotAuthenticated` if `owner` does not reference a user.
    async fn insert(
        &self,
        owner: OwnerId,
        site_identifier: &str,
        login_identifier: &str,
        ciphertext: Vec<u8>,
    ) -> Result<RecordId, LatchkeyError>;

    /// All records for `owner` at `site_identifier`, oldest first.
    async fn list_by_site(
        &self,
        owner: OwnerId,
        site_identifier: &str,
    ) -> Result<Vec<CredentialRecord>, LatchkeyError>;

    /// All records for `owner`, grouped by site then oldest first.
    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<CredentialRecord>, LatchkeyError>;

    /// Delete `id` if it belongs to `owner`. Returns false otherwise.
    async fn delete(&self, owner: OwnerId, id: RecordId) -> Result<bool, LatchkeyError>;

    /// Overwrite the ciphertext of `id` if it belongs to `owner`.
    async fn replace_ciphertext(
        &self,
        owner: OwnerId,
        id: RecordId,
        ciphertext: Vec<u8>,
    ) -> Result<bool, LatchkeyError>;

    // --- Vault metadata ---

    /// Read a vault metadata value.
    async fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, LatchkeyError>;

    /// Write all `entries` in one transaction unless metadata was already
    /// initialized. Returns false if another writer got there first.
    async fn init_meta(&self, entries: Vec<(String, Vec<u8>)>) -> Result<bool, LatchkeyError>;

    /// Round-trip the backend to confirm it is reachable.
    async fn health_check(&self) -> Result<HealthStatus, LatchkeyError>;
}
