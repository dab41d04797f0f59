// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `CredentialStore` and `UserDirectory` traits.

use async_trait::async_trait;
use latchkey_config::model::StorageConfig;
use latchkey_core::{
    CredentialRecord, CredentialStore, HealthStatus, LatchkeyError, OwnerId, RecordId, User,
    UserDirectory,
};
use tracing::debug;

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed store. Wraps a [`Database`] handle and delegates to the
/// typed query modules.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Wrap an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database described by `config` and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, LatchkeyError> {
        let db = Database::open_with(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying connection.
    pub async fn close(self) -> Result<(), LatchkeyError> {
        self.db.close().await
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn owner_exists(&self, owner: OwnerId) -> Result<bool, LatchkeyError> {
        queries::users::user_exists(&self.db, owner).await
    }

    async fn insert(
        &self,
        owner: OwnerId,
        site_identifier: &str,
        login_identifier: &str,
        ciphertext: Vec<u8>,
    ) -> Result<RecordId, LatchkeyError> {
        queries::credentials::insert_credential(
            &self.db,
            owner,
            site_identifier,
            login_identifier,
            ciphertext,
        )
        .await
    }

    async fn list_by_site(
        &self,
        owner: OwnerId,
        site_identifier: &str,
    ) -> Result<Vec<CredentialRecord>, LatchkeyError> {
        queries::credentials::list_by_site(&self.db, owner, site_identifier).await
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<CredentialRecord>, LatchkeyError> {
        queries::credentials::list_by_owner(&self.db, owner).await
    }

    async fn delete(&self, owner: OwnerId, id: RecordId) -> Result<bool, LatchkeyError> {
        queries::credentials::delete_credential(&self.db, owner, id).await
    }

    async fn replace_ciphertext(
        &self,
        owner: OwnerId,
        id: RecordId,
        ciphertext: Vec<u8>,
    ) -> Result<bool, LatchkeyError> {
        queries::credentials::replace_ciphertext(&self.db, owner, id, ciphertext).await
    }

    // --- Vault metadata ---

    async fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, LatchkeyError> {
        queries::meta::get_meta(&self.db, key).await
    }

    async fn init_meta(&self, entries: Vec<(String, Vec<u8>)>) -> Result<bool, LatchkeyError> {
        queries::meta::init_meta(&self.db, entries).await
    }

    async fn health_check(&self) -> Result<HealthStatus, LatchkeyError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<OwnerId, LatchkeyError> {
        queries::users::create_user(&self.db, username, password_hash).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, LatchkeyError> {
        queries::users::find_by_username(&self.db, username).await
    }

    async fn get_user(&self, id: OwnerId) -> Result<Option<User>, LatchkeyError> {
        queries::users::get_user(&self.db, id).await
    }
}
