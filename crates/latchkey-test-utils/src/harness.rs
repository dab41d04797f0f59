// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-database test environment with vault and accounts.

use std::sync::Arc;

use latchkey_auth::Accounts;
use latchkey_config::model::{LatchkeyConfig, StorageConfig, VaultConfig};
use latchkey_core::{CredentialStore, LatchkeyError, OwnerId, RecordId};
use latchkey_storage::SqliteStore;
use latchkey_vault::Vault;
use secrecy::SecretString;

/// Wrap a test string as a secret.
pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    master_secret: String,
    min_password_length: usize,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            master_secret: "test-master-secret".to_string(),
            min_password_length: 1,
        }
    }

    /// Use a specific master secret for the vault.
    pub fn with_master_secret(mut self, master_secret: &str) -> Self {
        self.master_secret = master_secret.to_string();
        self
    }

    /// Require passwords of at least `length` characters.
    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    /// Create the database, open the vault and build the accounts layer.
    pub async fn build(self) -> Result<TestHarness, LatchkeyError> {
        let temp_dir = tempfile::TempDir::new().map_err(LatchkeyError::storage)?;
        let db_path = temp_dir.path().join("latchkey-test.db");

        let mut config = LatchkeyConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            },
            vault: VaultConfig {
                master_secret: None,
                kdf_memory_cost: 32768,
                kdf_iterations: 2,
                kdf_parallelism: 1,
            },
            ..LatchkeyConfig::default()
        };
        config.accounts.min_password_length = self.min_password_length;

        let store = SqliteStore::open(&config.storage).await?;
        let vault = Vault::open(
            Arc::new(store.clone()),
            &secret(&self.master_secret),
            &config.vault,
        )
        .await?;
        let accounts = Accounts::from_config(Arc::new(store.clone()), &config)?;

        Ok(TestHarness {
            store,
            vault,
            accounts,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment backed by a temp database.
pub struct TestHarness {
    /// Store shared by the vault and the accounts layer.
    pub store: SqliteStore,
    /// The open vault.
    pub vault: Vault,
    /// Account registration and login.
    pub accounts: Accounts,
    /// Configuration the harness was built with.
    pub config: LatchkeyConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Register `username` with `password` and return the owner id.
    pub async fn register(&self, username: &str, password: &str) -> Result<OwnerId, LatchkeyError> {
        self.accounts.register(username, &secret(password)).await
    }

    /// Open a second vault over the same database.
    pub async fn reopen_vault(&self, master_secret: &str) -> Result<Vault, LatchkeyError> {
        Vault::open(
            Arc::new(self.store.clone()),
            &secret(master_secret),
            &self.config.vault,
        )
        .await
    }

    /// Flip one bit of a stored ciphertext so it no longer authenticates.
    pub async fn corrupt_record(
        &self,
        owner: OwnerId,
        site: &str,
        id: RecordId,
    ) -> Result<(), LatchkeyError> {
        let record = self
            .store
            .list_by_site(owner, site)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| LatchkeyError::Internal(format!("record {id} not found")))?;

        let mut blob = record.ciphertext;
        if let Some(last) = blob.last_mut() {
            *last ^= 0x01;
        }
        self.store.replace_ciphertext(owner, id, blob).await?;
        Ok(())
    }
}
