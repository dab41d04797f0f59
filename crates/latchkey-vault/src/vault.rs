// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault facade: save, list, replace, and delete owner-scoped credentials.
//!
//! Opening the vault stretches the master secret into a root key and checks
//! it against the `key_check` blob written when the vault was first created.
//! Each operation derives the owner's key from the root key, uses it, and
//! drops it before returning.

use std::sync::Arc;

use latchkey_config::model::VaultConfig;
use latchkey_core::{
    CredentialRecord, CredentialStore, HealthStatus, LatchkeyError, OwnerId, RecordId,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto;
use crate::kdf::{self, KdfParams, SALT_LEN};

const META_KDF_SALT: &str = "kdf_salt";
const META_KDF_PARAMS: &str = "kdf_params";
const META_KEY_CHECK: &str = "key_check";

/// Known plaintext sealed under the root key to detect a wrong master secret.
const KEY_CHECK_PLAINTEXT: &[u8] = b"latchkey key check v1";

/// Result of [`Vault::save_credential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new record was stored.
    Saved(RecordId),
    /// The `(owner, site, login)` triple already exists; nothing was written.
    Duplicate,
}

/// A record whose secret decrypted and authenticated.
#[derive(Debug)]
pub struct DecryptedCredential {
    pub id: RecordId,
    pub site_identifier: String,
    pub login_identifier: String,
    pub secret: SecretString,
    pub created_at: String,
}

/// A record whose ciphertext failed authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorruptedCredential {
    pub id: RecordId,
    pub site_identifier: String,
    pub login_identifier: String,
    pub created_at: String,
}

/// One entry of a credential listing.
#[derive(Debug)]
pub enum VaultEntry {
    Decrypted(DecryptedCredential),
    Corrupted(CorruptedCredential),
}

impl VaultEntry {
    pub fn id(&self) -> RecordId {
        match self {
            Self::Decrypted(c) => c.id,
            Self::Corrupted(c) => c.id,
        }
    }

    pub fn login_identifier(&self) -> &str {
        match self {
            Self::Decrypted(c) => &c.login_identifier,
            Self::Corrupted(c) => &c.login_identifier,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted(_))
    }

    pub fn as_decrypted(&self) -> Option<&DecryptedCredential> {
        match self {
            Self::Decrypted(c) => Some(c),
            Self::Corrupted(_) => None,
        }
    }
}

/// The open vault, holding the root key in memory.
///
/// The root key is read-only for the life of the vault and zeroized on drop.
/// Debug output omits it.
pub struct Vault {
    root_key: Zeroizing<[u8; 32]>,
    store: Arc<dyn CredentialStore>,
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("root_key", &"[REDACTED]")
            .finish()
    }
}

impl Vault {
    /// Open the vault, creating its metadata on first use.
    ///
    /// Fails with `Config` when the master secret is empty or does not match
    /// the existing vault, and with `Storage` when the store is unreachable.
    pub async fn open(
        store: Arc<dyn CredentialStore>,
        master_secret: &SecretString,
        config: &VaultConfig,
    ) -> Result<Self, LatchkeyError> {
        if master_secret.expose_secret().is_empty() {
            return Err(LatchkeyError::Config(
                "no master secret configured".to_string(),
            ));
        }

        match store.health_check().await? {
            HealthStatus::Healthy => {}
            HealthStatus::Degraded(reason) => warn!(reason = %reason, "credential store degraded"),
            HealthStatus::Unhealthy(reason) => {
                return Err(LatchkeyError::Storage {
                    source: reason.into(),
                });
            }
        }

        let root_key = match load_meta(store.as_ref()).await? {
            Some(meta) => unlock(master_secret, &meta)?,
            None => match create(store.as_ref(), master_secret, config).await? {
                Some(root_key) => root_key,
                // Another process initialized the vault between our read and write.
                None => {
                    let meta = load_meta(store.as_ref()).await?.ok_or_else(|| {
                        LatchkeyError::Config("vault metadata disappeared".to_string())
                    })?;
                    unlock(master_secret, &meta)?
                }
            },
        };

        Ok(Self { root_key, store })
    }

    /// Returns true once a vault has been created in `store`.
    ///
    /// Reads metadata only. Unlike [`Vault::open`], never writes.
    pub async fn is_initialized(store: &dyn CredentialStore) -> Result<bool, LatchkeyError> {
        Ok(store.get_meta(META_KEY_CHECK).await?.is_some())
    }

    /// Encrypt and store a secret for `owner`.
    ///
    /// A duplicate `(owner, site, login)` is reported as
    /// [`SaveOutcome::Duplicate`] and leaves the stored record untouched.
    pub async fn save_credential(
        &self,
        owner: OwnerId,
        site_identifier: &str,
        login_identifier: &str,
        secret: &SecretString,
    ) -> Result<SaveOutcome, LatchkeyError> {
        if site_identifier.trim().is_empty() || login_identifier.trim().is_empty() {
            return Err(LatchkeyError::Validation(
                "site and login must not be empty".to_string(),
            ));
        }
        self.ensure_owner(owner).await?;

        let blob = self.seal_for(owner, secret)?;
        match self
            .store
            .insert(owner, site_identifier, login_identifier, blob)
            .await
        {
            Ok(id) => {
                debug!(owner = %owner, site = %site_identifier, record_id = %id, "credential saved");
                Ok(SaveOutcome::Saved(id))
            }
            Err(LatchkeyError::DuplicateRecord { .. }) => {
                debug!(owner = %owner, site = %site_identifier, "duplicate credential not stored");
                Ok(SaveOutcome::Duplicate)
            }
            Err(e) => Err(e),
        }
    }

    /// Decrypt every credential `owner` stored for `site_identifier`, oldest
    /// first. A record that fails authentication is returned as
    /// [`VaultEntry::Corrupted`] and does not affect the others.
    pub async fn get_credentials(
        &self,
        owner: OwnerId,
        site_identifier: &str,
    ) -> Result<Vec<VaultEntry>, LatchkeyError> {
        self.ensure_owner(owner).await?;
        let records = self.store.list_by_site(owner, site_identifier).await?;
        self.open_records(records)
    }

    /// Decrypt every credential `owner` stored, grouped by site.
    pub async fn list_credentials(&self, owner: OwnerId) -> Result<Vec<VaultEntry>, LatchkeyError> {
        self.ensure_owner(owner).await?;
        let records = self.store.list_by_owner(owner).await?;
        self.open_records(records)
    }

    /// Delete one of `owner`'s records. Returns false when the record does
    /// not exist or belongs to someone else.
    pub async fn delete_credential(
        &self,
        owner: OwnerId,
        id: RecordId,
    ) -> Result<bool, LatchkeyError> {
        self.ensure_owner(owner).await?;
        let removed = self.store.delete(owner, id).await?;
        debug!(owner = %owner, record_id = %id, removed, "credential delete");
        Ok(removed)
    }

    /// Re-encrypt `id` with a new secret. Returns false when the record does
    /// not exist or belongs to someone else.
    pub async fn replace_secret(
        &self,
        owner: OwnerId,
        id: RecordId,
        secret: &SecretString,
    ) -> Result<bool, LatchkeyError> {
        self.ensure_owner(owner).await?;
        let blob = self.seal_for(owner, secret)?;
        let replaced = self.store.replace_ciphertext(owner, id, blob).await?;
        debug!(owner = %owner, record_id = %id, replaced, "credential secret replaced");
        Ok(replaced)
    }

    /// Report the health of the underlying store.
    pub async fn health_check(&self) -> Result<HealthStatus, LatchkeyError> {
        self.store.health_check().await
    }

    async fn ensure_owner(&self, owner: OwnerId) -> Result<(), LatchkeyError> {
        if self.store.owner_exists(owner).await? {
            Ok(())
        } else {
            debug!(owner = %owner, "rejected operation for unknown owner");
            Err(LatchkeyError::NotAuthenticated)
        }
    }

    fn seal_for(&self, owner: OwnerId, secret: &SecretString) -> Result<Vec<u8>, LatchkeyError> {
        let key = kdf::derive_owner_key(&self.root_key, owner)?;
        crypto::encrypt(&key, secret.expose_secret().as_bytes())
    }

    fn open_records(&self, records: Vec<CredentialRecord>) -> Result<Vec<VaultEntry>, LatchkeyError> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            // Always the key of the record's own owner.
            let key = kdf::derive_owner_key(&self.root_key, record.owner_id)?;
            let plaintext = crypto::decrypt(&key, &record.ciphertext)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());

            let entry = match plaintext {
                Some(secret) => VaultEntry::Decrypted(DecryptedCredential {
                    id: record.id,
                    site_identifier: record.site_identifier,
                    login_identifier: record.login_identifier,
                    secret: SecretString::from(secret),
                    created_at: record.created_at,
                }),
                None => {
                    warn!(
                        owner = %record.owner_id,
                        record_id = %record.id,
                        "credential failed authentication, reporting as corrupted"
                    );
                    VaultEntry::Corrupted(CorruptedCredential {
                        id: record.id,
                        site_identifier: record.site_identifier,
                        login_identifier: record.login_identifier,
                        created_at: record.created_at,
                    })
                }
            };
            entries.push(entry);
        }
        Ok(entries)
    }
}

/// Vault parameters read back from `vault_meta`.
struct VaultMeta {
    salt: [u8; SALT_LEN],
    params: KdfParams,
    key_check: Vec<u8>,
}

/// Read vault metadata. `None` means the vault has not been created yet.
async fn load_meta(store: &dyn CredentialStore) -> Result<Option<VaultMeta>, LatchkeyError> {
    let salt = store.get_meta(META_KDF_SALT).await?;
    let params = store.get_meta(META_KDF_PARAMS).await?;
    let key_check = store.get_meta(META_KEY_CHECK).await?;

    match (salt, params, key_check) {
        (None, None, None) => Ok(None),
        (Some(salt), Some(params), Some(key_check)) => {
            let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| {
                LatchkeyError::Config("corrupted vault salt (expected 16 bytes)".to_string())
            })?;
            Ok(Some(VaultMeta {
                salt,
                params: KdfParams::from_json_bytes(&params)?,
                key_check,
            }))
        }
        _ => Err(LatchkeyError::Config(
            "vault metadata is incomplete".to_string(),
        )),
    }
}

/// Create vault metadata. Returns `None` if another writer initialized it first.
async fn create(
    store: &dyn CredentialStore,
    master_secret: &SecretString,
    config: &VaultConfig,
) -> Result<Option<Zeroizing<[u8; 32]>>, LatchkeyError> {
    let salt = kdf::generate_salt()?;
    let params = KdfParams::from(config);
    let root_key = kdf::derive_root_key(master_secret.expose_secret().as_bytes(), &salt, params)?;
    let key_check = crypto::encrypt(&root_key, KEY_CHECK_PLAINTEXT)?;

    let written = store
        .init_meta(vec![
            (META_KDF_SALT.to_string(), salt.to_vec()),
            (META_KDF_PARAMS.to_string(), params.to_json_bytes()),
            (META_KEY_CHECK.to_string(), key_check),
        ])
        .await?;

    if written {
        info!("vault created");
        Ok(Some(root_key))
    } else {
        Ok(None)
    }
}

/// Derive the root key from stored parameters and verify it.
fn unlock(
    master_secret: &SecretString,
    meta: &VaultMeta,
) -> Result<Zeroizing<[u8; 32]>, LatchkeyError> {
    let root_key =
        kdf::derive_root_key(master_secret.expose_secret().as_bytes(), &meta.salt, meta.params)?;

    match crypto::decrypt(&root_key, &meta.key_check) {
        Ok(check) if check == KEY_CHECK_PLAINTEXT => {
            debug!("vault unlocked");
            Ok(root_key)
        }
        _ => Err(LatchkeyError::Config(
            "master secret does not match this vault".to_string(),
        )),
    }
}

/// Mask a secret for display: `"hunt...ord2"`.
///
/// Shows up to 4 leading and 4 trailing characters. Values shorter than 10
/// characters are fully masked as `"****"`.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value.chars().skip(count - 4).collect();
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::UserDirectory;
    use latchkey_storage::{Database, SqliteStore};
    use tempfile::tempdir;
    use tracing_test::traced_test;

    /// Low KDF cost for fast tests.
    fn test_config() -> VaultConfig {
        VaultConfig {
            master_secret: None,
            kdf_memory_cost: 32768,
            kdf_iterations: 2,
            kdf_parallelism: 1,
        }
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    async fn open_test_store() -> (SqliteStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test_vault.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (SqliteStore::new(db), dir)
    }

    async fn open_vault(store: &SqliteStore, master: &str) -> Result<Vault, LatchkeyError> {
        Vault::open(Arc::new(store.clone()), &secret(master), &test_config()).await
    }

    /// Flip the last byte of a record's stored ciphertext.
    async fn tamper(store: &SqliteStore, owner: OwnerId, site: &str, id: RecordId) {
        let records = store.list_by_site(owner, site).await.unwrap();
        let mut blob = records
            .into_iter()
            .find(|r| r.id == id)
            .unwrap()
            .ciphertext;
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(store.replace_ciphertext(owner, id, blob).await.unwrap());
    }

    #[tokio::test]
    async fn empty_master_secret_is_configuration_error() {
        let (store, _dir) = open_test_store().await;
        let err = open_vault(&store, "").await.unwrap_err();
        assert!(matches!(err, LatchkeyError::Config(_)));
    }

    #[tokio::test]
    async fn reopen_with_same_master_secret_reads_existing_secrets() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();

        let vault = open_vault(&store, "master-one").await.unwrap();
        vault
            .save_credential(owner, "bank.com", "alice", &secret("S3cret!"))
            .await
            .unwrap();
        drop(vault);

        let vault = open_vault(&store, "master-one").await.unwrap();
        let entries = vault.get_credentials(owner, "bank.com").await.unwrap();
        let cred = entries[0].as_decrypted().unwrap();
        assert_eq!(cred.secret.expose_secret(), "S3cret!");
    }

    #[tokio::test]
    async fn wrong_master_secret_fails_open() {
        let (store, _dir) = open_test_store().await;
        open_vault(&store, "right").await.unwrap();

        let err = open_vault(&store, "wrong").await.unwrap_err();
        assert!(matches!(err, LatchkeyError::Config(ref m) if m.contains("does not match")));
    }

    #[tokio::test]
    async fn open_fails_when_store_is_closed() {
        let (store, _dir) = open_test_store().await;
        let handle = store.clone();
        store.close().await.unwrap();

        let err = open_vault(&handle, "master").await.unwrap_err();
        assert!(matches!(err, LatchkeyError::Storage { .. }));
    }

    #[tokio::test]
    async fn is_initialized_tracks_first_open() {
        let (store, _dir) = open_test_store().await;
        assert!(!Vault::is_initialized(&store).await.unwrap());

        open_vault(&store, "master").await.unwrap();
        assert!(Vault::is_initialized(&store).await.unwrap());
    }

    #[tokio::test]
    async fn operations_report_storage_error_after_store_closes() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();
        vault
            .save_credential(owner, "bank.com", "alice", &secret("pw"))
            .await
            .unwrap();

        store.close().await.unwrap();

        assert!(matches!(
            vault.get_credentials(owner, "bank.com").await,
            Err(LatchkeyError::Storage { .. })
        ));
        assert!(matches!(
            vault
                .save_credential(owner, "bank.com", "bob", &secret("pw"))
                .await,
            Err(LatchkeyError::Storage { .. })
        ));
        assert!(matches!(
            vault.health_check().await,
            Err(LatchkeyError::Storage { .. })
        ));
    }

    #[tokio::test]
    async fn save_twice_is_idempotent() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        let first = vault
            .save_credential(owner, "example.com", "alice", &secret("pw1"))
            .await
            .unwrap();
        let second = vault
            .save_credential(owner, "example.com", "alice", &secret("pw1"))
            .await
            .unwrap();

        assert!(matches!(first, SaveOutcome::Saved(_)));
        assert_eq!(second, SaveOutcome::Duplicate);
        assert_eq!(
            vault.get_credentials(owner, "example.com").await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn concurrent_saves_store_exactly_one_record() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = Arc::new(open_vault(&store, "master").await.unwrap());

        let pw = secret("pw");
        let (a, b) = tokio::join!(
            vault.save_credential(owner, "example.com", "alice", &pw),
            vault.save_credential(owner, "example.com", "alice", &pw),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let saved = outcomes
            .iter()
            .filter(|o| matches!(o, SaveOutcome::Saved(_)))
            .count();
        assert_eq!(saved, 1);
        assert!(outcomes.contains(&SaveOutcome::Duplicate));
    }

    #[tokio::test]
    async fn unknown_owner_is_not_authenticated() {
        let (store, _dir) = open_test_store().await;
        let vault = open_vault(&store, "master").await.unwrap();
        let ghost = OwnerId(404);

        let save = vault
            .save_credential(ghost, "bank.com", "ghost", &secret("x"))
            .await;
        assert!(matches!(save, Err(LatchkeyError::NotAuthenticated)));
        assert!(matches!(
            vault.get_credentials(ghost, "bank.com").await,
            Err(LatchkeyError::NotAuthenticated)
        ));
        assert!(matches!(
            vault.delete_credential(ghost, RecordId(1)).await,
            Err(LatchkeyError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn empty_site_or_login_is_rejected() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        let err = vault
            .save_credential(owner, " ", "alice", &secret("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LatchkeyError::Validation(_)));
    }

    #[tokio::test]
    async fn stored_ciphertext_never_contains_plaintext() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        vault
            .save_credential(owner, "bank.com", "alice", &secret("plaintext-marker"))
            .await
            .unwrap();

        let records = store.list_by_site(owner, "bank.com").await.unwrap();
        let needle = b"plaintext-marker";
        assert!(
            !records[0]
                .ciphertext
                .windows(needle.len())
                .any(|w| w == needle)
        );
    }

    #[tokio::test]
    async fn tampered_record_is_flagged_and_others_survive() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        let mut ids = Vec::new();
        for (login, pw) in [("a", "pw-a"), ("b", "pw-b"), ("c", "pw-c")] {
            match vault
                .save_credential(owner, "mail.com", login, &secret(pw))
                .await
                .unwrap()
            {
                SaveOutcome::Saved(id) => ids.push(id),
                SaveOutcome::Duplicate => panic!("unexpected duplicate"),
            }
        }
        tamper(&store, owner, "mail.com", ids[1]).await;

        let entries = vault.get_credentials(owner, "mail.com").await.unwrap();
        assert_eq!(entries.len(), 3);
        assert!(!entries[0].is_corrupted());
        assert!(entries[1].is_corrupted());
        assert!(!entries[2].is_corrupted());
        assert_eq!(entries[1].id(), ids[1]);
        assert_eq!(entries[1].login_identifier(), "b");
        assert_eq!(
            entries[2].as_decrypted().unwrap().secret.expose_secret(),
            "pw-c"
        );
    }

    #[tokio::test]
    async fn records_of_other_owners_are_never_returned_or_deleted() {
        let (store, _dir) = open_test_store().await;
        let o1 = store.create_user("alice", "hash").await.unwrap();
        let o2 = store.create_user("bob", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        let SaveOutcome::Saved(bobs) = vault
            .save_credential(o2, "bank.com", "bob", &secret("bob-pw"))
            .await
            .unwrap()
        else {
            panic!("expected save");
        };

        assert!(vault.get_credentials(o1, "bank.com").await.unwrap().is_empty());
        assert!(!vault.delete_credential(o1, bobs).await.unwrap());
        assert!(!vault.replace_secret(o1, bobs, &secret("hijack")).await.unwrap());

        let entries = vault.get_credentials(o2, "bank.com").await.unwrap();
        assert_eq!(
            entries[0].as_decrypted().unwrap().secret.expose_secret(),
            "bob-pw"
        );
    }

    #[tokio::test]
    async fn ciphertext_moved_to_another_owner_fails_authentication() {
        let (store, _dir) = open_test_store().await;
        let o1 = store.create_user("alice", "hash").await.unwrap();
        let o2 = store.create_user("bob", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        vault
            .save_credential(o1, "bank.com", "alice", &secret("alice-pw"))
            .await
            .unwrap();
        let stolen = store.list_by_site(o1, "bank.com").await.unwrap()[0]
            .ciphertext
            .clone();
        store.insert(o2, "bank.com", "alice", stolen).await.unwrap();

        let entries = vault.get_credentials(o2, "bank.com").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_corrupted());
    }

    #[tokio::test]
    async fn replace_secret_reencrypts_in_place() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        let SaveOutcome::Saved(id) = vault
            .save_credential(owner, "bank.com", "alice", &secret("old"))
            .await
            .unwrap()
        else {
            panic!("expected save");
        };
        assert!(vault.replace_secret(owner, id, &secret("new")).await.unwrap());

        let entries = vault.get_credentials(owner, "bank.com").await.unwrap();
        let cred = entries[0].as_decrypted().unwrap();
        assert_eq!(cred.id, id);
        assert_eq!(cred.secret.expose_secret(), "new");
    }

    #[tokio::test]
    async fn list_credentials_spans_sites() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        vault
            .save_credential(owner, "b.com", "alice", &secret("pw-b"))
            .await
            .unwrap();
        vault
            .save_credential(owner, "a.com", "alice", &secret("pw-a"))
            .await
            .unwrap();

        let sites: Vec<String> = vault
            .list_credentials(owner)
            .await
            .unwrap()
            .iter()
            .map(|e| e.as_decrypted().unwrap().site_identifier.clone())
            .collect();
        assert_eq!(sites, vec!["a.com", "b.com"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn secrets_never_reach_logs() {
        let (store, _dir) = open_test_store().await;
        let owner = store.create_user("alice", "hash").await.unwrap();
        let vault = open_vault(&store, "master").await.unwrap();

        vault
            .save_credential(owner, "bank.com", "alice", &secret("S3cret-log-probe"))
            .await
            .unwrap();
        vault.get_credentials(owner, "bank.com").await.unwrap();

        assert!(logs_contain("credential saved"));
        assert!(!logs_contain("S3cret-log-probe"));
    }

    #[test]
    fn debug_output_redacts_decrypted_secret() {
        let entry = DecryptedCredential {
            id: RecordId(1),
            site_identifier: "bank.com".into(),
            login_identifier: "alice".into(),
            secret: secret("debug-probe-secret"),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        assert!(!format!("{entry:?}").contains("debug-probe-secret"));
    }

    #[test]
    fn mask_secret_long_value() {
        assert_eq!(mask_secret("correct-horse-battery"), "corr...tery");
    }

    #[test]
    fn mask_secret_short_value() {
        assert_eq!(mask_secret("S3cret!"), "****");
    }

    #[test]
    fn mask_secret_exact_boundary() {
        assert_eq!(mask_secret("1234567890"), "1234...7890");
    }

    #[test]
    fn mask_secret_respects_char_boundaries() {
        assert_eq!(mask_secret("pässwörd-ünïcode"), "päss...code");
    }
}
