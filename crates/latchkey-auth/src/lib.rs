// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User accounts for the Latchkey vault.
//!
//! Accounts map a username and password to the [`OwnerId`] that scopes every
//! credential record. Passwords are stored only as Argon2id PHC strings.

pub mod password;

use std::sync::{Arc, OnceLock};

use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{LatchkeyError, OwnerId, UserDirectory};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

pub use password::{hash_password, verify_password};

/// Password verified on the unknown-user path so both login failures cost
/// one Argon2id verification.
const DUMMY_PASSWORD: &str = "latchkey-unknown-user";

/// Registration and login over a [`UserDirectory`].
pub struct Accounts {
    directory: Arc<dyn UserDirectory>,
    params: argon2::Params,
    min_password_length: usize,
    dummy_hash: OnceLock<String>,
}

impl Accounts {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        params: argon2::Params,
        min_password_length: usize,
    ) -> Self {
        Self {
            directory,
            params,
            min_password_length,
            dummy_hash: OnceLock::new(),
        }
    }

    /// Build from `[accounts]` and the `[vault]` Argon2 cost settings.
    pub fn from_config(
        directory: Arc<dyn UserDirectory>,
        config: &LatchkeyConfig,
    ) -> Result<Self, LatchkeyError> {
        let params = argon2::Params::new(
            config.vault.kdf_memory_cost,
            config.vault.kdf_iterations,
            config.vault.kdf_parallelism,
            None,
        )
        .map_err(|e| LatchkeyError::Config(format!("invalid password hashing parameters: {e}")))?;
        let accounts = Self::new(directory, params, config.accounts.min_password_length);
        accounts.dummy_hash()?;
        Ok(accounts)
    }

    /// PHC hash of [`DUMMY_PASSWORD`] under this instance's parameters.
    fn dummy_hash(&self) -> Result<&str, LatchkeyError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = hash_password(
            &SecretString::from(DUMMY_PASSWORD.to_string()),
            self.params.clone(),
        )?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    /// Create an account and return its owner id.
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<OwnerId, LatchkeyError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LatchkeyError::Validation("username must not be empty".to_string()));
        }
        let length = password.expose_secret().chars().count();
        if length == 0 {
            return Err(LatchkeyError::Validation("password must not be empty".to_string()));
        }
        if length < self.min_password_length {
            return Err(LatchkeyError::Validation(format!(
                "password must be at least {} characters",
                self.min_password_length
            )));
        }

        let hash = hash_password(password, self.params.clone())?;
        let owner = self.directory.create_user(username, &hash).await?;
        info!(owner = %owner, username = %username, "account registered");
        Ok(owner)
    }

    /// Verify a username and password.
    ///
    /// An unknown user and a wrong password fail with the same
    /// `NotAuthenticated` error.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<OwnerId, LatchkeyError> {
        let Some(user) = self.directory.find_by_username(username.trim()).await? else {
            // Same Argon2id cost as a wrong password.
            verify_password(password, self.dummy_hash()?)?;
            debug!("login rejected: unknown user");
            return Err(LatchkeyError::NotAuthenticated);
        };

        if verify_password(password, &user.password_hash)? {
            debug!(owner = %user.id, "login accepted");
            Ok(user.id)
        } else {
            debug!(owner = %user.id, "login rejected: wrong password");
            Err(LatchkeyError::NotAuthenticated)
        }
    }

    /// Look up the owner id for a username without checking a password.
    pub async fn resolve(&self, username: &str) -> Result<OwnerId, LatchkeyError> {
        self.directory
            .find_by_username(username.trim())
            .await?
            .map(|user| user.id)
            .ok_or(LatchkeyError::NotAuthenticated)
    }
}
