// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account and credential subcommands.

use std::io::{BufRead, IsTerminal};
use std::sync::Arc;

use latchkey_auth::Accounts;
use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{LatchkeyError, OwnerId, RecordId};
use latchkey_storage::SqliteStore;
use latchkey_vault::{
    get_account_password, get_master_secret, mask_secret, prompt_secret, SaveOutcome, Vault,
    VaultEntry,
};
use secrecy::{ExposeSecret, SecretString};

/// A logged-in owner and the open vault.
struct Session {
    owner: OwnerId,
    vault: Vault,
}

async fn open_store(config: &LatchkeyConfig) -> Result<SqliteStore, LatchkeyError> {
    SqliteStore::open(&config.storage).await
}

/// Authenticate `username` and open the vault.
async fn login(config: &LatchkeyConfig, username: &str) -> Result<Session, LatchkeyError> {
    let store = open_store(config).await?;
    let accounts = Accounts::from_config(Arc::new(store.clone()), config)?;
    let password = get_account_password(false)?;
    let owner = accounts.authenticate(username, &password).await?;

    let master_secret = get_master_secret(&config.vault)?;
    let vault = Vault::open(Arc::new(store), &master_secret, &config.vault).await?;
    Ok(Session { owner, vault })
}

/// Secret to store: prompted on a terminal, else the first line of stdin.
fn read_credential_secret(site: &str, login: &str) -> Result<SecretString, LatchkeyError> {
    if std::io::stdin().is_terminal() {
        return prompt_secret(&format!("Secret for {login} at {site}: "));
    }

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| LatchkeyError::Internal(format!("failed to read secret from stdin: {e}")))?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        return Err(LatchkeyError::Validation("empty secret not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}

pub async fn run_register(config: &LatchkeyConfig, username: &str) -> Result<(), LatchkeyError> {
    let store = open_store(config).await?;
    let accounts = Accounts::from_config(Arc::new(store), config)?;
    let password = get_account_password(true)?;
    let owner = accounts.register(username, &password).await?;
    println!("registered {username} (owner {owner})");
    Ok(())
}

pub async fn run_save(
    config: &LatchkeyConfig,
    username: &str,
    site: &str,
    login_id: &str,
) -> Result<(), LatchkeyError> {
    let session = login(config, username).await?;
    let secret = read_credential_secret(site, login_id)?;

    match session
        .vault
        .save_credential(session.owner, site, login_id, &secret)
        .await?
    {
        SaveOutcome::Saved(id) => println!("saved credential {id} for {login_id} at {site}"),
        SaveOutcome::Duplicate => println!("{login_id} at {site} is already stored"),
    }
    Ok(())
}

pub async fn run_get(
    config: &LatchkeyConfig,
    username: &str,
    site: &str,
    reveal: bool,
) -> Result<(), LatchkeyError> {
    let session = login(config, username).await?;
    let entries = session.vault.get_credentials(session.owner, site).await?;

    if entries.is_empty() {
        println!("no credentials stored for {site}");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry, reveal));
    }
    Ok(())
}

pub async fn run_list(
    config: &LatchkeyConfig,
    username: &str,
    reveal: bool,
) -> Result<(), LatchkeyError> {
    let session = login(config, username).await?;
    let entries = session.vault.list_credentials(session.owner).await?;

    if entries.is_empty() {
        println!("no credentials stored");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry, reveal));
    }
    Ok(())
}

pub async fn run_delete(
    config: &LatchkeyConfig,
    username: &str,
    id: RecordId,
) -> Result<(), LatchkeyError> {
    let session = login(config, username).await?;
    if session.vault.delete_credential(session.owner, id).await? {
        println!("deleted credential {id}");
    } else {
        println!("no credential {id}");
    }
    Ok(())
}

/// One output line: `id  site  login  secret`.
///
/// Corrupted records are listed with a marker instead of a secret.
fn format_entry(entry: &VaultEntry, reveal: bool) -> String {
    match entry {
        VaultEntry::Decrypted(c) => {
            let secret = if reveal {
                c.secret.expose_secret().to_string()
            } else {
                mask_secret(c.secret.expose_secret())
            };
            format!(
                "{:>5}  {:<24} {:<24} {}",
                c.id.0, c.site_identifier, c.login_identifier, secret
            )
        }
        VaultEntry::Corrupted(c) => format!(
            "{:>5}  {:<24} {:<24} <corrupted: failed authentication>",
            c.id.0, c.site_identifier, c.login_identifier
        ),
    }
}
