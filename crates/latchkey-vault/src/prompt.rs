// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master secret and password acquisition from the environment, config, or TTY.

use std::io::IsTerminal;

use latchkey_config::model::VaultConfig;
use latchkey_core::LatchkeyError;
use secrecy::SecretString;

/// Environment variable holding the vault master secret.
pub const MASTER_SECRET_ENV_VAR: &str = "LATCHKEY_MASTER_SECRET";

/// Environment variable holding the account password for headless use.
pub const PASSWORD_ENV_VAR: &str = "LATCHKEY_PASSWORD";

fn non_empty_env(name: &str) -> Option<SecretString> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

/// Master secret from `LATCHKEY_MASTER_SECRET` or `[vault] master_secret`,
/// without prompting. Empty values count as absent.
pub fn master_secret_from_env_or_config(config: &VaultConfig) -> Option<SecretString> {
    non_empty_env(MASTER_SECRET_ENV_VAR).or_else(|| {
        config
            .master_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::from(s.to_string()))
    })
}

/// Resolve the master secret.
///
/// Priority:
/// 1. `LATCHKEY_MASTER_SECRET` environment variable
/// 2. `[vault] master_secret` in the config file
/// 3. Interactive TTY prompt
pub fn get_master_secret(config: &VaultConfig) -> Result<SecretString, LatchkeyError> {
    if let Some(secret) = master_secret_from_env_or_config(config) {
        return Ok(secret);
    }

    if std::io::stdin().is_terminal() {
        return prompt_secret("Master secret: ").map_err(|e| match e {
            LatchkeyError::Validation(_) => {
                LatchkeyError::Config("empty master secret not allowed".to_string())
            }
            other => other,
        });
    }

    Err(LatchkeyError::Config(format!(
        "no master secret configured. Set {MASTER_SECRET_ENV_VAR} or [vault] master_secret, or run interactively"
    )))
}

/// Account password from `LATCHKEY_PASSWORD` or an interactive prompt.
///
/// With `confirm`, the prompt asks twice and requires both entries to match.
pub fn get_account_password(confirm: bool) -> Result<SecretString, LatchkeyError> {
    if let Some(password) = non_empty_env(PASSWORD_ENV_VAR) {
        return Ok(password);
    }

    if !std::io::stdin().is_terminal() {
        return Err(LatchkeyError::Validation(format!(
            "no password provided. Set {PASSWORD_ENV_VAR} or run interactively"
        )));
    }

    let first = rpassword::prompt_password("Account password: ")
        .map_err(|e| LatchkeyError::Internal(format!("failed to read password: {e}")))?;
    if confirm {
        let second = rpassword::prompt_password("Confirm password: ")
            .map_err(|e| LatchkeyError::Internal(format!("failed to read password: {e}")))?;
        if first != second {
            return Err(LatchkeyError::Validation("passwords do not match".to_string()));
        }
    }
    Ok(SecretString::from(first))
}

/// Read a non-empty secret from the TTY without echo.
pub fn prompt_secret(label: &str) -> Result<SecretString, LatchkeyError> {
    let value = rpassword::prompt_password(label)
        .map_err(|e| LatchkeyError::Internal(format!("failed to read secret: {e}")))?;
    if value.is_empty() {
        return Err(LatchkeyError::Validation("empty secret not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}
