// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup: `./latchkey.toml` > `~/.config/latchkey/latchkey.toml` > `/etc/latchkey/latchkey.toml`
//! with environment variable overrides via the `LATCHKEY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LatchkeyConfig;

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "LATCHKEY_";

/// Config files in merge order (earlier entries are overridden by later ones).
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/latchkey/latchkey.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("latchkey/latchkey.toml"));
    }
    paths.push(PathBuf::from("latchkey.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/latchkey/latchkey.toml`
/// 3. `~/.config/latchkey/latchkey.toml`
/// 4. `./latchkey.toml`
/// 5. `LATCHKEY_*` environment variables
pub fn load_config() -> Result<LatchkeyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LatchkeyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LatchkeyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard lookup, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(LatchkeyConfig::default()));
    for path in config_search_paths() {
        figment = figment.merge(Toml::file(path));
    }
    figment.merge(env_provider())
}

/// Map `LATCHKEY_<SECTION>_<KEY>` onto `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LATCHKEY_VAULT_KDF_MEMORY_COST` must become
/// `vault.kdf_memory_cost`, not `vault.kdf.memory.cost`.
/// `LATCHKEY_MASTER_SECRET` and `LATCHKEY_PASSWORD` are read directly by the
/// vault and CLI and are ignored here.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(&["master_secret", "password"])
        .map(|key| {
            // Figment hands over the original upper-case name.
            let key = key.as_str().to_ascii_lowercase();
            let mapped = key
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("accounts_", "accounts.", 1)
                .replacen("logging_", "logging.", 1);
            mapped.into()
        })
}
