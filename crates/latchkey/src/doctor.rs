// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `latchkey doctor` command implementation.
//!
//! Runs diagnostic checks against the configured database and vault.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use latchkey_config::model::LatchkeyConfig;
use latchkey_core::{HealthStatus, LatchkeyError};
use latchkey_storage::SqliteStore;
use latchkey_vault::{master_secret_from_env_or_config, Vault};

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Tables the schema migrations must have created.
const EXPECTED_TABLES: &[&str] = &["credentials", "users", "vault_meta"];

/// Run the `latchkey doctor` command.
///
/// With `--deep`, also runs SQLite integrity and schema checks. With
/// `--plain`, disables colored output. Never creates the vault. Returns the
/// number of failed checks.
pub async fn run_doctor(
    config: &LatchkeyConfig,
    deep: bool,
    plain: bool,
) -> Result<usize, LatchkeyError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    let db_path = &config.storage.database_path;
    let db_exists = std::path::Path::new(db_path).exists();

    let store = if db_exists {
        match SqliteStore::open(&config.storage).await {
            Ok(store) => Some(store),
            Err(e) => {
                results.push(CheckResult::new(
                    "Database",
                    CheckStatus::Fail,
                    format!("open failed: {e}"),
                    Instant::now(),
                ));
                None
            }
        }
    } else {
        results.push(CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first use)"),
            Instant::now(),
        ));
        None
    };

    if let Some(store) = &store {
        results.push(check_database(store).await);
    }
    results.push(check_master_secret(config));
    if let Some(store) = &store {
        results.push(check_vault(store, config).await);
        if deep {
            results.push(check_db_integrity(store).await);
            results.push(check_schema(store).await);
        }
    }

    print_results(&results, deep, use_color);

    if let Some(store) = store {
        store.close().await?;
    }
    Ok(failed_checks(&results))
}

fn failed_checks(results: &[CheckResult]) -> usize {
    results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count()
}

fn print_results(results: &[CheckResult], deep: bool, use_color: bool) {
    use colored::Colorize;

    println!();
    println!("  latchkey doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        let (plain_tag, symbol, message) = match result.status {
            CheckStatus::Pass => ("[OK]  ", "✓".green().to_string(), result.message.normal()),
            CheckStatus::Warn => {
                issues += 1;
                ("[WARN]", "!".yellow().to_string(), result.message.yellow())
            }
            CheckStatus::Fail => {
                issues += 1;
                ("[FAIL]", "✗".red().to_string(), result.message.red())
            }
        };

        if use_color {
            println!(
                "    {symbol} {:<16} {message} ({duration_ms}ms)",
                result.name
            );
        } else {
            println!(
                "    {plain_tag} {:<16} {} ({duration_ms}ms)",
                result.name, result.message
            );
        }
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();
}

/// Check the database answers queries.
async fn check_database(store: &SqliteStore) -> CheckResult {
    use latchkey_core::CredentialStore;

    let start = Instant::now();
    match store.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new("Database", CheckStatus::Pass, "connected", start)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("Database", CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("Database", CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("{e}"), start),
    }
}

/// Check a master secret is available without prompting.
fn check_master_secret(config: &LatchkeyConfig) -> CheckResult {
    let start = Instant::now();
    if master_secret_from_env_or_config(&config.vault).is_some() {
        CheckResult::new("Master secret", CheckStatus::Pass, "configured", start)
    } else {
        CheckResult::new(
            "Master secret",
            CheckStatus::Warn,
            "not set (commands will prompt)",
            start,
        )
    }
}

/// Check the configured master secret unlocks an existing vault.
///
/// A store without vault metadata is reported, not initialized.
async fn check_vault(store: &SqliteStore, config: &LatchkeyConfig) -> CheckResult {
    let start = Instant::now();
    match Vault::is_initialized(store).await {
        Ok(true) => {}
        Ok(false) => {
            return CheckResult::new(
                "Vault",
                CheckStatus::Warn,
                "not initialized (created on first save)",
                start,
            );
        }
        Err(e) => return CheckResult::new("Vault", CheckStatus::Fail, format!("{e}"), start),
    }

    let Some(master_secret) = master_secret_from_env_or_config(&config.vault) else {
        return CheckResult::new(
            "Vault",
            CheckStatus::Warn,
            "skipped (no master secret)",
            start,
        );
    };

    match Vault::open(Arc::new(store.clone()), &master_secret, &config.vault).await {
        Ok(_) => CheckResult::new("Vault", CheckStatus::Pass, "unlocked", start),
        Err(e) => CheckResult::new("Vault", CheckStatus::Fail, format!("{e}"), start),
    }
}

/// Deep check: SQLite integrity check.
async fn check_db_integrity(store: &SqliteStore) -> CheckResult {
    let start = Instant::now();
    let result = store
        .database()
        .connection()
        .call(|conn| -> Result<String, rusqlite::Error> {
            conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))
        })
        .await;

    match result {
        Ok(status) if status == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(status) => CheckResult::new("DB integrity", CheckStatus::Fail, status, start),
        Err(e) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("check failed: {e}"),
            start,
        ),
    }
}

/// Deep check: schema tables are present.
async fn check_schema(store: &SqliteStore) -> CheckResult {
    let start = Instant::now();
    let result = store
        .database()
        .connection()
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await;

    match result {
        Ok(tables) => {
            let missing = missing_tables(&tables);
            if missing.is_empty() {
                CheckResult::new("Schema", CheckStatus::Pass, "up to date", start)
            } else {
                CheckResult::new(
                    "Schema",
                    CheckStatus::Fail,
                    format!("missing tables: {}", missing.join(", ")),
                    start,
                )
            }
        }
        Err(e) => CheckResult::new("Schema", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

fn missing_tables(present: &[String]) -> Vec<&'static str> {
    EXPECTED_TABLES
        .iter()
        .copied()
        .filter(|t| !present.iter().any(|p| p == t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_config::model::StorageConfig;
    use tempfile::tempdir;

    fn config_for(path: &std::path::Path, master_secret: Option<&str>) -> LatchkeyConfig {
        let mut config = LatchkeyConfig {
            storage: StorageConfig {
                database_path: path.to_string_lossy().to_string(),
                wal_mode: true,
            },
            ..LatchkeyConfig::default()
        };
        config.vault.master_secret = master_secret.map(str::to_string);
        config.vault.kdf_memory_cost = 32768;
        config.vault.kdf_iterations = 2;
        config.vault.kdf_parallelism = 1;
        config
    }

    #[test]
    fn missing_tables_reports_only_absent() {
        let present = vec!["users".to_string(), "refinery_schema_history".to_string()];
        assert_eq!(missing_tables(&present), vec!["credentials", "vault_meta"]);
    }

    async fn create_vault(store: &SqliteStore, config: &LatchkeyConfig, master: &str) {
        let secret = secrecy::SecretString::from(master.to_string());
        Vault::open(Arc::new(store.clone()), &secret, &config.vault)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn initialized_vault_passes_deep_checks() {
        let dir = tempdir().unwrap();
        let config = config_for(&dir.path().join("doctor.db"), Some("doctor-master"));
        let store = SqliteStore::open(&config.storage).await.unwrap();
        create_vault(&store, &config, "doctor-master").await;

        assert_eq!(check_database(&store).await.status, CheckStatus::Pass);
        assert_eq!(check_vault(&store, &config).await.status, CheckStatus::Pass);
        assert_eq!(check_db_integrity(&store).await.status, CheckStatus::Pass);
        assert_eq!(check_schema(&store).await.status, CheckStatus::Pass);
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn doctor_leaves_fresh_database_uninitialized() {
        use latchkey_core::CredentialStore;

        let dir = tempdir().unwrap();
        let config = config_for(&dir.path().join("doctor.db"), Some("doctor-master"));
        SqliteStore::open(&config.storage)
            .await
            .unwrap()
            .close()
            .await
            .unwrap();

        let failed = run_doctor(&config, true, true).await.unwrap();
        assert_eq!(failed, 0);

        let store = SqliteStore::open(&config.storage).await.unwrap();
        for key in ["kdf_salt", "kdf_params", "key_check"] {
            assert!(store.get_meta(key).await.unwrap().is_none(), "{key} was written");
        }
        assert_eq!(
            check_vault(&store, &config).await.status,
            CheckStatus::Warn
        );
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn wrong_master_secret_fails_vault_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let first = config_for(&path, Some("first"));
        let store = SqliteStore::open(&first.storage).await.unwrap();
        create_vault(&store, &first, "first").await;

        assert_eq!(check_vault(&store, &first).await.status, CheckStatus::Pass);

        let second = config_for(&path, Some("second"));
        let result = check_vault(&store, &second).await;
        assert_eq!(result.status, CheckStatus::Fail);
        assert!(result.message.contains("does not match"));
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn doctor_counts_failed_checks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let first = config_for(&path, Some("first"));
        let store = SqliteStore::open(&first.storage).await.unwrap();
        create_vault(&store, &first, "first").await;
        store.close().await.unwrap();

        let second = config_for(&path, Some("second"));
        assert_eq!(run_doctor(&second, false, true).await.unwrap(), 1);
        assert_eq!(run_doctor(&first, false, true).await.unwrap(), 0);
    }
}
