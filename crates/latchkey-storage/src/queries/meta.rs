// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault metadata key/value operations.

use latchkey_core::LatchkeyError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};

/// Read a metadata value.
pub async fn get_meta(db: &Database, key: &str) -> Result<Option<Vec<u8>>, LatchkeyError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Vec<u8>>, rusqlite::Error> {
            conn.query_row(
                "SELECT value FROM vault_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Write `entries` in one transaction if the table is still empty.
///
/// Returns false when metadata already exists, leaving it untouched. Two
/// processes racing to initialize a fresh vault cannot interleave their
/// entries.
pub async fn init_meta(db: &Database, entries: Vec<(String, Vec<u8>)>) -> Result<bool, LatchkeyError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
            let existing: i64 = tx.query_row("SELECT COUNT(*) FROM vault_meta", [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(false);
            }
            for (key, value) in &entries {
                tx.execute(
                    "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)",
                    params![key, value],
                )?;
            }
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}
