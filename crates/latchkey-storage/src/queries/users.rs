// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use latchkey_core::{LatchkeyError, OwnerId, User};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::queries::{constraint_violation, Violation};

/// Insert a user and return the new id.
///
/// The `UNIQUE` constraint on `username` decides races between concurrent
/// registrations; the loser gets `UsernameTaken`.
pub async fn create_user(
    db: &Database,
    username: &str,
    password_hash: &str,
) -> Result<OwnerId, LatchkeyError> {
    let username_owned = username.to_string();
    let password_hash = password_hash.to_string();
    let inserted = db
        .connection()
        .call(move |conn| -> Result<Option<i64>, rusqlite::Error> {
            let result = conn.execute(
                "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
                params![username_owned, password_hash],
            );
            match result {
                Ok(_) => Ok(Some(conn.last_insert_rowid())),
                Err(e) if constraint_violation(&e) == Some(Violation::Unique) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    inserted.map(OwnerId).ok_or_else(|| LatchkeyError::UsernameTaken {
        username: username.to_string(),
    })
}

/// Look up a user by exact username.
pub async fn find_by_username(db: &Database, username: &str) -> Result<Option<User>, LatchkeyError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a user by id.
pub async fn get_user(db: &Database, id: OwnerId) -> Result<Option<User>, LatchkeyError> {
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                params![id.0],
                row_to_user,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Returns true if a user with `id` exists.
pub async fn user_exists(db: &Database, id: OwnerId) -> Result<bool, LatchkeyError> {
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            conn.query_row(
                "SELECT EXISTS (SELECT 1 FROM users WHERE id = ?1)",
                params![id.0],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: OwnerId(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: row.get(3)?,
    })
}
