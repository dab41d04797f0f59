// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential record CRUD operations.
//!
//! Every statement filters on `owner_id`, so a caller can never read, delete,
//! or overwrite another owner's record by guessing its id.

use latchkey_core::{CredentialRecord, LatchkeyError, OwnerId, RecordId};
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::queries::{constraint_violation, Violation};

const SELECT_COLUMNS: &str =
    "SELECT id, owner_id, site_identifier, login_identifier, ciphertext, created_at FROM credentials";

/// Insert an encrypted record.
///
/// The insert runs in its own transaction and the
/// `UNIQUE (owner_id, site_identifier, login_identifier)` constraint decides
/// concurrent duplicates: at most one insert wins, the other gets
/// `DuplicateRecord`. A missing owner row surfaces as `NotAuthenticated`.
pub async fn insert_credential(
    db: &Database,
    owner: OwnerId,
    site_identifier: &str,
    login_identifier: &str,
    ciphertext: Vec<u8>,
) -> Result<RecordId, LatchkeyError> {
    let site = site_identifier.to_string();
    let login = login_identifier.to_string();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Result<i64, Violation>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let result = tx.execute(
                "INSERT INTO credentials (owner_id, site_identifier, login_identifier, ciphertext)
                 VALUES (?1, ?2, ?3, ?4)",
                params![owner.0, site, login, ciphertext],
            );
            match result {
                Ok(_) => {
                    let id = tx.last_insert_rowid();
                    tx.commit()?;
                    Ok(Ok(id))
                }
                Err(e) => match constraint_violation(&e) {
                    Some(violation) => Ok(Err(violation)),
                    None => Err(e),
                },
            }
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Ok(id) => Ok(RecordId(id)),
        Err(Violation::Unique) => Err(LatchkeyError::DuplicateRecord {
            site: site_identifier.to_string(),
            login: login_identifier.to_string(),
        }),
        Err(Violation::ForeignKey) => Err(LatchkeyError::NotAuthenticated),
    }
}

/// List an owner's records for one site, oldest first.
pub async fn list_by_site(
    db: &Database,
    owner: OwnerId,
    site_identifier: &str,
) -> Result<Vec<CredentialRecord>, LatchkeyError> {
    let site = site_identifier.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<CredentialRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1 AND site_identifier = ?2
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![owner.0, site], row_to_record)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// List all of an owner's records, grouped by site, oldest first within a site.
pub async fn list_by_owner(
    db: &Database,
    owner: OwnerId,
) -> Result<Vec<CredentialRecord>, LatchkeyError> {
    db.connection()
        .call(move |conn| -> Result<Vec<CredentialRecord>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE owner_id = ?1
                 ORDER BY site_identifier ASC, created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![owner.0], row_to_record)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a record if it belongs to `owner`. Returns whether a row was removed.
pub async fn delete_credential(
    db: &Database,
    owner: OwnerId,
    id: RecordId,
) -> Result<bool, LatchkeyError> {
    let removed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM credentials WHERE id = ?1 AND owner_id = ?2",
                params![id.0, owner.0],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(removed > 0)
}

/// Overwrite a record's ciphertext if it belongs to `owner`.
pub async fn replace_ciphertext(
    db: &Database,
    owner: OwnerId,
    id: RecordId,
    ciphertext: Vec<u8>,
) -> Result<bool, LatchkeyError> {
    let updated = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE credentials SET ciphertext = ?1 WHERE id = ?2 AND owner_id = ?3",
                params![ciphertext, id.0, owner.0],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(updated > 0)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CredentialRecord> {
    Ok(CredentialRecord {
        id: RecordId(row.get(0)?),
        owner_id: OwnerId(row.get(1)?),
        site_identifier: row.get(2)?,
        login_identifier: row.get(3)?,
        ciphertext: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::users::create_user;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn insert_and_list_by_site_roundtrips() {
        let (db, _dir) = setup_db().await;
        let owner = create_user(&db, "alice", "h").await.unwrap();

        let id = insert_credential(&db, owner, "bank.com", "alice", vec![1, 2, 3])
            .await
            .unwrap();
        let records = list_by_site(&db, owner, "bank.com").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].owner_id, owner);
        assert_eq!(records[0].login_identifier, "alice");
        assert_eq!(records[0].ciphertext, vec![1, 2, 3]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_triple_is_rejected() {
        let (db, _dir) = setup_db().await;
        let owner = create_user(&db, "alice", "h").await.unwrap();

        insert_credential(&db, owner, "bank.com", "alice", vec![1])
            .await
            .unwrap();
        let err = insert_credential(&db, owner, "bank.com", "alice", vec![2])
            .await
            .unwrap_err();
        assert!(matches!(err, LatchkeyError::DuplicateRecord { .. }));

        let records = list_by_site(&db, owner, "bank.com").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ciphertext, vec![1]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_triple_for_different_owners_is_allowed() {
        let (db, _dir) = setup_db().await;
        let alice = create_user(&db, "alice", "h").await.unwrap();
        let bob = create_user(&db, "bob", "h").await.unwrap();

        insert_credential(&db, alice, "bank.com", "shared", vec![1])
            .await
            .unwrap();
        insert_credential(&db, bob, "bank.com", "shared", vec![2])
            .await
            .unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn insert_for_unknown_owner_is_not_authenticated() {
        let (db, _dir) = setup_db().await;

        let err = insert_credential(&db, OwnerId(999), "bank.com", "ghost", vec![1])
            .await
            .unwrap_err();
        assert!(matches!(err, LatchkeyError::NotAuthenticated));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_site_is_ordered_and_scoped() {
        let (db, _dir) = setup_db().await;
        let alice = create_user(&db, "alice", "h").await.unwrap();
        let bob = create_user(&db, "bob", "h").await.unwrap();

        let first = insert_credential(&db, alice, "mail.com", "a1", vec![1]).await.unwrap();
        let second = insert_credential(&db, alice, "mail.com", "a2", vec![2]).await.unwrap();
        insert_credential(&db, alice, "other.com", "a3", vec![3]).await.unwrap();
        insert_credential(&db, bob, "mail.com", "b1", vec![4]).await.unwrap();

        let records = list_by_site(&db, alice, "mail.com").await.unwrap();
        let ids: Vec<RecordId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second]);

        assert!(list_by_site(&db, alice, "nowhere.com").await.unwrap().is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_by_owner_groups_by_site() {
        let (db, _dir) = setup_db().await;
        let alice = create_user(&db, "alice", "h").await.unwrap();

        insert_credential(&db, alice, "zeta.com", "z", vec![1]).await.unwrap();
        insert_credential(&db, alice, "alpha.com", "a", vec![2]).await.unwrap();

        let sites: Vec<String> = list_by_owner(&db, alice)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.site_identifier)
            .collect();
        assert_eq!(sites, vec!["alpha.com", "zeta.com"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let (db, _dir) = setup_db().await;
        let alice = create_user(&db, "alice", "h").await.unwrap();
        let bob = create_user(&db, "bob", "h").await.unwrap();
        let id = insert_credential(&db, bob, "bank.com", "bob", vec![1]).await.unwrap();

        assert!(!delete_credential(&db, alice, id).await.unwrap());
        assert_eq!(list_by_site(&db, bob, "bank.com").await.unwrap().len(), 1);

        assert!(delete_credential(&db, bob, id).await.unwrap());
        assert!(!delete_credential(&db, bob, id).await.unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn replace_ciphertext_is_scoped_to_owner() {
        let (db, _dir) = setup_db().await;
        let alice = create_user(&db, "alice", "h").await.unwrap();
        let bob = create_user(&db, "bob", "h").await.unwrap();
        let id = insert_credential(&db, alice, "bank.com", "alice", vec![1]).await.unwrap();

        assert!(!replace_ciphertext(&db, bob, id, vec![9]).await.unwrap());
        assert!(replace_ciphertext(&db, alice, id, vec![2]).await.unwrap());

        let records = list_by_site(&db, alice, "bank.com").await.unwrap();
        assert_eq!(records[0].ciphertext, vec![2]);
        db.close().await.unwrap();
    }
}
