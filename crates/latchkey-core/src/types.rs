// SPDX-FileCopyrightText: 2026 Latchkey Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types shared across the store traits and the vault.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a registered user. Every credential record is scoped to
/// exactly one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a stored credential record, unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user as persisted in the `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: OwnerId,
    pub username: String,
    /// Argon2id PHC string. Never a plaintext password.
    pub password_hash: String,
    pub created_at: String,
}

/// One stored secret as persisted in the `credentials` table.
///
/// `ciphertext` is an opaque blob; its layout belongs to the cipher service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: RecordId,
    pub owner_id: OwnerId,
    pub site_identifier: String,
    pub login_identifier: String,
    pub ciphertext: Vec<u8>,
    pub created_at: String,
}

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}
